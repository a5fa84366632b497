// Skill-learning goals: store access and routes.

pub mod handlers;
pub mod store;
