// Research applications: store access and routes.

pub mod handlers;
pub mod store;
