// Job applications: store access and the list/detail/add/edit routes.

pub mod handlers;
pub mod store;
