// Profile module - own-account management

pub mod handlers;
pub mod models;
pub mod routes;

pub use routes::profile_routes;
