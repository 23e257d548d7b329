// Admin module - aggregate views and user administration

pub mod handlers;
pub mod models;
pub mod routes;

pub use routes::admin_routes;
