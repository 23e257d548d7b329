// Application state shared across all modules

use sqlx::SqlitePool;
use std::collections::HashSet;
use std::sync::Arc;

use crate::services::EmailService;

/// Application state containing the database pool, mailer, and configuration.
///
/// The pool is constructed once in `main`, carried here for the lifetime of
/// the process, and closed explicitly at shutdown.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub jwt_secret: String,
    pub admin_emails: HashSet<String>,
    pub email: Arc<EmailService>,
}
