pub mod config;
pub mod constants;
pub mod database;
pub mod errors;
pub mod funding;
pub mod history;
pub mod models;
pub mod projects;
pub mod routes;
pub mod transaction;
pub mod users;
pub mod utils;
pub mod votes;
pub mod wallets;

// Re-export types at crate root for convenient importing
pub use crate::database::Db;
pub use crate::errors::ApiError;
pub use crate::transaction::{TransactionError, with_transaction};

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Shared store holding projects, wallets, votes, history and users
    pub db: Db,
}
