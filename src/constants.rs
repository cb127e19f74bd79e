// Server configuration
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: &str = "3000";
pub const DEFAULT_DATA_PATH: &str = "data";
pub const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:8080";
pub const DATABASE_FILE_NAME: &str = "civic_budget.db";
pub const DEFAULT_LOG_FILTER: &str = "civic_budget_server=info,tower_http=info";

// Database limits and defaults
pub const MAX_LIMIT: u32 = 1000;
pub const DEFAULT_FAVORITES_LIMIT: u32 = 3;
pub const PROJECT_ID_COUNTER: &str = "projectid";

// Money amounts
pub const MAX_MONEY_TOTAL: f64 = f64::MAX;
pub const MAX_TOKEN_TOTAL: i64 = i64::MAX;
// Float residue tolerated when a withdrawal empties a money balance
pub const MONEY_DEBIT_TOLERANCE: f64 = 1e-9;

// Validation limits
pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_TEXT_LENGTH: usize = 10_000;
pub const MAX_USER_NAME_LENGTH: usize = 100;
pub const MAX_ID_LENGTH: usize = 100;
pub const MAX_BANK_NUMBER_LENGTH: usize = 64;

// Roles
pub const ROLE_ADMIN: &str = "Admin";
pub const ROLE_RESIDENT: &str = "Resident";

// Project status
pub const PROJECT_STATUS_PENDING: &str = "pending";
pub const PROJECT_STATUS_COMPLETED: &str = "completed";

// Sort directions accepted on /get_projects/{order}
pub const SORT_ASCENDING: &str = "ascending_by";
pub const SORT_DESCENDING: &str = "descending_by";

// Vote outcomes
pub const VOTE_CREATED: &str = "created";
pub const VOTE_UPDATED: &str = "updated";
pub const VOTE_REMOVED: &str = "removed";

// Error messages
pub const ERR_DATABASE_OPERATION: &str = "Database operation failed";
pub const ERR_PROJECT_NOT_FOUND: &str = "Project not found";
pub const ERR_WALLET_NOT_FOUND: &str = "Wallet not found";
pub const ERR_USER_NOT_FOUND: &str = "User not found";
pub const ERR_INSUFFICIENT_FUNDS: &str = "Insufficient funds";
pub const ERR_AMOUNT_TOO_LARGE: &str = "Amount would exceed the maximum supported total";
pub const ERR_NOT_ADMIN: &str = "Admin role required";
