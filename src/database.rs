use anyhow::Result;
use libsql::{Builder, Connection};
use std::{path::Path, sync::Arc};
use tokio::sync::RwLock;

use crate::config::DatabaseLocation;
use crate::constants::{DATABASE_FILE_NAME, PROJECT_ID_COUNTER};

const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id    TEXT PRIMARY KEY,
    name  TEXT NOT NULL,
    role  TEXT NOT NULL
);
"#;

const CREATE_COUNTERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS counters (
    name           TEXT    PRIMARY KEY,
    sequence_value INTEGER NOT NULL
);
"#;

const CREATE_PROJECTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS projects (
    id             TEXT    PRIMARY KEY,
    project_id     INTEGER UNIQUE NOT NULL,
    title          TEXT    NOT NULL,
    photo_url      TEXT    NOT NULL DEFAULT '',
    category       TEXT    NOT NULL,
    abstract       TEXT    NOT NULL DEFAULT '',
    description    TEXT    NOT NULL DEFAULT '',
    location       TEXT    NOT NULL DEFAULT '',
    latitude       REAL    NOT NULL DEFAULT 0,
    longitude      REAL    NOT NULL DEFAULT 0,
    is_verified    BOOLEAN NOT NULL DEFAULT FALSE,
    is_disabled    BOOLEAN NOT NULL DEFAULT FALSE,
    status         TEXT    NOT NULL,
    date_added     TEXT    NOT NULL,
    date_ended     TEXT,
    cost           REAL    NOT NULL,
    user_id        TEXT    NOT NULL,
    user_name      TEXT    NOT NULL DEFAULT '',
    gathered_money REAL    NOT NULL DEFAULT 0,
    funded_money   REAL    NOT NULL DEFAULT 0
);
"#;

const CREATE_WALLETS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS wallets (
    user_id       TEXT    PRIMARY KEY,
    money_balance REAL    NOT NULL DEFAULT 0,
    token_balance INTEGER NOT NULL DEFAULT 0,
    bank_number   TEXT
);
"#;

const CREATE_WALLET_TRANSACTIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS wallet_transactions (
    seq        INTEGER PRIMARY KEY AUTOINCREMENT,
    id         TEXT    UNIQUE NOT NULL,
    user_id    TEXT    NOT NULL,
    kind       TEXT    NOT NULL,
    amount     REAL    NOT NULL,
    timestamp  TEXT    NOT NULL,
    reference  TEXT,
    FOREIGN KEY (user_id) REFERENCES wallets(user_id)
);
"#;

const CREATE_VOTES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS votes (
    entity_id TEXT    NOT NULL,
    user_id   TEXT    NOT NULL,
    value     INTEGER NOT NULL CHECK (value IN (-1, 1)),
    PRIMARY KEY (entity_id, user_id)
);
"#;

const CREATE_CATEGORY_VIEWS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS category_views (
    seq      INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id  TEXT    NOT NULL,
    category TEXT    NOT NULL,
    views    INTEGER NOT NULL DEFAULT 0,
    UNIQUE (user_id, category)
);
"#;

const CREATE_PROJECTS_USER_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_projects_user_id ON projects(user_id);
"#;

const CREATE_PROJECTS_CATEGORY_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_projects_category ON projects(category);
"#;

const CREATE_WALLET_TRANSACTIONS_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_wallet_transactions_user_id ON wallet_transactions(user_id);
"#;

const SEED_PROJECT_COUNTER: &str =
    "INSERT OR IGNORE INTO counters (name, sequence_value) VALUES (?, 0)";

pub type Db = Arc<RwLock<Connection>>;

/// Open the store described by `location` and make sure the schema exists.
pub async fn init_db(location: &DatabaseLocation) -> Result<Db> {
    let db = match location {
        DatabaseLocation::Local { data_path } => {
            tokio::fs::create_dir_all(data_path).await?;
            let path = Path::new(data_path).join(DATABASE_FILE_NAME);
            tracing::info!(path = %path.display(), "opening local database");
            Builder::new_local(path).build().await?
        }
        DatabaseLocation::Remote { url, auth_token } => {
            tracing::info!(%url, "connecting to remote database");
            Builder::new_remote(url.clone(), auth_token.clone())
                .build()
                .await?
        }
    };
    let conn = db.connect()?;

    create_schema(&conn).await?;
    Ok(Arc::new(RwLock::new(conn)))
}

async fn create_schema(conn: &Connection) -> Result<()> {
    for statement in [
        CREATE_USERS_TABLE,
        CREATE_COUNTERS_TABLE,
        CREATE_PROJECTS_TABLE,
        CREATE_WALLETS_TABLE,
        CREATE_WALLET_TRANSACTIONS_TABLE,
        CREATE_VOTES_TABLE,
        CREATE_CATEGORY_VIEWS_TABLE,
        CREATE_PROJECTS_USER_INDEX,
        CREATE_PROJECTS_CATEGORY_INDEX,
        CREATE_WALLET_TRANSACTIONS_INDEX,
    ] {
        conn.execute(statement, ()).await?;
    }

    conn.execute(SEED_PROJECT_COUNTER, [PROJECT_ID_COUNTER])
        .await?;

    Ok(())
}
