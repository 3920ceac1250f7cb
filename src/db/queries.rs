//! SQL query constants
//!
//! Contains all SQL used by the PostgreSQL stores.

/// Schema, applied at startup. Every statement is idempotent.
pub const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS accounts (
        id UUID PRIMARY KEY,
        username VARCHAR(256) UNIQUE NOT NULL,
        password_hash VARCHAR(255) NOT NULL,
        email VARCHAR(320) NOT NULL,
        permission_level INTEGER NOT NULL DEFAULT 7 CHECK (permission_level >= 0),
        created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS time_trackers (
        id UUID PRIMARY KEY,
        user_id UUID UNIQUE NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
        total_sedentary_time DOUBLE PRECISION NOT NULL DEFAULT 0,
        total_break_time DOUBLE PRECISION NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tasks (
        id UUID PRIMARY KEY,
        description VARCHAR(256) NOT NULL,
        done BOOLEAN NOT NULL DEFAULT false,
        created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
];

pub const INSERT_ACCOUNT: &str = r#"
    INSERT INTO accounts (id, username, password_hash, email, permission_level, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $6)
    RETURNING id, username, password_hash, email, permission_level, created_at, updated_at
"#;

pub const SELECT_ACCOUNT_BY_ID: &str = r#"
    SELECT id, username, password_hash, email, permission_level, created_at, updated_at
    FROM accounts WHERE id = $1
"#;

pub const SELECT_ACCOUNT_BY_USERNAME: &str = r#"
    SELECT id, username, password_hash, email, permission_level, created_at, updated_at
    FROM accounts WHERE username = $1
"#;

pub const DELETE_ACCOUNT: &str = "DELETE FROM accounts WHERE id = $1";

pub const INSERT_TIME_TRACKER: &str = r#"
    INSERT INTO time_trackers (id, user_id, created_at, updated_at)
    VALUES ($1, $2, $3, $3)
    RETURNING id, user_id, total_sedentary_time, total_break_time, created_at, updated_at
"#;

pub const SELECT_TIME_TRACKER_BY_ID: &str = r#"
    SELECT id, user_id, total_sedentary_time, total_break_time, created_at, updated_at
    FROM time_trackers WHERE id = $1
"#;

pub const SELECT_TIME_TRACKER_BY_USER: &str = r#"
    SELECT id, user_id, total_sedentary_time, total_break_time, created_at, updated_at
    FROM time_trackers WHERE user_id = $1
"#;

pub const LIST_TIME_TRACKERS: &str = r#"
    SELECT id, user_id, total_sedentary_time, total_break_time, created_at, updated_at
    FROM time_trackers ORDER BY created_at
"#;

/// NULL parameters leave the column unchanged
pub const UPDATE_TIME_TRACKER: &str = r#"
    UPDATE time_trackers
    SET total_sedentary_time = COALESCE($2, total_sedentary_time),
        total_break_time = COALESCE($3, total_break_time),
        updated_at = $4
    WHERE id = $1
    RETURNING id, user_id, total_sedentary_time, total_break_time, created_at, updated_at
"#;

pub const DELETE_TIME_TRACKER: &str = "DELETE FROM time_trackers WHERE id = $1";

pub const INSERT_TASK: &str = r#"
    INSERT INTO tasks (id, description, done, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $4)
    RETURNING id, description, done, created_at, updated_at
"#;

pub const SELECT_TASK_BY_ID: &str = r#"
    SELECT id, description, done, created_at, updated_at FROM tasks WHERE id = $1
"#;

pub const LIST_TASKS: &str = r#"
    SELECT id, description, done, created_at, updated_at FROM tasks ORDER BY created_at
"#;

pub const UPDATE_TASK: &str = r#"
    UPDATE tasks SET description = $2, done = $3, updated_at = $4
    WHERE id = $1
    RETURNING id, description, done, created_at, updated_at
"#;

pub const DELETE_TASK: &str = "DELETE FROM tasks WHERE id = $1";
