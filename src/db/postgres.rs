//! PostgreSQL stores
//!
//! Connection pooling via deadpool, TLS via rustls when the URL asks for it.

use super::queries;
use super::{AccountStore, TaskStore, TimeTrackerStore};
use crate::auth::Permissions;
use crate::config::DatabaseConfig;
use crate::error::{not_found_error, AppError};
use crate::models::{Account, NewAccount, Task, TaskInput, TimeTracker, TimeTrackerUpdate};
use async_trait::async_trait;
use chrono::Utc;
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use tokio_postgres::{error::SqlState, NoTls, Row};
use tracing::{debug, info};
use uuid::Uuid;

/// Create a connection pool and check that it can reach the server
pub async fn create_pool(config: &DatabaseConfig) -> Result<Pool, AppError> {
    let mut cfg = Config::new();
    cfg.host = Some(config.host.clone());
    cfg.port = Some(config.port);
    cfg.user = Some(config.user.clone());
    cfg.password = Some(config.password.clone());
    cfg.dbname = Some(config.database.clone());
    cfg.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });
    cfg.pool = Some(PoolConfig::new(config.max_pool_size));

    let created = if config.require_tls {
        let certs = rustls_native_certs::load_native_certs();
        let mut root_store = rustls::RootCertStore::empty();
        for cert in certs.certs {
            root_store.add(cert).ok();
        }

        let tls_config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        let tls = tokio_postgres_rustls::MakeRustlsConnect::new(tls_config);
        cfg.create_pool(Some(Runtime::Tokio1), tls)
    } else {
        cfg.create_pool(Some(Runtime::Tokio1), NoTls)
    };
    let pool = created.map_err(|e| AppError::Config(format!("Failed to create pool: {}", e)))?;

    let client = pool.get().await?;
    client.query_one("SELECT 1", &[]).await?;

    info!(
        "Database connection successful ({}:{}/{}, TLS: {})",
        config.host, config.port, config.database, config.require_tls
    );
    Ok(pool)
}

/// Create tables if they don't exist
pub async fn ensure_schema(pool: &Pool) -> Result<(), AppError> {
    let client = pool.get().await?;
    for statement in queries::SCHEMA {
        client.execute(*statement, &[]).await?;
    }
    info!("Database tables initialized");
    Ok(())
}

/// Map an insert failure, turning constraint violations into client errors
fn insert_error(e: tokio_postgres::Error, duplicate: impl FnOnce() -> String) -> AppError {
    match e.code() {
        Some(code) if *code == SqlState::UNIQUE_VIOLATION => AppError::DuplicateKey(duplicate()),
        Some(code) if *code == SqlState::FOREIGN_KEY_VIOLATION => {
            AppError::Validation("Referenced account does not exist".to_string())
        }
        _ => AppError::Database(e),
    }
}

/// The column is a signed INTEGER; a negative value is corrupt data.
fn permissions_from_column(level: i32) -> Result<Permissions, AppError> {
    u32::try_from(level)
        .map(Permissions::from_level)
        .map_err(|_| AppError::Internal(format!("Stored permission level {} is negative", level)))
}

fn account_from_row(row: &Row) -> Result<Account, AppError> {
    Ok(Account {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        email: row.get("email"),
        permission_level: permissions_from_column(row.get("permission_level"))?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn time_tracker_from_row(row: &Row) -> TimeTracker {
    TimeTracker {
        id: row.get("id"),
        user_id: row.get("user_id"),
        total_sedentary_time: row.get("total_sedentary_time"),
        total_break_time: row.get("total_break_time"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn task_from_row(row: &Row) -> Task {
    Task {
        id: row.get("id"),
        description: row.get("description"),
        done: row.get("done"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

pub struct PgAccountStore {
    pool: Pool,
}

impl PgAccountStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn create(&self, account: NewAccount) -> Result<Account, AppError> {
        let client = self.pool.get().await?;
        let level = account.permission_level.level() as i32;

        let row = client
            .query_one(
                queries::INSERT_ACCOUNT,
                &[
                    &Uuid::new_v4(),
                    &account.username,
                    &account.password_hash,
                    &account.email,
                    &level,
                    &Utc::now(),
                ],
            )
            .await
            .map_err(|e| {
                insert_error(e, || format!("Username '{}' is already taken", account.username))
            })?;

        account_from_row(&row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError> {
        let client = self.pool.get().await?;
        let row = client.query_opt(queries::SELECT_ACCOUNT_BY_ID, &[&id]).await?;
        row.as_ref().map(account_from_row).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(queries::SELECT_ACCOUNT_BY_USERNAME, &[&username])
            .await?;
        row.as_ref().map(account_from_row).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let client = self.pool.get().await?;
        match client.execute(queries::DELETE_ACCOUNT, &[&id]).await? {
            0 => Err(not_found_error(format!("Account {} not found", id))),
            _ => Ok(()),
        }
    }
}

pub struct PgTimeTrackerStore {
    pool: Pool,
}

impl PgTimeTrackerStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TimeTrackerStore for PgTimeTrackerStore {
    async fn create(&self, user_id: Uuid) -> Result<TimeTracker, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                queries::INSERT_TIME_TRACKER,
                &[&Uuid::new_v4(), &user_id, &Utc::now()],
            )
            .await
            .map_err(|e| insert_error(e, || format!("Account {} already has a time tracker", user_id)))?;

        debug!("Time tracker created for account {}", user_id);
        Ok(time_tracker_from_row(&row))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TimeTracker>, AppError> {
        let client = self.pool.get().await?;
        let row = client.query_opt(queries::SELECT_TIME_TRACKER_BY_ID, &[&id]).await?;
        Ok(row.as_ref().map(time_tracker_from_row))
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<TimeTracker>, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(queries::SELECT_TIME_TRACKER_BY_USER, &[&user_id])
            .await?;
        Ok(row.as_ref().map(time_tracker_from_row))
    }

    async fn list(&self) -> Result<Vec<TimeTracker>, AppError> {
        let client = self.pool.get().await?;
        let rows = client.query(queries::LIST_TIME_TRACKERS, &[]).await?;
        Ok(rows.iter().map(time_tracker_from_row).collect())
    }

    async fn update(&self, id: Uuid, changes: &TimeTrackerUpdate) -> Result<TimeTracker, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                queries::UPDATE_TIME_TRACKER,
                &[
                    &id,
                    &changes.total_sedentary_time,
                    &changes.total_break_time,
                    &Utc::now(),
                ],
            )
            .await?
            .ok_or_else(|| not_found_error(format!("Time tracker {} not found", id)))?;

        Ok(time_tracker_from_row(&row))
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let client = self.pool.get().await?;
        match client.execute(queries::DELETE_TIME_TRACKER, &[&id]).await? {
            0 => Err(not_found_error(format!("Time tracker {} not found", id))),
            _ => Ok(()),
        }
    }
}

pub struct PgTaskStore {
    pool: Pool,
}

impl PgTaskStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn create(&self, input: &TaskInput) -> Result<Task, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                queries::INSERT_TASK,
                &[&Uuid::new_v4(), &input.description, &input.done, &Utc::now()],
            )
            .await?;
        Ok(task_from_row(&row))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        let client = self.pool.get().await?;
        let row = client.query_opt(queries::SELECT_TASK_BY_ID, &[&id]).await?;
        Ok(row.as_ref().map(task_from_row))
    }

    async fn list(&self) -> Result<Vec<Task>, AppError> {
        let client = self.pool.get().await?;
        let rows = client.query(queries::LIST_TASKS, &[]).await?;
        Ok(rows.iter().map(task_from_row).collect())
    }

    async fn update(&self, id: Uuid, input: &TaskInput) -> Result<Task, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                queries::UPDATE_TASK,
                &[&id, &input.description, &input.done, &Utc::now()],
            )
            .await?
            .ok_or_else(|| not_found_error(format!("Task {} not found", id)))?;
        Ok(task_from_row(&row))
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let client = self.pool.get().await?;
        match client.execute(queries::DELETE_TASK, &[&id]).await? {
            0 => Err(not_found_error(format!("Task {} not found", id))),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permissions_from_column() {
        assert_eq!(permissions_from_column(7).unwrap(), Permissions::DEFAULT_ACCOUNT);
        assert_eq!(permissions_from_column(0).unwrap(), Permissions::empty());
        assert!(matches!(permissions_from_column(-1), Err(AppError::Internal(_))));
        assert!(matches!(permissions_from_column(i32::MIN), Err(AppError::Internal(_))));
    }
}
