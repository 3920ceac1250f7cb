//! Storage layer
//!
//! One trait per resource. `postgres` backs them with a deadpool pool,
//! `memory` with lock-guarded maps. Uniqueness of usernames and of a
//! tracker's owner is enforced here, not by callers.

pub mod memory;
pub mod postgres;
mod queries;

use crate::error::AppError;
use crate::models::{Account, NewAccount, Task, TaskInput, TimeTracker, TimeTrackerUpdate};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert an account. Fails with `DuplicateKey` if the username is taken.
    async fn create(&self, account: NewAccount) -> Result<Account, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AppError>;

    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}

#[async_trait]
pub trait TimeTrackerStore: Send + Sync {
    /// Insert a tracker for `user_id`. Fails with `DuplicateKey` if the
    /// account already has one.
    async fn create(&self, user_id: Uuid) -> Result<TimeTracker, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TimeTracker>, AppError>;

    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<TimeTracker>, AppError>;

    async fn list(&self) -> Result<Vec<TimeTracker>, AppError>;

    async fn update(&self, id: Uuid, changes: &TimeTrackerUpdate) -> Result<TimeTracker, AppError>;

    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create(&self, input: &TaskInput) -> Result<Task, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, AppError>;

    async fn list(&self) -> Result<Vec<Task>, AppError>;

    async fn update(&self, id: Uuid, input: &TaskInput) -> Result<Task, AppError>;

    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}
