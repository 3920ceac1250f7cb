//! In-memory stores
//!
//! Used when no DATABASE_URL is configured, and by the test suites.
//! Each store keeps its maps behind a single lock so a uniqueness check
//! and the insert it guards happen atomically.

use super::{AccountStore, TaskStore, TimeTrackerStore};
use crate::error::{not_found_error, AppError};
use crate::models::{Account, NewAccount, Task, TaskInput, TimeTracker, TimeTrackerUpdate};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Accounts {
    by_id: HashMap<Uuid, Account>,
    username_index: HashMap<String, Uuid>,
}

#[derive(Default)]
pub struct MemoryAccountStore {
    inner: RwLock<Accounts>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create(&self, account: NewAccount) -> Result<Account, AppError> {
        let mut inner = self.inner.write().await;

        if inner.username_index.contains_key(&account.username) {
            return Err(AppError::DuplicateKey(format!(
                "Username '{}' is already taken",
                account.username
            )));
        }

        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            username: account.username,
            password_hash: account.password_hash,
            email: account.email,
            permission_level: account.permission_level,
            created_at: now,
            updated_at: now,
        };

        inner.username_index.insert(account.username.clone(), account.id);
        inner.by_id.insert(account.id, account.clone());

        Ok(account)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError> {
        Ok(self.inner.read().await.by_id.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .username_index
            .get(username)
            .and_then(|id| inner.by_id.get(id).cloned()))
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        let account = inner
            .by_id
            .remove(&id)
            .ok_or_else(|| not_found_error(format!("Account {} not found", id)))?;
        inner.username_index.remove(&account.username);
        Ok(())
    }
}

#[derive(Default)]
struct Trackers {
    by_id: HashMap<Uuid, TimeTracker>,
    owner_index: HashMap<Uuid, Uuid>,
}

#[derive(Default)]
pub struct MemoryTimeTrackerStore {
    inner: RwLock<Trackers>,
}

impl MemoryTimeTrackerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TimeTrackerStore for MemoryTimeTrackerStore {
    async fn create(&self, user_id: Uuid) -> Result<TimeTracker, AppError> {
        let mut inner = self.inner.write().await;

        if inner.owner_index.contains_key(&user_id) {
            return Err(AppError::DuplicateKey(format!(
                "Account {} already has a time tracker",
                user_id
            )));
        }

        let tracker = TimeTracker::new(user_id);
        inner.owner_index.insert(user_id, tracker.id);
        inner.by_id.insert(tracker.id, tracker.clone());

        Ok(tracker)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TimeTracker>, AppError> {
        Ok(self.inner.read().await.by_id.get(&id).cloned())
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<TimeTracker>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .owner_index
            .get(&user_id)
            .and_then(|id| inner.by_id.get(id).cloned()))
    }

    async fn list(&self) -> Result<Vec<TimeTracker>, AppError> {
        let inner = self.inner.read().await;
        let mut trackers: Vec<_> = inner.by_id.values().cloned().collect();
        trackers.sort_by_key(|t| t.created_at);
        Ok(trackers)
    }

    async fn update(&self, id: Uuid, changes: &TimeTrackerUpdate) -> Result<TimeTracker, AppError> {
        let mut inner = self.inner.write().await;
        let tracker = inner
            .by_id
            .get_mut(&id)
            .ok_or_else(|| not_found_error(format!("Time tracker {} not found", id)))?;

        changes.apply(tracker);
        Ok(tracker.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        let tracker = inner
            .by_id
            .remove(&id)
            .ok_or_else(|| not_found_error(format!("Time tracker {} not found", id)))?;
        inner.owner_index.remove(&tracker.user_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<HashMap<Uuid, Task>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn create(&self, input: &TaskInput) -> Result<Task, AppError> {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            description: input.description.clone(),
            done: input.done,
            created_at: now,
            updated_at: now,
        };

        self.tasks.write().await.insert(task.id, task.clone());
        Ok(task)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        Ok(self.tasks.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Task>, AppError> {
        let mut tasks: Vec<_> = self.tasks.read().await.values().cloned().collect();
        tasks.sort_by_key(|t| t.created_at);
        Ok(tasks)
    }

    async fn update(&self, id: Uuid, input: &TaskInput) -> Result<Task, AppError> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .get_mut(&id)
            .ok_or_else(|| not_found_error(format!("Task {} not found", id)))?;

        task.description = input.description.clone();
        task.done = input.done;
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.tasks
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found_error(format!("Task {} not found", id)))
    }
}
