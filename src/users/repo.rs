use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::{Builder, Uuid};

use super::dto::{CreateUserRequest, UpdateUserRequest, User};
use crate::error::ApiError;

/// Source of fresh user identifiers.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> Uuid;
}

/// Random v4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Deterministic v4-shaped UUIDs built from a counter starting at 1.
#[derive(Debug, Default)]
pub struct SequentialIds {
    counter: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id this generator hands out on its `n`th call (1-based).
    pub fn nth(n: u64) -> Uuid {
        Builder::from_random_bytes(u128::from(n).to_be_bytes()).into_uuid()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> Uuid {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        Self::nth(n)
    }
}

/// Ordered in-memory collection of users.
///
/// `order` keeps insertion order, `by_id` owns the records.
pub struct UserStore {
    order: Vec<Uuid>,
    by_id: HashMap<Uuid, User>,
    ids: Box<dyn IdGenerator>,
}

impl UserStore {
    pub fn new(ids: Box<dyn IdGenerator>) -> Self {
        Self {
            order: Vec::new(),
            by_id: HashMap::new(),
            ids,
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn list(&self) -> Vec<User> {
        self.order
            .iter()
            .filter_map(|id| self.by_id.get(id))
            .cloned()
            .collect()
    }

    pub fn find_by_id(&self, id: Uuid) -> Result<User, ApiError> {
        self.by_id
            .get(&id)
            .cloned()
            .ok_or(ApiError::UserNotFound(id))
    }

    pub fn insert(&mut self, req: CreateUserRequest) -> User {
        let mut id = self.ids.next_id();
        // a generator repeating itself must never clobber an existing record
        while self.by_id.contains_key(&id) {
            debug!(%id, "generated id already taken; drawing another");
            id = self.ids.next_id();
        }
        let user = User::from_request(id, req);
        self.order.push(id);
        self.by_id.insert(id, user.clone());
        user
    }

    /// Updates the record in place; its position in `list()` is unchanged.
    pub fn replace(&mut self, id: Uuid, patch: UpdateUserRequest) -> Result<User, ApiError> {
        let user = self.by_id.get_mut(&id).ok_or(ApiError::UserNotFound(id))?;
        user.apply(patch);
        Ok(user.clone())
    }

    /// Removes exactly the matching record; later records keep their order.
    pub fn remove(&mut self, id: Uuid) -> Result<User, ApiError> {
        let user = self.by_id.remove(&id).ok_or(ApiError::UserNotFound(id))?;
        if let Some(pos) = self.order.iter().position(|candidate| *candidate == id) {
            self.order.remove(pos);
        }
        Ok(user)
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new(Box::new(RandomIds))
    }
}

/// Shared handle to the process-wide store. Cloning shares the same records.
#[derive(Clone)]
pub struct UserRepo {
    inner: Arc<RwLock<UserStore>>,
}

impl UserRepo {
    pub fn new() -> Self {
        Self::with_store(UserStore::default())
    }

    pub fn with_ids(ids: impl IdGenerator + 'static) -> Self {
        Self::with_store(UserStore::new(Box::new(ids)))
    }

    pub fn with_store(store: UserStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    pub async fn list(&self) -> Vec<User> {
        self.inner.read().await.list()
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<User, ApiError> {
        self.inner.read().await.find_by_id(id)
    }

    pub async fn insert(&self, req: CreateUserRequest) -> User {
        let user = self.inner.write().await.insert(req);
        info!(user_id = %user.id, "user created");
        user
    }

    pub async fn replace(&self, id: Uuid, patch: UpdateUserRequest) -> Result<User, ApiError> {
        let user = self.inner.write().await.replace(id, patch)?;
        info!(user_id = %id, "user updated");
        Ok(user)
    }

    pub async fn remove(&self, id: Uuid) -> Result<User, ApiError> {
        let user = self.inner.write().await.remove(id)?;
        info!(user_id = %id, "user deleted");
        Ok(user)
    }
}

impl Default for UserRepo {
    fn default() -> Self {
        Self::new()
    }
}
