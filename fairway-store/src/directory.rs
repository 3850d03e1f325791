use fairway_core::{GolfCart, Route, User};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: Uuid },
}

impl DirectoryError {
    fn not_found(kind: &'static str, id: Uuid) -> Self {
        Self::NotFound { kind, id }
    }
}

/// In-memory registry of users, carts, and routes. Mutable entities sit
/// behind one async mutex per entity id, which is the locking discipline
/// for all shared-state updates: whoever holds the entry holds the entity.
/// Routes are immutable after insert and are served by value.
pub struct Directory {
    users: RwLock<HashMap<Uuid, Arc<Mutex<User>>>>,
    carts: RwLock<HashMap<Uuid, Arc<Mutex<GolfCart>>>>,
    routes: RwLock<HashMap<Uuid, Route>>,
}

impl Directory {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            carts: RwLock::new(HashMap::new()),
            routes: RwLock::new(HashMap::new()),
        }
    }

    pub async fn insert_user(&self, user: User) -> Uuid {
        let id = user.id;
        self.users
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(user)));
        tracing::debug!(user_id = %id, "user registered");
        id
    }

    /// Lockable handle for a user. Callers mutate under the entry lock.
    pub async fn user_entry(&self, id: Uuid) -> Result<Arc<Mutex<User>>, DirectoryError> {
        self.users
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| DirectoryError::not_found("user", id))
    }

    /// Consistent read snapshot of a user.
    pub async fn user(&self, id: Uuid) -> Result<User, DirectoryError> {
        let entry = self.user_entry(id).await?;
        let guard = entry.lock().await;
        Ok(guard.clone())
    }

    pub async fn insert_cart(&self, cart: GolfCart) -> Uuid {
        let id = cart.id;
        self.carts
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(cart)));
        tracing::debug!(cart_id = %id, "cart registered");
        id
    }

    pub async fn cart_entry(&self, id: Uuid) -> Result<Arc<Mutex<GolfCart>>, DirectoryError> {
        self.carts
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| DirectoryError::not_found("cart", id))
    }

    pub async fn cart(&self, id: Uuid) -> Result<GolfCart, DirectoryError> {
        let entry = self.cart_entry(id).await?;
        let guard = entry.lock().await;
        Ok(guard.clone())
    }

    pub async fn insert_route(&self, route: Route) -> Uuid {
        let id = route.id;
        self.routes.write().await.insert(id, route);
        id
    }

    pub async fn route(&self, id: Uuid) -> Result<Route, DirectoryError> {
        self.routes
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| DirectoryError::not_found("route", id))
    }
}

impl Default for Directory {
    fn default() -> Self {
        Self::new()
    }
}
