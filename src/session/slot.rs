use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use crate::error::SessionError;
use crate::session::store::SessionStore;

/// One feature's persisted state: loaded when the slot opens, written
/// back after every mutation.
pub struct SessionSlot<T> {
    store: Arc<dyn SessionStore>,
    key: String,
    value: T,
}

impl<T> SessionSlot<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    /// Loads the slot's state from the store. A corrupt payload is
    /// discarded in favor of the default rather than failing the whole
    /// session.
    pub fn open(store: Arc<dyn SessionStore>, key: impl Into<String>) -> Result<Self, SessionError> {
        let key = key.into();
        let value = match store.load(&key)? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(error) => {
                    warn!(key = %key, "Discarding corrupt session payload: {}", error);
                    T::default()
                }
            },
            None => T::default(),
        };

        Ok(SessionSlot { store, key, value })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Mutates the state and persists the result. The closure's return
    /// value passes through.
    pub fn update<R>(&mut self, mutate: impl FnOnce(&mut T) -> R) -> Result<R, SessionError> {
        let result = mutate(&mut self.value);
        let raw = serde_json::to_string(&self.value)?;
        self.store.save(&self.key, &raw)?;
        Ok(result)
    }

    /// Resets to the default and drops the stored document.
    pub fn clear(&mut self) -> Result<(), SessionError> {
        self.value = T::default();
        self.store.remove(&self.key)
    }
}
