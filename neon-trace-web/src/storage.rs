//! `localStorage`-backed session slot.
use neon_trace_game::SessionStore;
use wasm_bindgen::JsValue;

use crate::dom;

/// Session store using the browser's `localStorage`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSessionStore;

#[derive(Debug, thiserror::Error)]
pub enum WebStoreError {
    #[error("localStorage unavailable: {0}")]
    Unavailable(String),
    #[error("storage error: {0}")]
    Backend(String),
}

impl WebStoreError {
    fn unavailable(value: &JsValue) -> Self {
        Self::Unavailable(dom::js_error_message(value))
    }

    fn backend(value: &JsValue) -> Self {
        Self::Backend(dom::js_error_message(value))
    }
}

impl SessionStore for WebSessionStore {
    type Error = WebStoreError;

    fn read(&self, key: &str) -> Result<Option<String>, Self::Error> {
        let storage = dom::local_storage().map_err(|e| WebStoreError::unavailable(&e))?;
        storage.get_item(key).map_err(|e| WebStoreError::backend(&e))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
        let storage = dom::local_storage().map_err(|e| WebStoreError::unavailable(&e))?;
        storage
            .set_item(key, value)
            .map_err(|e| WebStoreError::backend(&e))
    }

    fn remove(&mut self, key: &str) -> Result<(), Self::Error> {
        let storage = dom::local_storage().map_err(|e| WebStoreError::unavailable(&e))?;
        storage
            .remove_item(key)
            .map_err(|e| WebStoreError::backend(&e))
    }
}
