//! Auth session: the single owner of the bearer token, mirrored into a durable store.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Key under which the token is persisted.
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// Durable storage for the token (browser cookie in the web server, memory in tests).
pub trait TokenStore {
    fn load(&self) -> Option<String>;
    fn save(&self, token: &str);
    fn clear(&self);
}

/// Key/value store kept in memory. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryTokenStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a token, as if left over from an earlier visit.
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store
            .entries
            .borrow_mut()
            .insert(AUTH_TOKEN_KEY.to_string(), token.into());
        store
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.get(AUTH_TOKEN_KEY)
    }

    fn save(&self, token: &str) {
        self.entries
            .borrow_mut()
            .insert(AUTH_TOKEN_KEY.to_string(), token.to_string());
    }

    fn clear(&self) {
        self.entries.borrow_mut().remove(AUTH_TOKEN_KEY);
    }
}

/// In-memory token plus its durable copy. Every change goes through here so the two never drift.
pub struct Session {
    token: RefCell<Option<String>>,
    store: Box<dyn TokenStore>,
}

impl Session {
    /// Build a session, restoring any token the store already holds.
    pub fn restore(store: impl TokenStore + 'static) -> Self {
        let token = store.load().filter(|t| !t.is_empty());
        Self {
            token: RefCell::new(token),
            store: Box::new(store),
        }
    }

    /// Session with no durable backing (e.g. player-only flows).
    pub fn ephemeral() -> Self {
        Self::restore(MemoryTokenStore::new())
    }

    pub fn token(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    /// Holds a token, falling back to the durable store when memory is empty.
    pub fn is_authenticated(&self) -> bool {
        self.token.borrow().is_some() || self.refresh_from_store()
    }

    pub fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        self.store.save(&token);
        *self.token.borrow_mut() = Some(token);
    }

    /// Drop both copies.
    pub fn clear(&self) {
        self.store.clear();
        self.token.borrow_mut().take();
    }

    /// Re-read the durable copy. Returns whether a token is now held.
    pub fn refresh_from_store(&self) -> bool {
        match self.store.load().filter(|t| !t.is_empty()) {
            Some(token) => {
                *self.token.borrow_mut() = Some(token);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.borrow().as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
