use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::RwLock;

/// In-memory credential store with boolean outcomes.
///
/// Consumers only learn success or failure, never why a login failed.
#[derive(Debug, Default)]
pub struct UserService {
    users: RwLock<HashMap<String, String>>,
}

impl UserService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user. `false` when either field is empty or the username
    /// is already taken.
    pub fn register(&self, username: &str, password: &str) -> bool {
        if username.is_empty() || password.is_empty() {
            return false;
        }

        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        match users.entry(username.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(password.to_string());
                true
            }
        }
    }

    /// Checks credentials. `false` on empty fields, unknown user, or a
    /// password mismatch.
    pub fn login(&self, username: &str, password: &str) -> bool {
        if username.is_empty() || password.is_empty() {
            return false;
        }

        self.users
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(username)
            .is_some_and(|stored| stored == password)
    }

    pub fn user_count(&self) -> usize {
        self.users
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn username_exists(&self, username: &str) -> bool {
        self.users
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(username)
    }
}
