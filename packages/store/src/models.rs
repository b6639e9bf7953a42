//! # Row models for the to-do tables
//!
//! Typed mirrors of the three remote tables the application reads and writes.
//! Every type is `Serialize + Deserialize` so it can be decoded straight from the
//! JSON rows a [`crate::TableStore`] returns.
//!
//! | Struct | Table | Primary key |
//! |--------|-------|-------------|
//! | [`Profile`] | `profiles(id, email, name, avatar_url)` | `id` (= auth user id) |
//! | [`TodoList`] | `lists(list_id, name, user_id, completed)` | `list_id` (server-assigned) |
//! | [`Task`] | `tasks(task_id, task_name, description, list_id, user_id, completed, priority)` | `task_id` (server-assigned) |
//!
//! [`NewList`] and [`NewTask`] are the insert payloads: they carry no id, the
//! store assigns one and returns the full row.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of an authenticated principal, as issued by the auth provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A user's profile row. One per user, created at sign-up.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl Profile {
    /// Name to greet the user with, falling back to the email address.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.email.as_deref())
            .unwrap_or("")
    }
}

/// A named to-do list owned by one user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TodoList {
    pub list_id: i64,
    pub name: String,
    pub user_id: UserId,
    #[serde(default)]
    pub completed: bool,
}

/// Insert payload for [`TodoList`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewList {
    pub name: String,
    pub user_id: UserId,
}

/// A task inside a list. Tasks sort by `priority`, lowest first, with unset
/// priorities after every set one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: i64,
    pub task_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub list_id: i64,
    pub user_id: UserId,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Option<i64>,
}

/// Insert payload for [`Task`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub task_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub list_id: i64,
    pub user_id: UserId,
}
