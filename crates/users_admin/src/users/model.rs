use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
}

/// A user account as listed by the admin API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub groups: Vec<Group>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub active_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_disabled: bool,
    #[serde(default)]
    pub is_invitation_pending: bool,
}

impl User {
    /// Navigation target of a row click.
    pub fn detail_path(&self) -> String {
        format!("users/{}", self.id)
    }
}
