use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// A project record as persisted by the store. The workflow engine reads
/// and writes the status fields but the store owns persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub workflow_id: String,
    pub status: String,
    pub assigned_division: String,
    pub progress: u8,
    #[serde(default)]
    pub next_action: Option<String>,
    /// Index into the bound workflow's step list.
    pub current_step: usize,
    /// Divisions that have reported done on the current parallel step.
    /// Persisted so a crash between two divisions' completions does not
    /// lose progress. Cleared on every step change.
    #[serde(default)]
    pub division_completions: BTreeSet<String>,
    /// Append-only.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub files: Vec<ProjectFile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub actor: String,
    pub role: String,
    pub kind: HistoryKind,
    pub action: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryKind {
    Created,
    Action,
    Revision,
    ManualOverride,
}

/// Uploaded artifact attributed to its uploader and the checklist step it
/// belongs to. Revision archives rather than deletes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub file_name: String,
    pub uploaded_by: String,
    pub step_name: String,
    #[serde(default)]
    pub archived: bool,
    pub uploaded_at: DateTime<Utc>,
}

impl Project {
    /// Append one history entry. Every fired transition goes through here
    /// exactly once.
    pub fn record(
        &mut self,
        kind: HistoryKind,
        actor: &str,
        role: &str,
        action: &str,
        note: Option<String>,
    ) {
        let now = Utc::now();
        self.history.push(HistoryEntry {
            id: Uuid::new_v4().to_string(),
            timestamp: now,
            actor: actor.to_string(),
            role: role.to_string(),
            kind,
            action: action.to_string(),
            note,
        });
        self.updated_at = now;
    }
}

/// Directory entry for an acting user. Roles double as division names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub display_name: String,
    pub roles: Vec<String>,
}

impl User {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
