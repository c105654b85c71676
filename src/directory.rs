//! User directory: resolves acting users and their role lists for
//! authorization checks.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

use crate::project::User;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DirectoryError>;
}

/// All users in one `users.json` under the data directory. The file is
/// small and read per lookup; this is an HR roster, not a hot path.
pub struct FileUserDirectory {
    path: PathBuf,
}

impl FileUserDirectory {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            path: data_dir.as_ref().join("users.json"),
        }
    }

    pub async fn load_all(&self) -> Result<Vec<User>, DirectoryError> {
        if !self.path.exists() {
            return Ok(vec![]);
        }
        let contents = fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub async fn save_all(&self, users: &[User]) -> Result<(), DirectoryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let serialized = serde_json::to_string_pretty(users)?;
        fs::write(&self.path, serialized).await?;
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for FileUserDirectory {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DirectoryError> {
        Ok(self
            .load_all()
            .await?
            .into_iter()
            .find(|u| u.username == username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn finds_user_by_username() {
        let temp_dir = TempDir::new().unwrap();
        let directory = FileUserDirectory::new(temp_dir.path());

        directory
            .save_all(&[User {
                username: "budi".to_string(),
                display_name: "Budi Santoso".to_string(),
                roles: vec!["Arsitek".to_string()],
            }])
            .await
            .unwrap();

        let user = directory.find_by_username("budi").await.unwrap().unwrap();
        assert_eq!(user.roles, vec!["Arsitek"]);
        assert!(directory.find_by_username("siti").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_file_means_empty_roster() {
        let temp_dir = TempDir::new().unwrap();
        let directory = FileUserDirectory::new(temp_dir.path());
        assert!(directory.find_by_username("budi").await.unwrap().is_none());
    }
}
