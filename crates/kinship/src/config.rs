//! Repository configuration.
//!
//! Stored as YAML in `.kinship/config.yaml`:
//!
//! ```yaml
//! id-prefix: smith
//! default-scope: smith
//! storage:
//!   data-file: .kinship/people.jsonl
//! tree:
//!   virtual-root-name: Family
//! ```
//!
//! The `tree` section is optional and defaults when absent.

use crate::commands::init::{KINSHIP_DIR_NAME, PEOPLE_FILE_NAME};
use crate::error::{Error, Result};
use crate::tree::DEFAULT_VIRTUAL_ROOT_NAME;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Configuration file structure for kinship
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct KinshipConfig {
    /// Person id prefix (e.g., "smith" for "smith-a1b2")
    pub id_prefix: String,

    /// Family tree used when a command does not name one
    pub default_scope: String,

    /// Storage configuration
    pub storage: StorageConfig,

    /// Tree rendering configuration
    #[serde(default)]
    pub tree: TreeConfig,
}

/// Storage configuration section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    /// Path to the JSONL data file, relative to the repository root
    pub data_file: String,
}

/// Tree rendering section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct TreeConfig {
    /// Name of the synthetic node above several roots
    pub virtual_root_name: String,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            virtual_root_name: DEFAULT_VIRTUAL_ROOT_NAME.to_string(),
        }
    }
}

impl KinshipConfig {
    /// Create a configuration with the given prefix and default family tree
    pub fn new(prefix: &str, default_scope: &str) -> Self {
        Self {
            id_prefix: prefix.to_string(),
            default_scope: default_scope.to_string(),
            storage: StorageConfig {
                data_file: format!("{KINSHIP_DIR_NAME}/{PEOPLE_FILE_NAME}"),
            },
            tree: TreeConfig::default(),
        }
    }

    /// Load configuration from a file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config: Self =
            serde_yaml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Resolve the data file against the repository root.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the path escapes the repository root.
    pub fn data_path(&self, root_dir: &Path) -> Result<PathBuf> {
        let relative = Path::new(&self.storage.data_file);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(Error::Config(format!(
                "storage.data-file must be a relative path inside the repository, got '{}'",
                self.storage.data_file
            )));
        }
        Ok(root_dir.join(relative))
    }

    fn validate(&self) -> Result<()> {
        crate::commands::init::validate_prefix(&self.id_prefix)?;
        if self.default_scope.trim().is_empty() {
            return Err(Error::Config("default-scope cannot be empty".to_string()));
        }
        if self.tree.virtual_root_name.trim().is_empty() {
            return Err(Error::Config(
                "tree.virtual-root-name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn test_config_new() {
        let config = KinshipConfig::new("smith", "smith");
        assert_eq!(config.id_prefix, "smith");
        assert_eq!(config.storage.data_file, ".kinship/people.jsonl");
        assert_eq!(config.tree.virtual_root_name, "Family");
    }

    #[tokio::test]
    async fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut original = KinshipConfig::new("smith", "smiths");
        original.tree.virtual_root_name = "The Smiths".to_string();
        original.save(&config_path).await.unwrap();

        let loaded = KinshipConfig::load(&config_path).await.unwrap();
        assert_eq!(original, loaded);
    }

    #[tokio::test]
    async fn test_config_yaml_format() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        KinshipConfig::new("smith", "smith")
            .save(&config_path)
            .await
            .unwrap();

        let content = tokio::fs::read_to_string(&config_path).await.unwrap();
        assert!(content.contains("id-prefix: smith"));
        assert!(content.contains("default-scope: smith"));
        assert!(content.contains("data-file: .kinship/people.jsonl"));
        assert!(content.contains("virtual-root-name: Family"));
    }

    #[tokio::test]
    async fn test_config_tree_section_optional() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        let yaml = "id-prefix: smith\ndefault-scope: smith\nstorage:\n  data-file: people.jsonl\n";
        tokio::fs::write(&config_path, yaml).await.unwrap();

        let config = KinshipConfig::load(&config_path).await.unwrap();
        assert_eq!(config.tree, TreeConfig::default());
    }

    #[tokio::test]
    async fn test_config_rejects_bad_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        let yaml = "id-prefix: s-m\ndefault-scope: smith\nstorage:\n  data-file: people.jsonl\n";
        tokio::fs::write(&config_path, yaml).await.unwrap();

        let err = KinshipConfig::load(&config_path).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[rstest]
    #[case::parent_dir("../people.jsonl")]
    #[case::nested_parent_dir(".kinship/../../people.jsonl")]
    #[case::absolute("/tmp/people.jsonl")]
    fn test_data_path_rejects_escape(#[case] data_file: &str) {
        let mut config = KinshipConfig::new("smith", "smith");
        config.storage.data_file = data_file.to_string();
        assert!(config.data_path(Path::new("/repo")).is_err());
    }

    #[test]
    fn test_data_path_joins_root() {
        let config = KinshipConfig::new("smith", "smith");
        assert_eq!(
            config.data_path(Path::new("/repo")).unwrap(),
            PathBuf::from("/repo/.kinship/people.jsonl")
        );
    }
}
