//! Implementation of the `init` command.
//!
//! Creates the `.kinship/` directory with a configuration file and an empty
//! people file, and locates an existing one from any subdirectory.

use crate::config::KinshipConfig;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Default id prefix if none specified
pub const DEFAULT_PREFIX: &str = "family";

/// Name of the kinship directory
pub const KINSHIP_DIR_NAME: &str = ".kinship";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Name of the people data file
pub const PEOPLE_FILE_NAME: &str = "people.jsonl";

/// Minimum prefix length
pub const MIN_PREFIX_LENGTH: usize = 2;

/// Maximum prefix length
pub const MAX_PREFIX_LENGTH: usize = 20;

/// Maximum directory depth to traverse when searching for the kinship root
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Result of the init command
#[derive(Debug)]
pub struct InitResult {
    /// Path to the created kinship directory
    pub kinship_dir: PathBuf,
    /// Path to the created config file
    pub config_file: PathBuf,
    /// Path to the created people file
    pub people_file: PathBuf,
    /// The prefix used for person ids
    pub prefix: String,
    /// The default family tree
    pub default_scope: String,
}

/// Validate the person id prefix.
///
/// Requirements:
/// - 2-20 characters
/// - ASCII letters and digits only
///
/// Expects pre-trimmed input.
pub fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.len() < MIN_PREFIX_LENGTH {
        return Err(Error::Config(format!(
            "Prefix must be at least {MIN_PREFIX_LENGTH} characters"
        )));
    }

    if prefix.len() > MAX_PREFIX_LENGTH {
        return Err(Error::Config(format!(
            "Prefix cannot exceed {MAX_PREFIX_LENGTH} characters"
        )));
    }

    if !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::Config(
            "Prefix must contain only alphanumeric characters".to_string(),
        ));
    }

    Ok(())
}

/// Initialize a new kinship repository in `base_dir`.
///
/// `scope` defaults to the prefix.
///
/// # Errors
///
/// Returns an error if:
/// - The `.kinship/` directory already exists
/// - The prefix is invalid
/// - File system operations fail
pub async fn init(base_dir: &Path, prefix: Option<&str>, scope: Option<&str>) -> Result<InitResult> {
    let prefix = prefix.unwrap_or(DEFAULT_PREFIX).trim();
    validate_prefix(prefix)?;

    let default_scope = scope.map_or(prefix, str::trim);
    if default_scope.is_empty() {
        return Err(Error::Config("Family tree name cannot be empty".to_string()));
    }

    let kinship_dir = base_dir.join(KINSHIP_DIR_NAME);
    if kinship_dir.exists() {
        return Err(Error::Config(format!(
            "Kinship is already initialized in this directory. Found existing '{KINSHIP_DIR_NAME}'"
        )));
    }

    fs::create_dir_all(&kinship_dir).await?;

    let config_file = kinship_dir.join(CONFIG_FILE_NAME);
    let config = KinshipConfig::new(prefix, default_scope);
    config.save(&config_file).await?;

    let people_file = kinship_dir.join(PEOPLE_FILE_NAME);
    fs::write(&people_file, "").await?;

    tracing::info!(dir = %kinship_dir.display(), prefix, "Initialized kinship repository");

    Ok(InitResult {
        kinship_dir,
        config_file,
        people_file,
        prefix: prefix.to_string(),
        default_scope: default_scope.to_string(),
    })
}

/// Find the directory containing `.kinship/`, searching upward from
/// `start_dir` at most [`MAX_TRAVERSAL_DEPTH`] levels.
pub fn find_kinship_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        if current.join(KINSHIP_DIR_NAME).exists() {
            return Some(current);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH || !current.pop() {
            return None;
        }
    }
}
