//! Application context for CLI command execution.
//!
//! [`App`] finds the repository, loads its configuration and people file,
//! and owns the [`RelationshipGraph`] the commands run against.
//!
//! ```no_run
//! use kinship::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::from_directory(Path::new(".")).await?;
//!     println!("{} warning(s) on load", app.load_warnings().len());
//!     Ok(())
//! }
//! ```

use crate::commands::init::{CONFIG_FILE_NAME, KINSHIP_DIR_NAME, find_kinship_root};
use crate::config::KinshipConfig;
use crate::domain::ScopeId;
use crate::error::{Error, Result};
use crate::graph::RelationshipGraph;
use crate::store::{InMemoryPersonStore, LoadWarning, load_from_jsonl, save_to_jsonl};
use std::path::{Path, PathBuf};

/// Application context for CLI operations.
#[derive(Debug)]
pub struct App {
    graph: RelationshipGraph<InMemoryPersonStore>,

    config: KinshipConfig,

    /// Path to the kinship directory (.kinship)
    kinship_dir: PathBuf,

    /// Resolved path of the people file
    data_path: PathBuf,

    load_warnings: Vec<LoadWarning>,
}

impl App {
    /// Create an App from the given working directory.
    ///
    /// Searches up the directory tree for `.kinship/`, loads the
    /// configuration and then the people file. A missing people file loads
    /// as an empty family.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No kinship repository is found in the directory tree
    /// - Configuration cannot be loaded
    /// - The people file exists but cannot be read
    pub async fn from_directory(working_dir: &Path) -> Result<Self> {
        let root_dir = find_kinship_root(working_dir).ok_or_else(|| {
            Error::Config("Not a kinship repository (run 'kinship init' first)".to_string())
        })?;

        let kinship_dir = root_dir.join(KINSHIP_DIR_NAME);
        let config = KinshipConfig::load(&kinship_dir.join(CONFIG_FILE_NAME)).await?;
        let data_path = config.data_path(&root_dir)?;

        let (store, load_warnings) = if data_path.exists() {
            load_from_jsonl(&data_path).await?
        } else {
            tracing::debug!(path = %data_path.display(), "People file missing, starting empty");
            (InMemoryPersonStore::new(), Vec::new())
        };

        Ok(Self {
            graph: RelationshipGraph::with_id_prefix(store, config.id_prefix.clone()),
            config,
            kinship_dir,
            data_path,
            load_warnings,
        })
    }

    /// The relationship graph.
    pub fn graph(&self) -> &RelationshipGraph<InMemoryPersonStore> {
        &self.graph
    }

    /// The relationship graph, for mutations.
    pub fn graph_mut(&mut self) -> &mut RelationshipGraph<InMemoryPersonStore> {
        &mut self.graph
    }

    /// Loaded configuration
    pub fn config(&self) -> &KinshipConfig {
        &self.config
    }

    /// Path to the kinship directory
    pub fn kinship_dir(&self) -> &Path {
        &self.kinship_dir
    }

    /// Path to the people file
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Problems found while loading the people file
    pub fn load_warnings(&self) -> &[LoadWarning] {
        &self.load_warnings
    }

    /// `requested` if given, else the configured default family tree.
    pub fn scope(&self, requested: Option<&str>) -> ScopeId {
        ScopeId::new(requested.unwrap_or(&self.config.default_scope))
    }

    /// Write the store back to the people file.
    ///
    /// Call after every successful mutation.
    pub async fn save(&self) -> Result<()> {
        save_to_jsonl(self.graph.store(), &self.data_path).await
    }
}
