//! JSONL persistence for the in-memory store.
//!
//! One person record per line, in the wire shape of
//! [`Person`](crate::domain::Person). Loading is resilient: bad lines are
//! skipped and reported, and damaged relationships are reported without
//! being repaired, so the file is never silently rewritten into a
//! different family.

use super::in_memory::InMemoryPersonStore;
use crate::domain::{Person, PersonId, ScopeId};
use crate::error::{Error, Result};
use crate::graph::{Violation, audit};
use crate::store::PersonStore;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};

/// Non-fatal problems found while loading a JSONL file.
///
/// Applications should report these: they point at data that needs manual
/// attention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// Line could not be parsed as a person record
    ///
    /// **Effect**: Line is skipped entirely.
    MalformedJson {
        /// 1-based line number
        line_number: usize,
        /// Parser message
        error: String,
    },

    /// Record parsed but a field failed validation
    ///
    /// **Effect**: Record is skipped.
    InvalidPersonData {
        /// Id of the skipped record
        person_id: PersonId,
        /// 1-based line number
        line_number: usize,
        /// Validation message
        error: String,
    },

    /// A second record reused an id
    ///
    /// **Effect**: The later record is skipped; the first one wins.
    DuplicateId {
        /// The repeated id
        person_id: PersonId,
        /// 1-based line number of the skipped record
        line_number: usize,
    },

    /// A loaded record breaks a relationship invariant
    ///
    /// **Effect**: Record is loaded as-is.
    Inconsistency(Violation),
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::MalformedJson { line_number, error } => {
                write!(f, "line {line_number}: malformed JSON: {error}")
            }
            LoadWarning::InvalidPersonData {
                person_id,
                line_number,
                error,
            } => write!(f, "line {line_number}: invalid person {person_id}: {error}"),
            LoadWarning::DuplicateId {
                person_id,
                line_number,
            } => write!(f, "line {line_number}: duplicate id {person_id}"),
            LoadWarning::Inconsistency(violation) => write!(f, "{violation}"),
        }
    }
}

/// Load a store from a JSONL file.
///
/// # Error Handling
///
/// - **Blank lines**: ignored
/// - **Malformed JSON**: line skipped, warning added
/// - **Invalid fields**: record skipped, warning added
/// - **Repeated ids**: later record skipped, warning added
/// - **Broken invariants**: record kept, one warning per violation
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be opened or read.
pub async fn load_from_jsonl(path: &Path) -> Result<(InMemoryPersonStore, Vec<LoadWarning>)> {
    let file = File::open(path).await?;
    let mut lines = BufReader::new(file).lines();

    let mut warnings = Vec::new();
    let mut records = Vec::new();
    let mut seen = HashSet::new();
    let mut line_number = 0;

    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }

        let person: Person = match serde_json::from_str(&line) {
            Ok(person) => person,
            Err(e) => {
                warnings.push(LoadWarning::MalformedJson {
                    line_number,
                    error: e.to_string(),
                });
                continue;
            }
        };

        if let Err(error) = person.validate() {
            warnings.push(LoadWarning::InvalidPersonData {
                person_id: person.id,
                line_number,
                error,
            });
            continue;
        }

        if !seen.insert(person.id.clone()) {
            warnings.push(LoadWarning::DuplicateId {
                person_id: person.id,
                line_number,
            });
            continue;
        }

        records.push(person);
    }

    warnings.extend(audit_all(&records).into_iter().map(LoadWarning::Inconsistency));

    for warning in &warnings {
        tracing::debug!(path = %path.display(), %warning, "JSONL load warning");
    }
    if !warnings.is_empty() {
        tracing::warn!(
            path = %path.display(),
            count = warnings.len(),
            "People file loaded with warnings"
        );
    }
    tracing::debug!(path = %path.display(), records = records.len(), "Loaded person records");

    Ok((InMemoryPersonStore::from_records(records), warnings))
}

/// Save every record in `store` to a JSONL file with an atomic write.
///
/// Records are written in store order, so a load after a save lists the
/// family the same way.
///
/// # Atomicity
///
/// Writes go to a temporary sibling file that is then renamed over `path`.
/// If the process is interrupted, the original file remains unchanged. On a
/// failed write or rename the temporary file is removed.
///
/// # Errors
///
/// Returns `Error::Io` or `Error::Json` if writing fails.
pub async fn save_to_jsonl<S: PersonStore>(store: &S, path: &Path) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    let records = store.list_all()?;

    let written = match write_records(&temp_path, &records).await {
        Ok(()) => tokio::fs::rename(&temp_path, path).await.map_err(Error::Io),
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        if let Err(cleanup) = tokio::fs::remove_file(&temp_path).await
            && cleanup.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %temp_path.display(), error = %cleanup, "Could not remove temp file");
        }
        return Err(e);
    }

    tracing::debug!(path = %path.display(), records = records.len(), "Saved person records");
    Ok(())
}

async fn write_records(temp_path: &Path, records: &[Person]) -> Result<()> {
    let file = File::create(temp_path).await?;
    let mut writer = BufWriter::new(file);
    for person in records {
        let json = serde_json::to_string(person)?;
        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }
    writer.flush().await?;
    Ok(())
}

/// Audit each family tree in `records` against the whole file.
fn audit_all(records: &[Person]) -> Vec<Violation> {
    let scopes: HashMap<&PersonId, &ScopeId> = records.iter().map(|p| (&p.id, &p.scope)).collect();

    // BTreeMap keeps warnings grouped by scope in a stable order.
    let mut by_scope: BTreeMap<&ScopeId, Vec<Person>> = BTreeMap::new();
    for person in records {
        by_scope.entry(&person.scope).or_default().push(person.clone());
    }

    by_scope
        .values()
        .flat_map(|members| audit(members, |id| scopes.get(id).map(|s| (*s).clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_skips_bad_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("people.jsonl");
        let content = concat!(
            r#"{"id":"s-a","name":"Alice","gender":"female","familyTree":"s"}"#,
            "\n",
            "not json\n",
            "\n",
            r#"{"id":"s-b","name":"  ","gender":"male","familyTree":"s"}"#,
            "\n",
            r#"{"id":"s-a","name":"Again","gender":"female","familyTree":"s"}"#,
            "\n",
        );
        tokio::fs::write(&path, content).await.unwrap();

        let (store, warnings) = load_from_jsonl(&path).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&PersonId::new("s-a")).unwrap().name, "Alice");
        assert_eq!(warnings.len(), 3);
        assert!(matches!(
            warnings[0],
            LoadWarning::MalformedJson { line_number: 2, .. }
        ));
        assert!(matches!(
            warnings[1],
            LoadWarning::InvalidPersonData { line_number: 4, .. }
        ));
        assert!(matches!(
            warnings[2],
            LoadWarning::DuplicateId { line_number: 5, .. }
        ));
    }

    #[tokio::test]
    async fn test_load_reports_one_sided_edge() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("people.jsonl");
        let content = concat!(
            r#"{"id":"s-a","name":"Alice","children":["s-b"],"familyTree":"s"}"#,
            "\n",
            r#"{"id":"s-b","name":"Bob","familyTree":"s"}"#,
            "\n",
        );
        tokio::fs::write(&path, content).await.unwrap();

        let (store, warnings) = load_from_jsonl(&path).await.unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(
            warnings,
            vec![LoadWarning::Inconsistency(Violation::ParentChildAsymmetry {
                parent: PersonId::new("s-a"),
                child: PersonId::new("s-b"),
            })]
        );
        // Nothing is repaired on load.
        assert_eq!(
            store.get(&PersonId::new("s-a")).unwrap().children,
            vec![PersonId::new("s-b")]
        );
    }

    #[tokio::test]
    async fn test_failed_save_removes_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        // A directory in the way makes the final rename fail.
        let path = temp_dir.path().join("people.jsonl");
        tokio::fs::create_dir(&path).await.unwrap();
        let store = InMemoryPersonStore::from_records([Person::new(
            PersonId::new("s-a"),
            ScopeId::new("s"),
            "Alice",
        )]);

        let err = save_to_jsonl(&store, &path).await.unwrap_err();

        assert!(matches!(err, Error::Io(_)));
        assert!(!path.with_extension("tmp").exists());
        assert!(path.is_dir());
    }

    #[tokio::test]
    async fn test_save_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("people.jsonl");
        let store = InMemoryPersonStore::from_records([Person::new(
            PersonId::new("s-a"),
            ScopeId::new("s"),
            "Alice",
        )]);

        save_to_jsonl(&store, &path).await.unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(content.lines().count(), 1);
    }
}
