//! Hash-based person id generation.
//!
//! Ids have the form `{prefix}-{hash}` where the hash is a base36 rendering
//! of a SHA-256 digest over the person's name, scope, a timestamp and a
//! retry nonce. Length adapts to the size of the family tree (4-6 chars).
//!
//! The generator keeps no record of issued ids; callers pass a predicate
//! that reports whether a candidate is already taken, so the store stays
//! the single source of truth.
//!
//! ```
//! use kinship::domain::ScopeId;
//! use kinship::id_generation::{IdGenerator, IdGeneratorConfig};
//!
//! let generator = IdGenerator::new(IdGeneratorConfig {
//!     prefix: "smith".to_string(),
//! });
//! let id = generator
//!     .generate("Alice", &ScopeId::new("smith"), 0, |_| false)
//!     .unwrap();
//! assert!(id.starts_with("smith-"));
//! ```

use crate::domain::ScopeId;
use chrono::Utc;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, warn};

const BASE36_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const MAX_NONCE: u32 = 100;
const MAX_LENGTH: usize = 6;

/// Errors that can occur during id generation
#[derive(Debug, Error)]
pub enum IdGenerationError {
    /// Every nonce at every permitted length collided
    #[error("Unable to generate unique ID after {attempts} attempts")]
    CollisionExhausted {
        /// Number of candidates tried
        attempts: u32,
    },

    /// Requested a zero-length hash
    #[error("Length must be greater than 0")]
    InvalidLength,
}

/// Configuration for id generation
#[derive(Debug, Clone)]
pub struct IdGeneratorConfig {
    /// Prefix for all ids (e.g., "smith")
    pub prefix: String,
}

/// Hash-based id generator
#[derive(Debug, Clone)]
pub struct IdGenerator {
    config: IdGeneratorConfig,
}

impl IdGenerator {
    /// Create a new id generator with the given configuration
    pub fn new(config: IdGeneratorConfig) -> Self {
        Self { config }
    }

    /// The configured prefix
    pub fn prefix(&self) -> &str {
        &self.config.prefix
    }

    /// Generate an id not rejected by `is_taken`.
    ///
    /// `population` is the current size of the family tree and selects the
    /// hash length. When every nonce collides the length grows by one, up to
    /// six characters.
    ///
    /// # Errors
    ///
    /// Returns [`IdGenerationError::CollisionExhausted`] if no free id was
    /// found.
    pub fn generate(
        &self,
        name: &str,
        scope: &ScopeId,
        population: usize,
        is_taken: impl Fn(&str) -> bool,
    ) -> Result<String, IdGenerationError> {
        let mut attempts = 0;

        for length in adaptive_length(population)..=MAX_LENGTH {
            for nonce in 0..MAX_NONCE {
                attempts += 1;
                let id = self.hash_id(name, scope, nonce, length)?;
                if !is_taken(&id) {
                    if nonce > 0 {
                        debug!(nonce, length, "Generated unique person id after collisions");
                    }
                    return Ok(id);
                }
            }
            warn!(
                length,
                max_nonce = MAX_NONCE,
                "All nonces exhausted, increasing id length"
            );
        }

        Err(IdGenerationError::CollisionExhausted { attempts })
    }

    fn hash_id(
        &self,
        name: &str,
        scope: &ScopeId,
        nonce: u32,
        length: usize,
    ) -> Result<String, IdGenerationError> {
        let timestamp = Utc::now().timestamp_micros();
        let content = format!("{name}|{scope}|{timestamp}|{nonce}");

        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        let digest = hasher.finalize();

        let hash = encode_base36(&digest[..8], length)?;
        Ok(format!("{}-{}", self.config.prefix, hash))
    }
}

/// Hash length for a family tree of `population` persons.
///
/// - 0-500: 4 chars
/// - 501-1,500: 5 chars
/// - larger: 6 chars
fn adaptive_length(population: usize) -> usize {
    match population {
        0..=500 => 4,
        501..=1500 => 5,
        _ => 6,
    }
}

/// Encode up to 8 bytes as a fixed-length base36 string.
fn encode_base36(bytes: &[u8], length: usize) -> Result<String, IdGenerationError> {
    if length == 0 {
        return Err(IdGenerationError::InvalidLength);
    }

    let num = bytes
        .iter()
        .fold(0u64, |acc, &byte| acc.wrapping_shl(8).wrapping_add(u64::from(byte)));

    let mut n = num;
    let mut out = Vec::with_capacity(length);
    while out.len() < length {
        // n % 36 is always < 36
        #[allow(clippy::cast_possible_truncation)]
        out.push(char::from(BASE36_CHARS[(n % 36) as usize]));
        n /= 36;
    }
    out.reverse();

    Ok(out.into_iter().collect())
}
