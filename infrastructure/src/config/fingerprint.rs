//! Configuration fingerprint recorded with each session

use super::agents::FileAgentsConfig;
use super::error::ConfigError;
use super::file_config::FileConfig;
use sha2::{Digest, Sha256};
use std::fmt::Write;

const HASH_HEX_LEN: usize = 16;

/// First 16 hex characters of the SHA-256 of the resolved configuration.
///
/// Secrets are cleared before hashing so the fingerprint can be stored
/// alongside transcripts.
pub fn config_hash(config: &FileConfig, agents: &FileAgentsConfig) -> Result<String, ConfigError> {
    let mut redacted = config.clone();
    redacted.llm.api.api_key = None;

    let serialized = serde_json::to_vec(&(&redacted, agents))
        .map_err(|e| ConfigError::Serialize(e.to_string()))?;
    let digest = Sha256::digest(&serialized);

    let mut hex = String::with_capacity(HASH_HEX_LEN);
    for byte in digest.iter().take(HASH_HEX_LEN / 2) {
        let _ = write!(hex, "{:02x}", byte);
    }
    Ok(hex)
}
