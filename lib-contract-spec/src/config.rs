//! Decoder Configuration
//!
//! Limits and behavior switches for spec decoding. Loadable from TOML;
//! every field is optional and falls back to its default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{SpecError, SpecResult};
use crate::xdr::{Limits, DEFAULT_DEPTH_LIMIT};

/// Name of the wasm custom section carrying the contract spec
pub const CONTRACT_SPEC_SECTION: &str = "contractspecv0";

/// How entry boundaries are located
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStrategy {
    /// Probe every candidate length (quadratic worst case)
    #[default]
    BruteForce,
    /// Read entries sequentially from a cursor
    Streaming,
}

/// Configuration for [`crate::SpecDecoder`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Boundary search strategy
    pub strategy: ScanStrategy,

    /// Upper bound on candidate entry length for the brute-force scan;
    /// rejected with the streaming strategy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_candidate_len: Option<usize>,

    /// Maximum nesting of type definitions inside one entry
    pub max_type_depth: u32,

    /// Fail with `SpecError::Truncated` instead of returning a partial result
    pub reject_truncated: bool,

    /// Custom section to read when the input is a wasm module
    pub section_name: String,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            strategy: ScanStrategy::BruteForce,
            max_candidate_len: None,
            max_type_depth: DEFAULT_DEPTH_LIMIT,
            reject_truncated: false,
            section_name: CONTRACT_SPEC_SECTION.to_string(),
        }
    }
}

impl DecoderConfig {
    /// Strict config for tests: truncation is an error
    pub fn for_testing() -> Self {
        Self {
            reject_truncated: true,
            max_type_depth: 64,
            ..Self::default()
        }
    }

    pub fn limits(&self) -> Limits {
        Limits::with_depth(self.max_type_depth)
    }

    pub fn validate(&self) -> SpecResult<()> {
        if self.max_type_depth == 0 {
            return Err(SpecError::Config(
                "max_type_depth must be at least 1".to_string(),
            ));
        }
        if self.max_candidate_len == Some(0) {
            return Err(SpecError::Config(
                "max_candidate_len must be at least 1 when set".to_string(),
            ));
        }
        if self.strategy == ScanStrategy::Streaming && self.max_candidate_len.is_some() {
            return Err(SpecError::Config(
                "max_candidate_len only applies to the brute_force strategy".to_string(),
            ));
        }
        if self.section_name.trim().is_empty() {
            return Err(SpecError::Config("section_name cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn from_toml_str(raw: &str) -> SpecResult<Self> {
        let config: Self = toml::from_str(raw)
            .map_err(|e| SpecError::Config(format!("Invalid decoder config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> SpecResult<Self> {
        if !path.exists() {
            return Err(SpecError::Config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }
        let raw = fs::read_to_string(path)
            .map_err(|e| SpecError::Config(format!("Failed to read config: {}", e)))?;
        Self::from_toml_str(&raw)
    }
}
