//! Spec input normalisation
//!
//! Spec sections arrive as raw bytes, as base64 or hex text copied from
//! RPC responses, or embedded in a compiled wasm module.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

use crate::errors::{SpecError, SpecResult};
use crate::wasm::{custom_section, is_wasm_module};

/// Encoding of the bytes handed to [`load_spec_bytes`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecSource {
    /// Wasm module if the magic number is present, raw XDR otherwise
    #[default]
    Auto,
    Raw,
    Base64,
    Hex,
    Wasm,
}

impl FromStr for SpecSource {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(SpecSource::Auto),
            "raw" | "xdr" => Ok(SpecSource::Raw),
            "base64" => Ok(SpecSource::Base64),
            "hex" => Ok(SpecSource::Hex),
            "wasm" => Ok(SpecSource::Wasm),
            other => Err(SpecError::InvalidEncoding(format!(
                "unknown source '{}', expected auto, raw, base64, hex or wasm",
                other
            ))),
        }
    }
}

impl fmt::Display for SpecSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SpecSource::Auto => "auto",
            SpecSource::Raw => "raw",
            SpecSource::Base64 => "base64",
            SpecSource::Hex => "hex",
            SpecSource::Wasm => "wasm",
        };
        f.write_str(name)
    }
}

fn compact_text(input: &[u8]) -> SpecResult<String> {
    let text = std::str::from_utf8(input)
        .map_err(|e| SpecError::InvalidEncoding(format!("input is not text: {}", e)))?;
    Ok(text.split_whitespace().collect())
}

/// Turn `input` into the raw spec section bytes
pub fn load_spec_bytes(input: &[u8], source: SpecSource, section_name: &str) -> SpecResult<Vec<u8>> {
    match source {
        SpecSource::Auto if is_wasm_module(input) => {
            load_spec_bytes(input, SpecSource::Wasm, section_name)
        }
        SpecSource::Auto | SpecSource::Raw => Ok(input.to_vec()),
        SpecSource::Base64 => general_purpose::STANDARD
            .decode(compact_text(input)?)
            .map_err(|e| SpecError::InvalidEncoding(format!("invalid base64: {}", e))),
        SpecSource::Hex => {
            let text = compact_text(input)?;
            let digits = text.strip_prefix("0x").unwrap_or(&text);
            hex::decode(digits).map_err(|e| SpecError::InvalidEncoding(format!("invalid hex: {}", e)))
        }
        SpecSource::Wasm => custom_section(input, section_name)?
            .map(|section| section.to_vec())
            .ok_or_else(|| SpecError::SectionNotFound(section_name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CONTRACT_SPEC_SECTION;
    use crate::wasm::test_support::module_with_custom_sections;

    #[test]
    fn test_parse_source_names() {
        assert_eq!("BASE64".parse::<SpecSource>().unwrap(), SpecSource::Base64);
        assert_eq!("xdr".parse::<SpecSource>().unwrap(), SpecSource::Raw);
        assert!("yaml".parse::<SpecSource>().is_err());
        assert_eq!(SpecSource::Hex.to_string(), "hex");
    }

    #[test]
    fn test_auto_detects_wasm() {
        let module = module_with_custom_sections(&[(CONTRACT_SPEC_SECTION, &[0, 0, 0, 1])]);
        let bytes = load_spec_bytes(&module, SpecSource::Auto, CONTRACT_SPEC_SECTION).unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 1]);
    }

    #[test]
    fn test_auto_passes_raw_through() {
        let bytes = load_spec_bytes(&[0, 0, 0, 0], SpecSource::Auto, CONTRACT_SPEC_SECTION).unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_base64_ignores_whitespace() {
        let bytes =
            load_spec_bytes(b"AAAA\nAAE=\n", SpecSource::Base64, CONTRACT_SPEC_SECTION).unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_hex_with_prefix() {
        let bytes = load_spec_bytes(b"0x00000004", SpecSource::Hex, CONTRACT_SPEC_SECTION).unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 4]);
        assert!(load_spec_bytes(b"zz", SpecSource::Hex, CONTRACT_SPEC_SECTION).is_err());
    }

    #[test]
    fn test_wasm_without_section() {
        let module = module_with_custom_sections(&[]);
        assert_eq!(
            load_spec_bytes(&module, SpecSource::Wasm, "custom"),
            Err(SpecError::SectionNotFound("custom".to_string()))
        );
    }
}
