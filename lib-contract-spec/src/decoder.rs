//! Spec decoder driver
//!
//! Runs the configured [`BoundaryScanner`] over a spec buffer and projects
//! the recovered records. Scan failures degrade to a partial result carrying
//! a [`Truncation`] marker; projection failures on validated records are
//! hard errors.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{DecoderConfig, ScanStrategy};
use crate::errors::{SpecError, SpecResult};
use crate::interface::ContractInterface;
use crate::observer::{DecodeObserver, NoopObserver, ScanEvent};
use crate::scanner::{BoundaryScanner, BruteForceScanner, ScanOutcome, StreamingScanner, Truncation};
use crate::signature::{extract_signature, FunctionSignature};

/// Function signatures recovered from one buffer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeOutcome {
    /// Signatures in section order
    pub signatures: Vec<FunctionSignature>,

    /// Records of any kind recovered by the scan
    pub records_decoded: usize,

    /// Set when the scan stopped before the end of the buffer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncation: Option<Truncation>,
}

impl DecodeOutcome {
    pub fn is_truncated(&self) -> bool {
        self.truncation.is_some()
    }
}

/// Full interface recovered from one buffer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceOutcome {
    pub interface: ContractInterface,
    pub records_decoded: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncation: Option<Truncation>,
}

impl InterfaceOutcome {
    pub fn is_truncated(&self) -> bool {
        self.truncation.is_some()
    }
}

fn build_scanner(config: &DecoderConfig) -> Box<dyn BoundaryScanner> {
    let limits = config.limits();
    match config.strategy {
        ScanStrategy::BruteForce => {
            let mut scanner = BruteForceScanner::new(limits);
            if let Some(max) = config.max_candidate_len {
                scanner = scanner.with_max_candidate_len(max);
            }
            Box::new(scanner)
        }
        ScanStrategy::Streaming => Box::new(StreamingScanner::new(limits)),
    }
}

/// Decodes contract spec sections into function signatures
///
/// Holds no per-call state, so one decoder can be shared across threads.
pub struct SpecDecoder {
    config: DecoderConfig,
    scanner: Box<dyn BoundaryScanner>,
    observer: Arc<dyn DecodeObserver>,
}

impl Default for SpecDecoder {
    fn default() -> Self {
        let config = DecoderConfig::default();
        Self {
            scanner: build_scanner(&config),
            config,
            observer: Arc::new(NoopObserver),
        }
    }
}

impl std::fmt::Debug for SpecDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecDecoder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SpecDecoder {
    pub fn new(config: DecoderConfig) -> SpecResult<Self> {
        config.validate()?;
        Ok(Self {
            scanner: build_scanner(&config),
            config,
            observer: Arc::new(NoopObserver),
        })
    }

    /// Route diagnostics to `observer`
    pub fn with_observer(mut self, observer: Arc<dyn DecodeObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Replace the boundary scanner chosen by the config
    pub fn with_scanner(mut self, scanner: Box<dyn BoundaryScanner>) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Recover every record; never fails
    pub fn decode_records(&self, buffer: &[u8]) -> ScanOutcome {
        self.scanner.scan(buffer, self.observer.as_ref())
    }

    fn check_truncation(&self, truncation: Option<Truncation>) -> SpecResult<()> {
        match truncation {
            Some(Truncation { offset, discarded }) if self.config.reject_truncated => {
                Err(SpecError::Truncated { offset, discarded })
            }
            _ => Ok(()),
        }
    }

    /// Recover the function signatures declared in `buffer`
    pub fn decode(&self, buffer: &[u8]) -> SpecResult<DecodeOutcome> {
        let scan = self.decode_records(buffer);
        self.check_truncation(scan.truncation)?;

        let mut signatures = Vec::new();
        for record in &scan.records {
            if let Some(signature) = extract_signature(record)? {
                self.observer.on_event(&ScanEvent::SignatureExtracted {
                    offset: record.offset,
                    name: signature.name.clone(),
                });
                signatures.push(signature);
            }
        }

        Ok(DecodeOutcome {
            signatures,
            records_decoded: scan.records.len(),
            truncation: scan.truncation,
        })
    }

    /// Recover every definition declared in `buffer`
    pub fn decode_interface(&self, buffer: &[u8]) -> SpecResult<InterfaceOutcome> {
        let scan = self.decode_records(buffer);
        self.check_truncation(scan.truncation)?;

        Ok(InterfaceOutcome {
            interface: ContractInterface::from_records(&scan.records)?,
            records_decoded: scan.records.len(),
            truncation: scan.truncation,
        })
    }
}

/// Decode with the default configuration
pub fn decode_function_signatures(buffer: &[u8]) -> SpecResult<DecodeOutcome> {
    SpecDecoder::default().decode(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{FunctionSpec, SpecEntry, StructSpec};
    use crate::observer::RecordingObserver;
    use crate::types::{TypeDef, TypeName};
    use crate::xdr::WriteXdr;

    fn increment() -> Vec<u8> {
        SpecEntry::Function(FunctionSpec::new("increment").with_output(TypeDef::U32)).to_xdr()
    }

    #[test]
    fn test_empty_buffer_is_not_an_error() {
        let outcome = decode_function_signatures(&[]).unwrap();
        assert!(outcome.signatures.is_empty());
        assert!(!outcome.is_truncated());
        assert_eq!(outcome.records_decoded, 0);
    }

    #[test]
    fn test_increment_scenario() {
        let outcome = decode_function_signatures(&increment()).unwrap();
        let json = serde_json::to_value(&outcome.signatures).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "name": "increment",
                "docs": null,
                "inputs": [],
                "outputs": [{ "type": "SC_SPEC_TYPE_U32" }]
            }])
        );
    }

    #[test]
    fn test_partial_decode_is_reported() {
        let mut buffer = increment();
        buffer.extend_from_slice(&[1, 2, 3]);
        let outcome = decode_function_signatures(&buffer).unwrap();
        assert_eq!(outcome.signatures.len(), 1);
        assert_eq!(
            outcome.truncation,
            Some(Truncation {
                offset: increment().len(),
                discarded: 3
            })
        );
    }

    #[test]
    fn test_reject_truncated_turns_partial_into_error() {
        let mut buffer = increment();
        buffer.extend_from_slice(&[1, 2, 3]);
        let decoder = SpecDecoder::new(DecoderConfig::for_testing()).unwrap();
        assert_eq!(
            decoder.decode(&buffer),
            Err(SpecError::Truncated {
                offset: increment().len(),
                discarded: 3
            })
        );
    }

    #[test]
    fn test_malformed_function_propagates() {
        let mut function = FunctionSpec::new("x").with_output(TypeDef::U32);
        function.name = vec![0xff];
        let mut buffer = increment();
        let offset = buffer.len();
        buffer.extend(SpecEntry::Function(function).to_xdr());

        let err = decode_function_signatures(&buffer).unwrap_err();
        assert!(matches!(err, SpecError::MalformedRecord { offset: o, .. } if o == offset));
    }

    #[test]
    fn test_observer_sees_extraction() {
        let observer = Arc::new(RecordingObserver::new());
        let decoder = SpecDecoder::default().with_observer(observer.clone());
        decoder.decode(&increment()).unwrap();

        let events = observer.events();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[1],
            ScanEvent::SignatureExtracted {
                offset: 0,
                name: "increment".to_string()
            }
        );
    }

    #[test]
    fn test_streaming_strategy_from_config() {
        let config = DecoderConfig {
            strategy: ScanStrategy::Streaming,
            ..DecoderConfig::default()
        };
        let decoder = SpecDecoder::new(config).unwrap();
        let outcome = decoder.decode(&increment()).unwrap();
        assert_eq!(outcome.signatures[0].outputs[0].type_name, TypeName::U32);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = DecoderConfig {
            max_type_depth: 0,
            ..DecoderConfig::default()
        };
        assert!(matches!(SpecDecoder::new(config), Err(SpecError::Config(_))));
    }

    #[test]
    fn test_decode_interface_includes_udts() {
        let mut buffer = SpecEntry::Struct(StructSpec {
            doc: Vec::new(),
            lib: Vec::new(),
            name: b"Point".to_vec(),
            fields: Vec::new(),
        })
        .to_xdr();
        buffer.extend(increment());

        let outcome = SpecDecoder::default().decode_interface(&buffer).unwrap();
        assert_eq!(outcome.records_decoded, 2);
        assert_eq!(outcome.interface.structs[0].name, "Point");
        assert_eq!(outcome.interface.functions[0].outputs, vec!["u32".to_string()]);
    }
}
