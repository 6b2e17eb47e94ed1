//! Entry boundary scanning
//!
//! The spec section has no outer length prefix or index, so entry
//! boundaries are recovered by asking the entry decoder itself.
//! [`BruteForceScanner`] probes candidate lengths `1, 2, 3, ...` and keeps
//! the smallest one that decodes exactly; this is quadratic in the worst
//! case, which is fine for sections of a few tens of KB.
//! [`StreamingScanner`] reads each entry straight from a cursor and yields
//! the same records in linear time.
//!
//! Neither scanner fails: when no boundary can be found the scan stops and
//! the undecodable tail is reported as a [`Truncation`].

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::entry::{EntryKind, SpecEntry};
use crate::observer::{DecodeObserver, ScanEvent};
use crate::xdr::{Limits, ReadXdr, XdrReader};

/// An entry together with the byte range it was decoded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRecord {
    pub offset: usize,
    pub length: usize,
    pub entry: SpecEntry,
}

impl DecodedRecord {
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.length
    }

    pub fn kind(&self) -> EntryKind {
        self.entry.kind()
    }
}

/// Undecodable tail left behind by a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Truncation {
    /// Offset where no entry boundary could be found
    pub offset: usize,
    /// Bytes from `offset` to the end of the buffer that were dropped
    pub discarded: usize,
}

/// Records recovered from one buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub records: Vec<DecodedRecord>,
    pub truncation: Option<Truncation>,
}

impl ScanOutcome {
    pub fn is_truncated(&self) -> bool {
        self.truncation.is_some()
    }

    /// Bytes covered by decoded records
    pub fn consumed(&self) -> usize {
        self.records.last().map(|r| r.range().end).unwrap_or(0)
    }
}

/// Strategy for partitioning a spec buffer into entries
pub trait BoundaryScanner: Send + Sync {
    fn scan(&self, buffer: &[u8], observer: &dyn DecodeObserver) -> ScanOutcome;
}

/// Shared cursor loop; `find` returns the length and entry at the start of a slice
fn scan_with(
    buffer: &[u8],
    observer: &dyn DecodeObserver,
    find: impl Fn(&[u8]) -> Option<(usize, SpecEntry)>,
) -> ScanOutcome {
    if buffer.is_empty() {
        observer.on_event(&ScanEvent::EmptyInput);
        return ScanOutcome::default();
    }

    let mut records = Vec::new();
    let mut offset = 0;

    while offset < buffer.len() {
        match find(&buffer[offset..]) {
            Some((length, entry)) => {
                observer.on_event(&ScanEvent::RecordDecoded {
                    offset,
                    length,
                    kind: entry.kind(),
                });
                records.push(DecodedRecord {
                    offset,
                    length,
                    entry,
                });
                offset += length;
            }
            None => {
                let remaining = buffer.len() - offset;
                observer.on_event(&ScanEvent::BoundaryNotFound { offset, remaining });
                return ScanOutcome {
                    records,
                    truncation: Some(Truncation {
                        offset,
                        discarded: remaining,
                    }),
                };
            }
        }
    }

    ScanOutcome {
        records,
        truncation: None,
    }
}

/// Probes every candidate length and accepts the smallest that decodes
#[derive(Debug, Clone, Default)]
pub struct BruteForceScanner {
    limits: Limits,
    max_candidate_len: Option<usize>,
}

impl BruteForceScanner {
    pub fn new(limits: Limits) -> Self {
        Self {
            limits,
            max_candidate_len: None,
        }
    }

    /// Stop probing past `max` bytes per entry
    pub fn with_max_candidate_len(mut self, max: usize) -> Self {
        self.max_candidate_len = Some(max);
        self
    }

    fn find_boundary(&self, rest: &[u8]) -> Option<(usize, SpecEntry)> {
        let upper = match self.max_candidate_len {
            Some(max) => max.min(rest.len()),
            None => rest.len(),
        };
        (1..=upper).find_map(|length| {
            SpecEntry::from_xdr(&rest[..length], self.limits)
                .ok()
                .map(|entry| (length, entry))
        })
    }
}

impl BoundaryScanner for BruteForceScanner {
    fn scan(&self, buffer: &[u8], observer: &dyn DecodeObserver) -> ScanOutcome {
        scan_with(buffer, observer, |rest| self.find_boundary(rest))
    }
}

/// Decodes each entry directly from a cursor
#[derive(Debug, Clone, Default)]
pub struct StreamingScanner {
    limits: Limits,
}

impl StreamingScanner {
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }

    fn read_next(&self, rest: &[u8]) -> Option<(usize, SpecEntry)> {
        let mut reader = XdrReader::new(rest, self.limits);
        let entry = SpecEntry::read_xdr(&mut reader).ok()?;
        Some((reader.position(), entry))
    }
}

impl BoundaryScanner for StreamingScanner {
    fn scan(&self, buffer: &[u8], observer: &dyn DecodeObserver) -> ScanOutcome {
        scan_with(buffer, observer, |rest| self.read_next(rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EnumCaseSpec, EnumSpec, FunctionSpec};
    use crate::observer::{NoopObserver, RecordingObserver};
    use crate::types::TypeDef;
    use crate::xdr::WriteXdr;

    fn function(name: &str) -> SpecEntry {
        SpecEntry::Function(FunctionSpec::new(name).with_output(TypeDef::U32))
    }

    fn concat(entries: &[SpecEntry]) -> Vec<u8> {
        entries.iter().flat_map(|e| e.to_xdr()).collect()
    }

    #[test]
    fn test_empty_buffer() {
        let observer = RecordingObserver::new();
        let outcome = BruteForceScanner::default().scan(&[], &observer);
        assert!(outcome.records.is_empty());
        assert!(!outcome.is_truncated());
        assert_eq!(observer.events(), vec![ScanEvent::EmptyInput]);
    }

    #[test]
    fn test_records_tile_buffer() {
        let entries = vec![
            function("init"),
            SpecEntry::Enum(EnumSpec {
                doc: Vec::new(),
                lib: Vec::new(),
                name: b"Color".to_vec(),
                cases: vec![EnumCaseSpec {
                    doc: Vec::new(),
                    name: b"Red".to_vec(),
                    value: 0,
                }],
            }),
            function("increment"),
        ];
        let buffer = concat(&entries);
        let outcome = BruteForceScanner::default().scan(&buffer, &NoopObserver);

        assert!(!outcome.is_truncated());
        assert_eq!(outcome.records.len(), 3);
        let mut expected_offset = 0;
        for (record, entry) in outcome.records.iter().zip(&entries) {
            assert_eq!(record.offset, expected_offset);
            assert_eq!(record.length, entry.to_xdr().len());
            assert_eq!(&record.entry, entry);
            expected_offset = record.range().end;
        }
        assert_eq!(outcome.consumed(), buffer.len());
    }

    #[test]
    fn test_garbage_tail_is_truncated() {
        let mut buffer = concat(&[function("a"), function("b")]);
        let valid_len = buffer.len();
        buffer.extend_from_slice(&[0xde, 0xad, 0xbe]);

        let observer = RecordingObserver::new();
        let outcome = BruteForceScanner::default().scan(&buffer, &observer);

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(
            outcome.truncation,
            Some(Truncation {
                offset: valid_len,
                discarded: 3
            })
        );
        assert_eq!(
            observer.events().last(),
            Some(&ScanEvent::BoundaryNotFound {
                offset: valid_len,
                remaining: 3
            })
        );
    }

    #[test]
    fn test_undecodable_head_yields_nothing() {
        let mut buffer = vec![0, 0, 0, 77];
        buffer.extend(concat(&[function("hidden")]));
        let outcome = BruteForceScanner::default().scan(&buffer, &NoopObserver);
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.truncation.map(|t| t.offset), Some(0));
    }

    #[test]
    fn test_candidate_cap_truncates_long_entries() {
        let buffer = concat(&[function("a_rather_long_function_name")]);
        let scanner = BruteForceScanner::default().with_max_candidate_len(16);
        let outcome = scanner.scan(&buffer, &NoopObserver);
        assert!(outcome.records.is_empty());
        assert!(outcome.is_truncated());
    }

    #[test]
    fn test_streaming_matches_brute_force() {
        let mut buffer = concat(&[function("x"), function("transfer")]);
        buffer.extend_from_slice(&[0, 0, 0, 0, 0, 0]);

        let brute = BruteForceScanner::default().scan(&buffer, &NoopObserver);
        let streaming = StreamingScanner::default().scan(&buffer, &NoopObserver);
        assert_eq!(brute, streaming);
    }
}
