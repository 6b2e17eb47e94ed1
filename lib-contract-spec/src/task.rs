//! Deadline-bounded decoding
//!
//! Decoding is synchronous CPU work with no cancellation points. Async
//! callers that need a bound run it on a blocking worker and stop waiting
//! once the deadline passes; the worker itself runs to completion.

use std::sync::Arc;
use std::time::Duration;

use crate::decoder::{DecodeOutcome, SpecDecoder};
use crate::errors::{SpecError, SpecResult};

/// Decode `buffer` on a blocking worker, giving up after `deadline`
pub async fn decode_with_deadline(
    decoder: Arc<SpecDecoder>,
    buffer: Vec<u8>,
    deadline: Duration,
) -> SpecResult<DecodeOutcome> {
    let len = buffer.len();
    let handle = tokio::task::spawn_blocking(move || decoder.decode(&buffer));

    match tokio::time::timeout(deadline, handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(SpecError::Task(join_error.to_string())),
        Err(_) => {
            tracing::warn!(
                "Contract spec decode of {} bytes exceeded deadline of {:?}",
                len,
                deadline
            );
            Err(SpecError::DeadlineExceeded(deadline))
        }
    }
}
