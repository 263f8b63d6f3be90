//! Capped body reader

use std::time::Duration;

use bytes::{Bytes, BytesMut};
use futures::StreamExt;

use crate::error::FetchError;
use crate::transport::BodyStream;

/// Upper bound on the up-front allocation when no length was declared
const UNDECLARED_INITIAL_CAPACITY: usize = 64 * 1024;

/// Body prefix read from a response
#[derive(Debug)]
pub(crate) struct BoundedBody {
    pub(crate) bytes: Bytes,
    pub(crate) truncated: bool,
}

/// Read at most `max` bytes, or the declared length if smaller
///
/// Every wait for the next chunk is bounded by `read_timeout`. The stream
/// is dropped before this returns, whichever way it returns.
pub(crate) async fn read_bounded(
    mut body: BodyStream,
    declared: Option<u64>,
    max: usize,
    read_timeout: Duration,
) -> Result<BoundedBody, FetchError> {
    let capacity = declared
        .and_then(|len| usize::try_from(len).ok())
        .map_or(max, |len| len.min(max));

    let mut buf = if declared.is_some() {
        BytesMut::with_capacity(capacity)
    } else {
        BytesMut::with_capacity(capacity.min(UNDECLARED_INITIAL_CAPACITY))
    };
    let mut overflow = false;

    while buf.len() < capacity {
        let next = tokio::time::timeout(read_timeout, body.next())
            .await
            .map_err(|_| FetchError::Timeout)?;

        let Some(chunk) = next else {
            break;
        };
        let chunk = chunk?;

        let remaining = capacity - buf.len();
        if chunk.len() > remaining {
            buf.extend_from_slice(&chunk[..remaining]);
            overflow = true;
        } else {
            buf.extend_from_slice(&chunk);
        }
    }
    drop(body);

    // A full buffer is a cut-off body unless the server promised exactly that many bytes
    let full = buf.len() == capacity;
    let truncated = overflow
        || (full && declared.map_or(capacity > 0, |len| len > capacity as u64));

    Ok(BoundedBody {
        bytes: buf.freeze(),
        truncated,
    })
}
