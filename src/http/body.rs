//! Request body collection with a size cap and a deadline

use std::time::Duration;

use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BodyError {
    #[error("request body exceeds {0} bytes")]
    TooLarge(usize),
    #[error("timed out reading request body after {0} ms")]
    Timeout(u64),
    #[error("failed to read request body: {0}")]
    Read(String),
}

/// Read the whole body, failing once more than `max_size` bytes arrive or
/// `timeout_ms` elapses.
pub async fn read_body<B>(body: B, max_size: usize, timeout_ms: u64) -> Result<Bytes, BodyError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let collect = Limited::new(body, max_size).collect();
    let collected = tokio::time::timeout(Duration::from_millis(timeout_ms), collect)
        .await
        .map_err(|_| BodyError::Timeout(timeout_ms))?
        .map_err(|e| {
            if e.downcast_ref::<LengthLimitError>().is_some() {
                BodyError::TooLarge(max_size)
            } else {
                BodyError::Read(e.to_string())
            }
        })?;
    Ok(collected.to_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;
    use hyper::body::Frame;
    use std::convert::Infallible;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    /// Body that never yields a frame
    struct StalledBody;

    impl Body for StalledBody {
        type Data = Bytes;
        type Error = Infallible;

        fn poll_frame(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Option<Result<Frame<Bytes>, Infallible>>> {
            Poll::Pending
        }
    }

    #[tokio::test]
    async fn test_reads_within_limit() {
        let body = Full::new(Bytes::from_static(b"{\"id\":\"a\"}"));
        let bytes = read_body(body, 64, 1_000).await.unwrap();
        assert_eq!(&bytes[..], b"{\"id\":\"a\"}");
    }

    #[tokio::test]
    async fn test_rejects_oversized_body() {
        let body = Full::new(Bytes::from(vec![b'x'; 65]));
        let err = read_body(body, 64, 1_000).await.unwrap_err();
        assert!(matches!(err, BodyError::TooLarge(64)));
    }

    #[tokio::test]
    async fn test_stalled_body_times_out() {
        let err = read_body(StalledBody, 64, 50).await.unwrap_err();
        assert!(matches!(err, BodyError::Timeout(50)));
    }
}
