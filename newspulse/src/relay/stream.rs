use bytes::Bytes;
use rocket::futures::stream::{self, Stream, StreamExt};
use std::fmt::Display;
use std::pin::Pin;
use tracing::{debug, warn};

/// Byte stream handed to the HTTP layer.
pub type RelayStream = Pin<Box<dyn Stream<Item = Bytes> + Send>>;

/// Pass upstream chunks through unchanged.
///
/// Upstream end closes the relayed stream. An upstream error is logged and also
/// closes it, since the response status is already on the wire. Dropping the
/// returned stream drops `upstream`, which aborts the upstream request.
pub fn forward_verbatim<S, E>(upstream: S) -> RelayStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = (Box::pin(upstream), 0usize);
    Box::pin(stream::unfold(state, |(mut upstream, forwarded)| async move {
        match upstream.next().await {
            Some(Ok(chunk)) => {
                let forwarded = forwarded + chunk.len();
                Some((chunk, (upstream, forwarded)))
            }
            Some(Err(e)) => {
                warn!(error = %e, forwarded, "chat relay: upstream stream failed, closing");
                None
            }
            None => {
                debug!(forwarded, "chat relay: upstream stream finished");
                None
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::task::{Context, Poll};

    #[tokio::test]
    async fn chunks_pass_through_unchanged() {
        let chunks = vec![
            Ok::<_, String>(Bytes::from_static(b"data: {\"a\":1}\n")),
            Ok(Bytes::from_static(b"\ndata: [DO")),
            Ok(Bytes::from_static(b"NE]\n\n")),
        ];
        let relayed: Vec<Bytes> = forward_verbatim(stream::iter(chunks)).collect().await;
        assert_eq!(relayed.concat(), b"data: {\"a\":1}\n\ndata: [DONE]\n\n".to_vec());
        assert_eq!(relayed.len(), 3);
    }

    #[tokio::test]
    async fn upstream_error_closes_stream() {
        let chunks = vec![
            Ok(Bytes::from_static(b"first")),
            Err("connection reset".to_string()),
            Ok(Bytes::from_static(b"never")),
        ];
        let relayed: Vec<Bytes> = forward_verbatim(stream::iter(chunks)).collect().await;
        assert_eq!(relayed, vec![Bytes::from_static(b"first")]);
    }

    struct DropFlag<S> {
        inner: S,
        dropped: Arc<AtomicBool>,
    }

    impl<S: Stream + Unpin> Stream for DropFlag<S> {
        type Item = S::Item;

        fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
            Pin::new(&mut self.inner).poll_next(cx)
        }
    }

    impl<S> Drop for DropFlag<S> {
        fn drop(&mut self) {
            self.dropped.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn dropping_relay_releases_upstream() {
        let dropped = Arc::new(AtomicBool::new(false));
        let upstream = DropFlag {
            inner: stream::iter(vec![
                Ok::<_, String>(Bytes::from_static(b"one")),
                Ok(Bytes::from_static(b"two")),
            ]),
            dropped: dropped.clone(),
        };

        let mut relayed = forward_verbatim(upstream);
        assert_eq!(relayed.next().await, Some(Bytes::from_static(b"one")));
        assert!(!dropped.load(Ordering::SeqCst));

        drop(relayed);
        assert!(dropped.load(Ordering::SeqCst));
    }
}
