//! Server Event Listener
//!
//! Reads newline-delimited JSON [`ServerEvent`]s and applies them to the cache.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::models::ServerEvent;
use crate::PartitionedCache;

/// Spawns a task feeding every event read from `reader` to
/// [`PartitionedCache::handle_event`] for `partition`.
///
/// Blank lines are ignored and malformed lines are logged and skipped. The
/// task ends at end of input or on a read error, returning the number of
/// events applied.
pub fn spawn_event_listener<R>(
    cache: PartitionedCache,
    partition: String,
    reader: R,
) -> JoinHandle<u64>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        info!("Listening for server events on partition {}", partition);
        let mut lines = reader.lines();
        let mut applied = 0u64;

        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    warn!("Event stream read failed: {}", e);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<ServerEvent>(&line) {
                Ok(event) => {
                    cache.handle_event(&partition, &event).await;
                    applied += 1;
                }
                Err(e) => warn!("Skipping malformed event '{}': {}", line, e),
            }
        }

        info!("Event stream closed after {} events", applied);
        applied
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CategoryTimeouts;
    use crate::models::ObjectIdentity;
    use crate::store::MemoryStore;
    use std::sync::Arc;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn test_listener_applies_events() {
        let cache =
            PartitionedCache::new(Arc::new(MemoryStore::new(100)), CategoryTimeouts::default());
        let img = ObjectIdentity::image(12, Some(3));
        let ds = ObjectIdentity::dataset(4);
        cache.set_thumbnail("srv", 3, 12, &[], b"t").await;
        cache.set_collection_contents("srv", &ds, "[]").await;

        let input = concat!(
            r#"{"entity_type":"Image","entity_id":12,"action":"UPDATE","owner_id":3}"#,
            "\n",
            "\n",
            "not json\n",
            r#"{"entity_type":"Dataset","entity_id":4,"action":"INSERT","owner_id":3}"#,
            "\n",
        );
        let handle = spawn_event_listener(
            cache.clone(),
            "srv".to_string(),
            BufReader::new(input.as_bytes()),
        );

        assert_eq!(handle.await.unwrap(), 2);
        assert_eq!(cache.get_thumbnail("srv", 3, img.id, &[]).await, None);
        // inserts leave cached data alone
        assert_eq!(
            cache.get_collection_contents("srv", &ds).await.as_deref(),
            Some("[]")
        );
    }
}
