//! Partitioned gateway cache
//!
//! Category helpers for thumbnails, rendered images and JSON data on top of a
//! [`BucketStore`]. Every operation is fail-open: backend errors are logged
//! and turned into a miss or a no-op, never returned.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::{CategoryTimeouts, Config};
use crate::keys::{self, CacheKey, Category};
use crate::models::{ObjectIdentity, RenderParams, ServerEvent};
use crate::store::{build_store, BucketStore, NullStore};

/// Context suffix for split-channel renderings.
pub const SPLIT_CHANNEL_CONTEXT: &str = "-sc";

/// Context suffix for source-format (OME-TIFF) exports.
pub const SOURCE_FORMAT_CONTEXT: &str = "-ometiff";

/// JSON context holding a container's contents listing.
pub const CONTENTS_CONTEXT: &str = "contents";

// == Partitioned Cache ==
/// Cache handle shared by the gateway's request handlers.
///
/// Cheap to clone; clones share the same store.
#[derive(Clone)]
pub struct PartitionedCache {
    store: Arc<dyn BucketStore>,
    timeouts: CategoryTimeouts,
}

impl PartitionedCache {
    pub fn new(store: Arc<dyn BucketStore>, timeouts: CategoryTimeouts) -> Self {
        Self { store, timeouts }
    }

    /// Builds the configured store and wraps it.
    pub async fn from_config(config: &Config) -> Self {
        Self::new(build_store(config).await, config.timeouts)
    }

    /// A cache that stores nothing.
    pub fn disabled() -> Self {
        Self::new(Arc::new(NullStore), CategoryTimeouts::default())
    }

    pub fn store(&self) -> &Arc<dyn BucketStore> {
        &self.store
    }

    // == Store primitives ==

    async fn put(&self, category: Category, key: &CacheKey, value: &[u8]) {
        let timeout = self.timeouts.for_category(category);
        if let Err(e) = self
            .store
            .set_entry(&key.bucket, &key.key, value, timeout)
            .await
        {
            warn!("cache set {}:{} skipped: {}", key.bucket, key.key, e);
        }
    }

    async fn fetch(&self, key: &CacheKey) -> Option<Vec<u8>> {
        match self.store.get_entry(&key.bucket, &key.key).await {
            Ok(Some(value)) => {
                debug!("cached: {}", key.key);
                Some(value)
            }
            Ok(None) => {
                debug!("  miss: {}", key.key);
                None
            }
            Err(e) => {
                warn!("cache get {}:{} failed: {}", key.bucket, key.key, e);
                None
            }
        }
    }

    async fn drop_bucket(&self, bucket: &str) {
        match self.store.delete_bucket(bucket).await {
            Ok(removed) => debug!("cleared {} ({} entries)", bucket, removed),
            Err(e) => warn!("cache clear of {} skipped: {}", bucket, e),
        }
    }

    // == Thumbnails ==

    /// Stores a thumbnail. An empty `size` is the default-size slot.
    pub async fn set_thumbnail(
        &self,
        partition: &str,
        owner_id: u64,
        image_id: u64,
        size: &[u32],
        data: &[u8],
    ) {
        let key = keys::thumbnail_key(partition, owner_id, image_id, size);
        self.put(Category::Thumbnail, &key, data).await;
    }

    pub async fn get_thumbnail(
        &self,
        partition: &str,
        owner_id: u64,
        image_id: u64,
        size: &[u32],
    ) -> Option<Vec<u8>> {
        let key = keys::thumbnail_key(partition, owner_id, image_id, size);
        self.fetch(&key).await
    }

    /// Clears thumbnails.
    ///
    /// Invalidation is per bucket: every thumbnail of the partition goes, not
    /// only those of `image_id`.
    pub async fn clear_thumbnail(&self, partition: &str, owner_id: u64, image_id: u64) {
        let key = keys::thumbnail_key(partition, owner_id, image_id, &[]);
        self.drop_bucket(&key.bucket).await;
    }

    // == Rendered images ==

    /// Stores a rendered plane.
    ///
    /// `params` are the request's rendering parameters; `None` addresses the
    /// image's default entry. `context` distinguishes derived renderings.
    #[allow(clippy::too_many_arguments)]
    pub async fn set_rendered_image(
        &self,
        partition: &str,
        params: Option<&RenderParams>,
        image: &ObjectIdentity,
        z: u32,
        t: u32,
        context: &str,
        data: &[u8],
    ) {
        let key = keys::image_key(partition, params, image, z, t, context);
        self.put(Category::Image, &key, data).await;
    }

    pub async fn get_rendered_image(
        &self,
        partition: &str,
        params: Option<&RenderParams>,
        image: &ObjectIdentity,
        z: u32,
        t: u32,
        context: &str,
    ) -> Option<Vec<u8>> {
        let key = keys::image_key(partition, params, image, z, t, context);
        self.fetch(&key).await
    }

    /// Clears every rendering in the partition, then its thumbnails, then
    /// (unless `skip_json`) its JSON data.
    pub async fn clear_rendered_image(
        &self,
        partition: &str,
        owner_id: u64,
        image: &ObjectIdentity,
        skip_json: bool,
    ) {
        self.drop_bucket(&keys::image_bucket(partition)).await;
        self.clear_thumbnail(partition, owner_id, image.id).await;
        if !skip_json {
            self.clear_json(partition, Some(image), "").await;
        }
    }

    pub async fn set_split_channel_image(
        &self,
        partition: &str,
        params: Option<&RenderParams>,
        image: &ObjectIdentity,
        z: u32,
        t: u32,
        data: &[u8],
    ) {
        self.set_rendered_image(partition, params, image, z, t, SPLIT_CHANNEL_CONTEXT, data)
            .await;
    }

    pub async fn get_split_channel_image(
        &self,
        partition: &str,
        params: Option<&RenderParams>,
        image: &ObjectIdentity,
        z: u32,
        t: u32,
    ) -> Option<Vec<u8>> {
        self.get_rendered_image(partition, params, image, z, t, SPLIT_CHANNEL_CONTEXT)
            .await
    }

    /// Stores a source-format export of the whole image (plane 0/0).
    pub async fn set_source_format_image(
        &self,
        partition: &str,
        params: Option<&RenderParams>,
        image: &ObjectIdentity,
        data: &[u8],
    ) {
        self.set_rendered_image(partition, params, image, 0, 0, SOURCE_FORMAT_CONTEXT, data)
            .await;
    }

    pub async fn get_source_format_image(
        &self,
        partition: &str,
        params: Option<&RenderParams>,
        image: &ObjectIdentity,
    ) -> Option<Vec<u8>> {
        self.get_rendered_image(partition, params, image, 0, 0, SOURCE_FORMAT_CONTEXT)
            .await
    }

    // == JSON ==

    /// Stores JSON about `object`, or in the partition singleton slot when
    /// `object` is `None`.
    pub async fn set_json(
        &self,
        partition: &str,
        object: Option<&ObjectIdentity>,
        context: &str,
        data: &str,
    ) {
        let key = keys::json_key(partition, object, context);
        self.put(Category::Json, &key, data.as_bytes()).await;
    }

    pub async fn get_json(
        &self,
        partition: &str,
        object: Option<&ObjectIdentity>,
        context: &str,
    ) -> Option<String> {
        let key = keys::json_key(partition, object, context);
        let raw = self.fetch(&key).await?;
        match String::from_utf8(raw) {
            Ok(json) => Some(json),
            Err(e) => {
                warn!("cached JSON at {}:{} is not UTF-8: {}", key.bucket, key.key, e);
                None
            }
        }
    }

    /// Clears the partition's JSON bucket.
    pub async fn clear_json(&self, partition: &str, object: Option<&ObjectIdentity>, context: &str) {
        let key = keys::json_key(partition, object, context);
        self.drop_bucket(&key.bucket).await;
    }

    pub async fn set_collection_contents(
        &self,
        partition: &str,
        collection: &ObjectIdentity,
        data: &str,
    ) {
        self.set_json(partition, Some(collection), CONTENTS_CONTEXT, data)
            .await;
    }

    pub async fn get_collection_contents(
        &self,
        partition: &str,
        collection: &ObjectIdentity,
    ) -> Option<String> {
        self.get_json(partition, Some(collection), CONTENTS_CONTEXT)
            .await
    }

    pub async fn clear_collection_contents(&self, partition: &str, collection: &ObjectIdentity) {
        self.clear_json(partition, Some(collection), CONTENTS_CONTEXT)
            .await;
    }

    // == Invalidation ==

    /// Drops everything cached about `object`.
    ///
    /// Images cascade through renderings, thumbnails and JSON. Every other
    /// kind only has JSON data.
    pub async fn invalidate_object(&self, partition: &str, owner_id: u64, object: &ObjectIdentity) {
        if object.is_image() {
            self.clear_rendered_image(partition, owner_id, object, false)
                .await;
        } else {
            debug!("unhandled object type: {}", object.kind);
            self.clear_json(partition, Some(object), "").await;
        }
    }

    /// Flushes the whole store, every partition included.
    pub async fn clear(&self) {
        match self.store.flush_all().await {
            Ok(()) => debug!("cache flushed"),
            Err(e) => warn!("cache flush skipped: {}", e),
        }
    }

    // == Server events ==

    /// Applies one server event: updates and deletions invalidate the object.
    pub async fn handle_event(&self, partition: &str, event: &ServerEvent) {
        debug!(
            "## {}#{} {:?} user #{} group #{}({})",
            event.entity_type,
            event.entity_id,
            event.action,
            event.owner_id,
            event.group_id,
            event.event_id
        );
        if event.action.invalidates() {
            self.invalidate_object(partition, event.owner_id, &event.identity())
                .await;
        }
    }

    pub async fn handle_events(&self, partition: &str, events: &[ServerEvent]) {
        for event in events {
            self.handle_event(partition, event).await;
        }
    }
}
