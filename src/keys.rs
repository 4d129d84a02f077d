//! Cache key derivation
//!
//! Pure functions turning (partition, object, request parameters) into a
//! `(bucket, key)` pair. Identical coordinates always give the identical pair,
//! so concurrent callers need no coordination.

use serde::Deserialize;

use crate::models::{ObjectIdentity, RenderParams};

/// Characters with a meaning inside channel selectors that must not leak
/// into keys.
const CHANNEL_SEPARATORS: [char; 4] = ['#', '$', ',', '|'];

/// Number of trailing id digits grouped under one prefix.
const PREFIX_DIGITS: usize = 4;

// == Category ==
/// Cache category, each with its own bucket namespace and timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Thumbnail,
    Image,
    Json,
}

// == Cache Key ==
/// A derived `(bucket, entry key)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub bucket: String,
    pub key: String,
}

impl CacheKey {
    fn new(bucket: String, key: String) -> Self {
        Self { bucket, key }
    }
}

/// Decimal id with its last four digits removed, or `"0"` when nothing is left.
///
/// Groups ids into runs of at most 10 000.
pub fn id_prefix(id: u64) -> String {
    let digits = id.to_string();
    if digits.len() > PREFIX_DIGITS {
        digits[..digits.len() - PREFIX_DIGITS].to_string()
    } else {
        "0".to_string()
    }
}

pub fn thumbnail_bucket(partition: &str) -> String {
    format!("thumb_user_{}", partition)
}

pub fn image_bucket(partition: &str) -> String {
    format!("img_{}", partition)
}

pub fn json_bucket(partition: &str) -> String {
    format!("json_{}", partition)
}

/// Key for a thumbnail of `image_id` as seen by `owner_id`.
///
/// An empty `size` addresses the default-size slot, which is distinct from
/// every explicit size.
pub fn thumbnail_key(partition: &str, owner_id: u64, image_id: u64, size: &[u32]) -> CacheKey {
    let pre = id_prefix(image_id);
    let key = if size.is_empty() {
        format!("{}/{}/{}", pre, image_id, owner_id)
    } else {
        let dims: Vec<String> = size.iter().map(|d| d.to_string()).collect();
        format!("{}/{}/{}/{}", pre, image_id, owner_id, dims.join("x"))
    };
    CacheKey::new(thumbnail_bucket(partition), key)
}

/// Key for a rendered plane of `image`.
///
/// Without `params` this is the bare `{prefix}/{id}` default entry. `context`
/// is appended verbatim in both cases.
pub fn image_key(
    partition: &str,
    params: Option<&RenderParams>,
    image: &ObjectIdentity,
    z: u32,
    t: u32,
    context: &str,
) -> CacheKey {
    let pre = id_prefix(image.id);
    let key = match params {
        Some(params) => {
            let variant = match params.projection() {
                Some(projection) => format!("{}-{}", projection.as_str(), t),
                None => format!("{}x{}", z, t),
            };
            format!(
                "{}/{}/{}-c{}-m{}-q{}-r{}-t{}{}",
                pre,
                image.id,
                variant,
                sanitize_channels(params.channels.as_deref().unwrap_or("")),
                params.mode.as_deref().unwrap_or(""),
                params.quality.as_deref().unwrap_or(""),
                params.region.as_deref().unwrap_or(""),
                params.tile.as_deref().unwrap_or(""),
                context
            )
        }
        None => format!("{}/{}{}", pre, image.id, context),
    };
    CacheKey::new(image_bucket(partition), key)
}

/// Key for JSON data about `object`, or the partition singleton slot.
pub fn json_key(partition: &str, object: Option<&ObjectIdentity>, context: &str) -> CacheKey {
    let key = match object {
        Some(obj) => format!("{}_{}/{}", obj.kind.tag(), obj.id, context),
        None => format!("single/{}/{}", partition, context),
    };
    CacheKey::new(json_bucket(partition), key)
}

fn sanitize_channels(channels: &str) -> String {
    channels.replace(&CHANNEL_SEPARATORS[..], "-")
}
