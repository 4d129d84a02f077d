//! Object identities
//!
//! The cache never looks inside gateway objects. It only needs to know what
//! kind of object it is, its numeric id and, for images, who owns it.

use std::fmt;

use serde::{Deserialize, Serialize};

// == Object Kind ==
/// Declared kind of a gateway object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Image,
    Dataset,
    /// Any other object class, carried by its class name
    Other(String),
}

impl ObjectKind {
    /// Class tag used in JSON cache keys, e.g. `Image` or `Project`.
    pub fn tag(&self) -> &str {
        match self {
            ObjectKind::Image => "Image",
            ObjectKind::Dataset => "Dataset",
            ObjectKind::Other(tag) => tag,
        }
    }

    /// Maps a class name from the server onto a kind.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "Image" => ObjectKind::Image,
            "Dataset" => ObjectKind::Dataset,
            other => ObjectKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// == Object Identity ==
/// Identity of a cached object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectIdentity {
    pub kind: ObjectKind,
    pub id: u64,
    /// Owning user, only meaningful for images
    #[serde(default)]
    pub owner_id: Option<u64>,
}

impl ObjectIdentity {
    /// Creates an image identity.
    pub fn image(id: u64, owner_id: Option<u64>) -> Self {
        Self {
            kind: ObjectKind::Image,
            id,
            owner_id,
        }
    }

    /// Creates a dataset identity.
    pub fn dataset(id: u64) -> Self {
        Self {
            kind: ObjectKind::Dataset,
            id,
            owner_id: None,
        }
    }

    /// Creates an identity for any other object class.
    pub fn other(tag: impl Into<String>, id: u64) -> Self {
        Self {
            kind: ObjectKind::Other(tag.into()),
            id,
            owner_id: None,
        }
    }

    pub fn is_image(&self) -> bool {
        self.kind == ObjectKind::Image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        assert_eq!(ObjectKind::Image.tag(), "Image");
        assert_eq!(ObjectKind::Dataset.tag(), "Dataset");
        assert_eq!(ObjectKind::Other("Project".to_string()).tag(), "Project");
    }

    #[test]
    fn test_kind_from_tag() {
        assert_eq!(ObjectKind::from_tag("Image"), ObjectKind::Image);
        assert_eq!(ObjectKind::from_tag("Dataset"), ObjectKind::Dataset);
        assert_eq!(
            ObjectKind::from_tag("Plate"),
            ObjectKind::Other("Plate".to_string())
        );
    }

    #[test]
    fn test_constructors() {
        let img = ObjectIdentity::image(7, Some(3));
        assert!(img.is_image());
        assert_eq!(img.owner_id, Some(3));

        let ds = ObjectIdentity::dataset(9);
        assert!(!ds.is_image());
        assert_eq!(ds.kind.to_string(), "Dataset");
    }
}
