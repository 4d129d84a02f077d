//! Collaborator models
//!
//! Identities, rendering parameters and server events handed to the cache by
//! the surrounding gateway.

pub mod event;
pub mod identity;
pub mod render;

pub use event::{EventAction, ServerEvent};
pub use identity::{ObjectIdentity, ObjectKind};
pub use render::{Projection, RenderParams};
