//! Background Tasks Module
//!
//! - Bucket sweep: drops expired buckets from the in-memory store
//! - Event listener: invalidates cached objects from server change events

mod cleanup;
mod events;

pub use cleanup::spawn_cleanup_task;
pub use events::spawn_event_listener;
