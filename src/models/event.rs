//! Server event records
//!
//! Change notifications published by the image server's event log. One JSON
//! object per event, e.g.
//! `{"entity_type":"Image","entity_id":12,"action":"UPDATE","owner_id":3,"group_id":1,"event_id":88}`.

use serde::Deserialize;

use crate::models::{ObjectIdentity, ObjectKind};

// == Event Action ==
/// What happened to the entity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventAction {
    Insert,
    Update,
    Delete,
    #[serde(other)]
    Other,
}

impl EventAction {
    /// True for actions that make cached data stale.
    pub fn invalidates(&self) -> bool {
        matches!(self, EventAction::Update | EventAction::Delete)
    }
}

// == Server Event ==
#[derive(Debug, Clone, Deserialize)]
pub struct ServerEvent {
    pub entity_type: String,
    pub entity_id: u64,
    pub action: EventAction,
    pub owner_id: u64,
    #[serde(default)]
    pub group_id: u64,
    #[serde(default)]
    pub event_id: u64,
}

impl ServerEvent {
    /// Identity of the object the event refers to.
    pub fn identity(&self) -> ObjectIdentity {
        let kind = ObjectKind::from_tag(&self.entity_type);
        let owner_id = (kind == ObjectKind::Image).then_some(self.owner_id);
        ObjectIdentity {
            kind,
            id: self.entity_id,
            owner_id,
        }
    }
}
