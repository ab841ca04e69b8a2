//! Server event types, envelope, and event bus for real-time notifications.
//!
//! Link mutations and intake fallbacks are published on a single broadcast
//! channel. Downstream consumers (the SSE endpoint, tests) subscribe
//! independently; emitting with no subscribers is a no-op.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::{FallbackReason, LinkStatus};

// ============================================================================
// Event Envelope
// ============================================================================

/// Versioned wrapper around a [`ServerEvent`].
///
/// ## Wire Format (SSE)
///
/// ```text
/// event: link.status_changed
/// id: 019508a0-1234-7def-8000-abcdef123456
/// data: {"event_id":"...","event_type":"link.status_changed","occurred_at":"...","payload":{...}}
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope {
    /// UUIDv7 for temporal ordering.
    pub event_id: Uuid,
    /// Namespaced event type (e.g., `"link.created"`).
    pub event_type: String,
    pub occurred_at: DateTime<Utc>,
    /// Owner the event belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    pub payload_version: u32,
    pub payload: ServerEvent,
}

impl EventEnvelope {
    pub fn new(event: ServerEvent, owner: Option<String>) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            event_type: event.namespaced_event_type().to_string(),
            occurred_at: Utc::now(),
            owner,
            entity_id: event.link_id().map(|id| id.to_string()),
            payload_version: 1,
            payload: event,
        }
    }
}

// ============================================================================
// Server Event (domain payloads)
// ============================================================================

/// Domain events, serialized with a `type` tag:
/// `{"type":"LinkCreated","link_id":"...","status":"inbox"}`
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// A link entered the inbox.
    LinkCreated {
        link_id: Uuid,
        title: String,
        status: LinkStatus,
    },
    /// A link moved between statuses.
    LinkStatusChanged {
        link_id: Uuid,
        from: LinkStatus,
        to: LinkStatus,
    },
    /// A link was soft-deleted.
    LinkDeleted { link_id: Uuid },
    /// A link's tag set changed.
    LinkTagsChanged { link_id: Uuid, tags: Vec<String> },
    /// Intake could not finish on its own and needs manual input.
    IntakeFallbackRequired {
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        reason: FallbackReason,
    },
}

impl ServerEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            ServerEvent::LinkCreated { .. } => "LinkCreated",
            ServerEvent::LinkStatusChanged { .. } => "LinkStatusChanged",
            ServerEvent::LinkDeleted { .. } => "LinkDeleted",
            ServerEvent::LinkTagsChanged { .. } => "LinkTagsChanged",
            ServerEvent::IntakeFallbackRequired { .. } => "IntakeFallbackRequired",
        }
    }

    /// Namespaced event type for the envelope and the SSE `event:` field.
    pub fn namespaced_event_type(&self) -> &'static str {
        match self {
            ServerEvent::LinkCreated { .. } => "link.created",
            ServerEvent::LinkStatusChanged { .. } => "link.status_changed",
            ServerEvent::LinkDeleted { .. } => "link.deleted",
            ServerEvent::LinkTagsChanged { .. } => "link.tags_changed",
            ServerEvent::IntakeFallbackRequired { .. } => "intake.fallback_required",
        }
    }

    pub fn link_id(&self) -> Option<Uuid> {
        match self {
            ServerEvent::LinkCreated { link_id, .. }
            | ServerEvent::LinkStatusChanged { link_id, .. }
            | ServerEvent::LinkDeleted { link_id }
            | ServerEvent::LinkTagsChanged { link_id, .. } => Some(*link_id),
            ServerEvent::IntakeFallbackRequired { .. } => None,
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Broadcast channel for [`ServerEvent`]s, cheap to clone.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a new event bus with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event without owner scope.
    pub fn emit(&self, event: ServerEvent) {
        self.send(EventEnvelope::new(event, None));
    }

    /// Emit an event scoped to an owner.
    pub fn emit_for(&self, owner: &str, event: ServerEvent) {
        self.send(EventEnvelope::new(event, Some(owner.to_string())));
    }

    fn send(&self, envelope: EventEnvelope) {
        tracing::debug!(
            event_type = %envelope.event_type,
            event_id = %envelope.event_id,
            subscriber_count = self.tx.receiver_count(),
            "EventBus emit"
        );
        // No subscribers is not an error.
        let _ = self.tx.send(envelope);
    }

    /// Subscribe to receive enveloped events. Each subscriber gets its own stream.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(crate::defaults::EVENT_BUS_CAPACITY)
    }
}

// ============================================================================
// Tests
// ============================================================================
