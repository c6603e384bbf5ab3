//! Request context carrying the acting staff member.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context for the current authenticated request.
///
/// Produced by the console's auth middleware and passed into service
/// methods so that every operation knows *who* is acting. The service layer
/// never performs authentication itself; it only consumes the resolved
/// identity and capability flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated staff member's ID.
    pub actor_id: Uuid,
    /// Whether the actor may mutate media assets.
    pub can_manage_media: bool,
    /// IP address of the request origin.
    pub ip_address: Option<String>,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(
        actor_id: Uuid,
        can_manage_media: bool,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            actor_id,
            can_manage_media,
            ip_address,
            user_agent,
            request_time: Utc::now(),
        }
    }
}
