//! Per-request session context.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The authenticated identity attached to a browser request by the
/// session store. A request without a session carries no context.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub user_id: Uuid,
}
