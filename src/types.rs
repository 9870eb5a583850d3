//! Response shapes of the Melonly API.
//!
//! Field names are camelCase on the wire. Missing fields fall back to their
//! defaults so that additions on the server side never break decoding.
//! Timestamps are Unix seconds.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// A page of results from a list endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    /// Current page number (1-based).
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub total_pages: u32,
}

/// Body of a non-success answer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Application {
    pub id: String,
    pub server_id: String,
    pub title: String,
    pub description: String,
    pub color: String,
    pub banner_key: String,
    pub accepting_responses: bool,
    pub closed_message: String,
    pub submission_message: String,
    pub acceptance_remove_roles: Vec<String>,
    pub approval_roles: Vec<String>,
    pub blocked_discord_roles: Vec<String>,
    pub denial_remove_roles: Vec<String>,
    pub denial_roles: Vec<String>,
    pub required_discord_roles: Vec<String>,
    pub review_only_roles: Vec<String>,
    pub reviewer_roles: Vec<String>,
    pub submit_mention_roles: Vec<String>,
    pub ban_appeal: i64,
    pub ban_appeal_note: bool,
    pub collect_roblox_account: bool,
    /// Seconds between two applications of the same user.
    pub cooldown: i64,
    pub events_channel_id: String,
    pub results_channel_id: String,
    /// Required guild membership age, in days.
    pub guild_member_age: i64,
    pub invite_on_approval: bool,
    pub max_logs: i64,
    pub presets: Vec<JsonValue>,
    pub questions: Map<String, JsonValue>,
    pub sections: Vec<JsonValue>,
    pub require_approved_reason: bool,
    pub require_discord_member: bool,
    pub required_denial_reason: bool,
    pub results_mention_user: bool,
    pub reveal_reviewer: bool,
    pub roblox_group_id: String,
    pub stage_responses: bool,
    pub created_at: i64,
    pub last_updated: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationResponse {
    pub id: String,
    pub application_id: String,
    pub user_id: String,
    pub roblox_id: String,
    pub answers: Map<String, JsonValue>,
    pub comments: Map<String, JsonValue>,
    pub flagged: Map<String, JsonValue>,
    pub reason: String,
    pub status: i64,
    pub staging_status: i64,
    pub reviewed_at: i64,
    pub reviewed_by: String,
    pub finalized_at: i64,
    pub finalized_by: String,
    pub created_at: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuditLogEvent {
    pub id: String,
    pub server_id: String,
    pub application_id: String,
    pub user_id: String,
    pub description: Map<String, JsonValue>,
    #[serde(rename = "type")]
    pub kind: i64,
    pub timestamp: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JoinRequest {
    pub server_id: String,
    pub user_id: String,
    pub join_code: String,
    pub created_at: i64,
}

/// Leave of absence.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Loa {
    pub id: String,
    pub server_id: String,
    pub member_id: String,
    pub reason: String,
    pub reason_history: Vec<JsonValue>,
    pub deny_reason: String,
    pub extension_requests: Vec<JsonValue>,
    pub status: i64,
    pub start_type: i64,
    pub start_at: i64,
    pub started_at: i64,
    pub end_at: i64,
    pub ended_at: i64,
    pub ended_by: String,
    pub expired_at: i64,
    pub cancelled_at: i64,
    pub reviewed_at: i64,
    pub reviewed_by: String,
    pub created_at: i64,
}

/// Moderation log entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Log {
    pub id: String,
    pub server_id: String,
    #[serde(rename = "type")]
    pub kind: i64,
    pub type_id: String,
    pub username: String,
    pub roblox_id: String,
    pub text: String,
    pub description: String,
    pub proof: Vec<JsonValue>,
    pub created_at: i64,
    pub created_by: String,
    pub completed_by: String,
    pub edited_by: Vec<JsonValue>,
    pub expired: bool,
    pub expired_at: i64,
    pub expired_by: String,
    pub hidden: bool,
    pub hidden_by: String,
    pub temp_ban: bool,
    pub unban_at: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Member {
    pub id: String,
    pub server_id: String,
    pub roles: Vec<String>,
    pub created_at: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Role {
    pub id: String,
    pub server_id: String,
    pub name: String,
    /// Hex color.
    pub colour: String,
    pub permissions: String,
    pub extra_permissions: i64,
    pub linked_discord_role_id: String,
    pub created_at: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Server {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub discord_guild_id: String,
    pub join_code: String,
    pub roles: Vec<JsonValue>,
    pub created_at: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Shift {
    pub id: String,
    pub server_id: String,
    pub member_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub wave: i64,
    pub auto_end: bool,
    pub break_timestamps: Vec<JsonValue>,
    pub created_at: i64,
    pub ended_at: i64,
    pub ended_by: String,
}
