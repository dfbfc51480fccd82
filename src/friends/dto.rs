use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendFriendRequest {
    #[serde(default)]
    pub to_user_id: Option<Uuid>,
}

/// Which of the caller's pending requests to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestDirection {
    #[default]
    All,
    Sent,
    Received,
}

impl RequestDirection {
    pub fn includes_sent(self) -> bool {
        matches!(self, RequestDirection::All | RequestDirection::Sent)
    }

    pub fn includes_received(self) -> bool {
        matches!(self, RequestDirection::All | RequestDirection::Received)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FriendRequestQuery {
    #[serde(default, rename = "type")]
    pub direction: RequestDirection,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    pub id: Uuid,
    pub from_user_id: Uuid,
    pub from_user_name: String,
    pub from_user_email: String,
    pub to_user_id: Uuid,
    pub to_user_name: String,
    pub to_user_email: String,
    pub status: String,
    /// `sent` or `received`, relative to the caller.
    #[serde(rename = "type")]
    pub direction: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct FriendRequestEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub request: FriendRequest,
}

#[derive(Debug, Serialize)]
pub struct FriendRequestList {
    pub requests: Vec<FriendRequest>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub residence: Option<String>,
    /// When the friendship started.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct FriendList {
    pub friends: Vec<Friend>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct RemovedFriend {
    pub message: &'static str,
    pub id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserSearchQuery {
    pub q: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCard {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub residence: Option<String>,
}

/// `count` is every match; `users` is cut to the requested limit.
#[derive(Debug, Serialize)]
pub struct UserSearchResult {
    pub users: Vec<UserCard>,
    pub count: usize,
}
