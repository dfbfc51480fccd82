use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::{Friend, UserCard};
use crate::text::display_name;

/// Row of `friend_requests` with both users' names resolved.
#[derive(Debug, Clone, FromRow)]
pub struct FriendRequestRow {
    pub id: Uuid,
    pub from_user_id: Uuid,
    pub from_email: String,
    pub from_first_name: Option<String>,
    pub from_last_name: Option<String>,
    pub to_user_id: Uuid,
    pub to_email: String,
    pub to_first_name: Option<String>,
    pub to_last_name: Option<String>,
    pub status: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl FriendRequestRow {
    pub fn is_pending(&self) -> bool {
        self.status == "pending"
    }
}

/// The other side of one of the caller's friendships.
#[derive(Debug, Clone, FromRow)]
pub struct FriendRow {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub residence: Option<String>,
    pub created_at: OffsetDateTime,
}

impl From<FriendRow> for Friend {
    fn from(r: FriendRow) -> Self {
        Self {
            name: display_name(r.first_name.as_deref(), r.last_name.as_deref(), &r.email),
            id: r.id,
            email: r.email,
            first_name: r.first_name,
            last_name: r.last_name,
            residence: r.residence,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct UserCardRow {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub residence: Option<String>,
}

impl From<UserCardRow> for UserCard {
    fn from(r: UserCardRow) -> Self {
        Self {
            name: display_name(r.first_name.as_deref(), r.last_name.as_deref(), &r.email),
            id: r.id,
            email: r.email,
            first_name: r.first_name,
            last_name: r.last_name,
            residence: r.residence,
        }
    }
}

/// Key of the `friendships` table: each pair is stored once, smaller id first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FriendPair {
    pub low: Uuid,
    pub high: Uuid,
}
