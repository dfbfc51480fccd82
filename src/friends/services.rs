use uuid::Uuid;

use super::dto::{Friend, FriendRequest};
use super::repo_types::{FriendPair, FriendRequestRow};
use crate::{
    error::{ApiResult, AppError},
    text::{display_name, non_blank},
};

const DEFAULT_SEARCH_LIMIT: i64 = 20;
const MAX_SEARCH_LIMIT: i64 = 100;

impl FriendPair {
    pub fn of(a: Uuid, b: Uuid) -> FriendPair {
        if a <= b {
            FriendPair { low: a, high: b }
        } else {
            FriendPair { low: b, high: a }
        }
    }
}

impl FriendRequest {
    /// Renders a request from `viewer`'s side.
    pub fn seen_by(r: FriendRequestRow, viewer: Uuid) -> FriendRequest {
        FriendRequest {
            direction: if r.from_user_id == viewer { "sent" } else { "received" },
            from_user_name: display_name(r.from_first_name.as_deref(), r.from_last_name.as_deref(), &r.from_email),
            to_user_name: display_name(r.to_first_name.as_deref(), r.to_last_name.as_deref(), &r.to_email),
            id: r.id,
            from_user_id: r.from_user_id,
            from_user_email: r.from_email,
            to_user_id: r.to_user_id,
            to_user_email: r.to_email,
            status: r.status,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Checks that `from` may ask `to` for friendship given what is on record.
pub fn check_new_request(
    from: Uuid,
    to: Uuid,
    already_friends: bool,
    pending: Option<&FriendRequestRow>,
) -> ApiResult<()> {
    if from == to {
        return Err(AppError::invalid_argument("Cannot send friend request to yourself"));
    }
    if already_friends {
        return Err(AppError::conflict("Users are already friends"));
    }
    match pending {
        Some(r) if r.from_user_id == from => Err(AppError::conflict("Friend request already sent")),
        Some(_) => Err(AppError::conflict("This user has already sent you a friend request")),
        None => Ok(()),
    }
}

/// Missing requests are 404, requests addressed to someone else 403, and
/// requests already answered INVALID_ARGUMENT.
pub fn answerable_request(row: Option<FriendRequestRow>, user_id: Uuid) -> ApiResult<FriendRequestRow> {
    let row = row.ok_or_else(|| AppError::not_found("Friend request not found"))?;
    if row.to_user_id != user_id {
        return Err(AppError::unauthorized(
            "You can only answer friend requests sent to you",
        ));
    }
    if !row.is_pending() {
        return Err(AppError::invalid_argument("Friend request is no longer pending"));
    }
    Ok(row)
}

/// Friends by display name, ignoring case.
pub fn sort_friends(friends: &mut [Friend]) {
    friends.sort_by_cached_key(|f| f.name.to_lowercase());
}

pub fn search_term(q: Option<String>) -> ApiResult<String> {
    non_blank(q)
        .map(|q| q.to_lowercase())
        .ok_or_else(|| AppError::invalid_request("Search query is required"))
}

pub fn clamp_search_limit(limit: Option<i64>) -> usize {
    limit.unwrap_or(DEFAULT_SEARCH_LIMIT).clamp(1, MAX_SEARCH_LIMIT) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use time::OffsetDateTime;

    fn request(from: Uuid, to: Uuid, status: &str) -> FriendRequestRow {
        FriendRequestRow {
            id: Uuid::new_v4(),
            from_user_id: from,
            from_email: "jh@college.harvard.edu".into(),
            from_first_name: Some("John".into()),
            from_last_name: Some("Harvard".into()),
            to_user_id: to,
            to_email: "ab@college.harvard.edu".into(),
            to_first_name: None,
            to_last_name: None,
            status: status.into(),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn friend(name: &str) -> Friend {
        Friend {
            id: Uuid::new_v4(),
            name: name.into(),
            email: format!("{name}@x.edu"),
            first_name: None,
            last_name: None,
            residence: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn pair_is_order_independent() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let pair = FriendPair::of(a, b);
        assert_eq!(pair, FriendPair::of(b, a));
        assert!(pair.low < pair.high);
    }

    #[test]
    fn new_request_rules() {
        let (me, them) = (Uuid::new_v4(), Uuid::new_v4());
        assert!(check_new_request(me, them, false, None).is_ok());

        let err = check_new_request(me, me, false, None).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidArgument);

        let err = check_new_request(me, them, true, None).unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(err.message, "Users are already friends");

        let mine = request(me, them, "pending");
        let err = check_new_request(me, them, false, Some(&mine)).unwrap_err();
        assert_eq!(err.message, "Friend request already sent");

        let theirs = request(them, me, "pending");
        let err = check_new_request(me, them, false, Some(&theirs)).unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(err.message, "This user has already sent you a friend request");
    }

    #[test]
    fn only_the_recipient_answers_a_pending_request() {
        let (me, them) = (Uuid::new_v4(), Uuid::new_v4());

        let err = answerable_request(None, me).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = answerable_request(Some(request(me, them, "pending")), me).unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);

        let err = answerable_request(Some(request(them, me, "accepted")), me).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidArgument);

        assert!(answerable_request(Some(request(them, me, "pending")), me).is_ok());
    }

    #[test]
    fn requests_render_from_the_viewer_side() {
        let (me, them) = (Uuid::new_v4(), Uuid::new_v4());
        let sent = FriendRequest::seen_by(request(me, them, "pending"), me);
        assert_eq!(sent.direction, "sent");
        assert_eq!(sent.from_user_name, "John Harvard");
        assert_eq!(sent.to_user_name, "ab@college.harvard.edu");

        let received = FriendRequest::seen_by(request(them, me, "pending"), me);
        assert_eq!(received.direction, "received");

        let json = serde_json::to_value(&received).unwrap();
        assert_eq!(json["type"], "received");
        assert_eq!(json["fromUserEmail"], "jh@college.harvard.edu");
    }

    #[test]
    fn friends_sort_by_name_ignoring_case() {
        let mut friends = vec![friend("zoe"), friend("Adam"), friend("bea")];
        sort_friends(&mut friends);
        let names: Vec<_> = friends.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["Adam", "bea", "zoe"]);
    }

    #[test]
    fn search_needs_a_term_and_bounds_the_limit() {
        assert_eq!(search_term(Some("  Eliot ".into())).unwrap(), "eliot");
        let err = search_term(Some("   ".into())).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
        assert!(search_term(None).is_err());

        assert_eq!(clamp_search_limit(None), 20);
        assert_eq!(clamp_search_limit(Some(0)), 1);
        assert_eq!(clamp_search_limit(Some(5000)), 100);
    }
}
