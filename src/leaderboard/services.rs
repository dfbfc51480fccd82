use super::dto::{LeaderboardEntry, LeaderboardFilters, LeaderboardQuery};
use super::repo_types::StandingRow;
use crate::text::{display_name, non_blank};

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 500;

impl LeaderboardFilters {
    /// Blank filter values are treated as absent.
    pub fn from_query(q: &LeaderboardQuery) -> LeaderboardFilters {
        LeaderboardFilters {
            class_year: non_blank(q.class_year.clone()),
            residence: non_blank(q.residence.clone()),
            dietary_pattern: non_blank(q.dietary_pattern.clone()),
        }
    }
}

pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Numbers already-ordered standings from 1; equal counts still get
/// distinct ranks.
pub fn rank(rows: Vec<StandingRow>) -> Vec<LeaderboardEntry> {
    rows.into_iter()
        .enumerate()
        .map(|(i, r)| LeaderboardEntry {
            rank: i + 1,
            user_name: display_name(r.first_name.as_deref(), r.last_name.as_deref(), &r.email),
            user_id: r.user_id,
            user_email: r.email,
            post_count: r.post_count,
            residence: r.residence,
            dietary_pattern: r.dietary_pattern,
            class_year: r.class_year,
        })
        .collect()
}
