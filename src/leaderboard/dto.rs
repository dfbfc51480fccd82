use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardQuery {
    pub class_year: Option<String>,
    pub residence: Option<String>,
    pub dietary_pattern: Option<String>,
    pub limit: Option<i64>,
}

/// Filters that were applied; echoed back with the ranking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub residence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dietary_pattern: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub post_count: i64,
    pub residence: Option<String>,
    pub dietary_pattern: Option<String>,
    pub class_year: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Leaderboard {
    pub leaderboard: Vec<LeaderboardEntry>,
    pub filters: LeaderboardFilters,
}

/// Distinct values present across profiles, sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub class_years: Vec<String>,
    pub residences: Vec<String>,
    pub dietary_patterns: Vec<String>,
}
