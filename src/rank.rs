//! Ranking, search filtering, chart data and time formatting.
//!
//! Every surface that shows a rank (table, chart, CSV, PDF, share card) goes
//! through [`rank`], so the same entry set always yields the same numbers.

use std::cmp::Ordering;

use serde::Serialize;

use crate::{
    entry::LeaderboardEntry,
    types::{Score, Seconds},
};

/// Entry paired with its 1-based rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
    /// 1-based position after ranking.
    pub rank: usize,
    /// Ranked record.
    pub entry: LeaderboardEntry,
}

/// One bar of the top-scores chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartBar {
    /// First word of the participant name.
    pub label: String,
    /// Score value.
    pub score: Score,
}

/// Leaderboard order: higher score first, then lower time.
pub fn compare(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.score.cmp(&a.score).then(a.time.cmp(&b.time))
}

/// Stable sort by [`compare`]; entries tied on both score and time keep
/// their input order.
pub fn rank(entries: &[LeaderboardEntry]) -> Vec<RankedEntry> {
    let mut sorted: Vec<&LeaderboardEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| compare(a, b));
    sorted
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| RankedEntry {
            rank: idx + 1,
            entry: entry.clone(),
        })
        .collect()
}

/// Rank of the entry with `id`, if present.
pub fn rank_of(entries: &[LeaderboardEntry], id: &str) -> Option<RankedEntry> {
    rank(entries).into_iter().find(|r| r.entry.id == id)
}

/// Case-insensitive substring match over name and organization.
///
/// A blank query keeps every entry.
pub fn filter(entries: &[LeaderboardEntry], query: &str) -> Vec<LeaderboardEntry> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return entries.to_vec();
    }
    entries
        .iter()
        .filter(|e| {
            e.name.to_lowercase().contains(&needle)
                || e.organization.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// First `n` ranked entries as chart bars labelled by first name.
pub fn top_scores(entries: &[LeaderboardEntry], n: usize) -> Vec<ChartBar> {
    rank(entries)
        .into_iter()
        .take(n)
        .map(|r| ChartBar {
            label: r
                .entry
                .name
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string(),
            score: r.entry.score,
        })
        .collect()
}

/// Formats seconds as zero-padded `HH:MM:SS`. Hours are not capped at 24.
pub fn format_time(seconds: Seconds) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}
