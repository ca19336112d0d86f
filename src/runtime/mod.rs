//! Single-writer leaderboard task, its persistence worker and change events.

/// Change notifications broadcast to subscribers.
pub mod events;
/// [`handle::LeaderboardHandle`] and the command loop behind it.
pub mod handle;
