//! Public and admin leaderboard surfaces over a [`LeaderboardHandle`].
//!
//! [`LeaderboardHandle`]: crate::runtime::handle::LeaderboardHandle

/// Admin surface, gated by an [`AdminSession`](crate::auth::AdminSession).
pub mod admin;
/// Read-only public surface.
pub mod public;

use crate::{card::CardError, export::ExportError, runtime::handle::RuntimeError, types::EntryId};

pub use self::admin::{AdminView, Download};
pub use self::public::{CardDownload, LeaderboardPage, PublicView};

/// Number of bars in the top-scores chart.
pub const CHART_SIZE: usize = 10;

/// View-level failures.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    /// Runtime or storage failed.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    /// CSV or PDF export failed.
    #[error(transparent)]
    Export(#[from] ExportError),
    /// Share card rendering failed.
    #[error(transparent)]
    Card(#[from] CardError),
    /// No entry has this id.
    #[error("entry {0} not found")]
    NotFound(EntryId),
}
