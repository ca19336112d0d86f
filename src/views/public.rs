use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::debug;

use super::{CHART_SIZE, ViewError};
use crate::{
    card::{CardRenderer, ShareCard, card_file_name},
    rank::{ChartBar, RankedEntry, filter, rank, rank_of, top_scores},
    runtime::{
        events::LeaderboardEvent,
        handle::{LeaderboardHandle, RuntimeError},
    },
    settings::ConferenceSettings,
    share::ShareLinks,
};

/// Everything the public page shows at one moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardPage {
    /// Header metadata.
    pub settings: ConferenceSettings,
    /// Search-filtered entries, ranked within the filtered set.
    pub rows: Vec<RankedEntry>,
    /// Top scores of the whole board, ignoring the search.
    pub chart: Vec<ChartBar>,
}

/// Rendered share card with its suggested file name.
#[derive(Debug, Clone)]
pub struct CardDownload {
    /// Suggested file name.
    pub file_name: String,
    /// Rendered card.
    pub card: ShareCard,
}

/// Read-only view that refreshes on runtime events. Participants share
/// their own rank from here.
pub struct PublicView {
    handle: LeaderboardHandle,
    events: broadcast::Receiver<LeaderboardEvent>,
    renderer: Option<CardRenderer>,
}

impl PublicView {
    /// Subscribes immediately so no change after construction is missed.
    pub fn new(handle: LeaderboardHandle) -> Self {
        let events = handle.subscribe();
        Self {
            handle,
            events,
            renderer: None,
        }
    }

    /// Uses `renderer` for share cards instead of the bundled font.
    pub fn with_renderer(mut self, renderer: CardRenderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Current page for `query`.
    pub async fn snapshot(&self, query: &str) -> Result<LeaderboardPage, ViewError> {
        let entries = self.handle.list().await?;
        let settings = self.handle.settings().await?;
        Ok(LeaderboardPage {
            settings,
            rows: rank(&filter(&entries, query)),
            chart: top_scores(&entries, CHART_SIZE),
        })
    }

    /// Waits for the next entry or settings change.
    ///
    /// A lagged receiver counts as a change, since whatever it skipped may
    /// have altered the page.
    pub async fn next_change(&mut self) -> Result<(), ViewError> {
        loop {
            match self.events.recv().await {
                Ok(event) if event.changes_view() => return Ok(()),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "public view lagged");
                    return Ok(());
                }
                Err(RecvError::Closed) => return Err(RuntimeError::ChannelClosed.into()),
            }
        }
    }

    /// Share card for one entry at its current rank on the whole board.
    pub async fn share_card(&self, id: &str) -> Result<CardDownload, ViewError> {
        let (ranked, settings) = self.ranked(id).await?;
        let renderer = match &self.renderer {
            Some(renderer) => renderer.clone(),
            None => CardRenderer::bundled()?,
        };
        let card = renderer.render(&ranked.entry, ranked.rank, &settings).await?;
        Ok(CardDownload {
            file_name: card_file_name(&ranked.entry),
            card,
        })
    }

    /// Share text and links for one entry at its current rank.
    pub async fn share_links(&self, id: &str) -> Result<ShareLinks, ViewError> {
        let (ranked, settings) = self.ranked(id).await?;
        Ok(ShareLinks::new(ranked.rank, ranked.entry.score, &settings))
    }

    async fn ranked(&self, id: &str) -> Result<(RankedEntry, ConferenceSettings), ViewError> {
        let entries = self.handle.list().await?;
        let ranked = rank_of(&entries, id).ok_or_else(|| ViewError::NotFound(id.to_string()))?;
        let settings = self.handle.settings().await?;
        Ok((ranked, settings))
    }
}
