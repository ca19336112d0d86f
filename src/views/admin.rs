use tracing::info;

use super::ViewError;
use crate::{
    auth::AdminSession,
    entry::{EntryForm, EntryPatch, LeaderboardEntry},
    export::{csv_file_name, export_csv, export_pdf, pdf_file_name},
    runtime::handle::LeaderboardHandle,
    settings::ConferenceSettings,
};

/// Named file contents ready to be written or downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Suggested file name.
    pub file_name: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// Mutating view. Constructing one requires an [`AdminSession`], which only
/// [`Authenticator`](crate::auth::Authenticator) hands out.
pub struct AdminView {
    handle: LeaderboardHandle,
    session: AdminSession,
}

impl AdminView {
    /// Admin view over `handle` for a logged-in `session`.
    pub fn new(handle: LeaderboardHandle, session: AdminSession) -> Self {
        Self { handle, session }
    }

    /// Session this view was opened with.
    pub fn session(&self) -> &AdminSession {
        &self.session
    }

    /// Validates and stores a new entry.
    pub async fn add_entry(&self, form: EntryForm) -> Result<LeaderboardEntry, ViewError> {
        let entry = self.handle.add(form).await?;
        info!(id = %entry.id, name = %entry.name, "admin added entry");
        Ok(entry)
    }

    /// `Ok(false)` when nothing matched or the patch was empty.
    pub async fn update_entry(&self, id: &str, patch: EntryPatch) -> Result<bool, ViewError> {
        Ok(self.handle.update(id, patch).await?)
    }

    /// Deleting an unknown id is not an error.
    pub async fn delete_entry(&self, id: &str) -> Result<bool, ViewError> {
        let removed = self.handle.delete(id).await?;
        if removed {
            info!(id, "admin deleted entry");
        }
        Ok(removed)
    }

    /// Current conference settings.
    pub async fn settings(&self) -> Result<ConferenceSettings, ViewError> {
        Ok(self.handle.settings().await?)
    }

    /// Replaces the conference settings.
    pub async fn save_settings(&self, settings: ConferenceSettings) -> Result<(), ViewError> {
        self.handle.save_settings(settings).await?;
        info!("admin saved settings");
        Ok(())
    }

    /// Whole board as CSV.
    pub async fn export_csv(&self) -> Result<Download, ViewError> {
        let entries = self.handle.list().await?;
        let settings = self.handle.settings().await?;
        Ok(Download {
            file_name: csv_file_name(&settings),
            bytes: export_csv(&entries, &settings).into_bytes(),
        })
    }

    /// Whole board as PDF.
    pub async fn export_pdf(&self) -> Result<Download, ViewError> {
        let entries = self.handle.list().await?;
        let settings = self.handle.settings().await?;
        let bytes = export_pdf(&entries, &settings)?;
        Ok(Download {
            file_name: pdf_file_name(&settings),
            bytes,
        })
    }
}
