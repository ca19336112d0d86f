//! CSV and PDF leaderboard exports.
//!
//! Both exporters rank the entries they are given and never read a store.

/// CSV text export.
pub mod csv;
/// Paginated PDF export.
pub mod pdf;

use crate::settings::ConferenceSettings;

pub use self::csv::export_csv;
pub use self::pdf::export_pdf;

/// Export failures.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// PDF assembly failed.
    #[error("pdf: {0}")]
    Pdf(#[from] printpdf::Error),
}

/// Download name for the CSV export: `<villageName>_Leaderboard.csv`.
pub fn csv_file_name(settings: &ConferenceSettings) -> String {
    format!("{}_Leaderboard.csv", settings.village_name)
}

/// Download name for the PDF export: `<villageName>_Leaderboard.pdf`.
pub fn pdf_file_name(settings: &ConferenceSettings) -> String {
    format!("{}_Leaderboard.pdf", settings.village_name)
}
