//! 1200x630 PNG share cards.
//!
//! Layout is fixed; only the palette varies with rank (see
//! [`palette::Palette::for_rank`]). The QR code is produced on the blocking
//! pool. A failed QR code is logged and the card is produced without it.

mod draw;
/// Rank-dependent colors.
pub mod palette;

use std::{io::Cursor, path::Path};

use ab_glyph::FontArc;
use image::{DynamicImage, ImageFormat, RgbaImage};
use tracing::{debug, warn};

use self::palette::{CYAN, GREY, LIGHT_GREY, PINK, Palette, RED, WHITE};
use crate::{
    config::CardConfig, entry::LeaderboardEntry, rank::format_time, settings::ConferenceSettings,
};

/// Card width in pixels.
pub const CARD_WIDTH: u32 = 1200;
/// Card height in pixels.
pub const CARD_HEIGHT: u32 = 630;
const QR_SIDE: u32 = 150;

static BUNDLED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

/// Card rendering failures.
#[derive(Debug, thiserror::Error)]
pub enum CardError {
    /// PNG encoding failed.
    #[error("encoding png: {0}")]
    Encode(#[from] image::ImageError),
    /// Font could not be read or parsed.
    #[error("loading font: {0}")]
    Font(String),
    /// A rendering task panicked or was cancelled.
    #[error("render task: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Encoded card.
#[derive(Debug, Clone)]
pub struct ShareCard {
    /// PNG bytes.
    pub png: Vec<u8>,
    /// False when QR generation failed and the card was drawn without it.
    pub has_qr: bool,
}

/// Renders share cards with a loaded font.
#[derive(Clone)]
pub struct CardRenderer {
    font: FontArc,
}

impl std::fmt::Debug for CardRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardRenderer").finish_non_exhaustive()
    }
}

impl CardRenderer {
    /// Renderer using the bundled DejaVu Sans Bold.
    pub fn bundled() -> Result<Self, CardError> {
        let font = FontArc::try_from_slice(BUNDLED_FONT).map_err(|e| CardError::Font(e.to_string()))?;
        Ok(Self { font })
    }

    /// Renderer using a TrueType file from disk.
    pub fn from_font_file(path: &Path) -> Result<Self, CardError> {
        let bytes = std::fs::read(path)
            .map_err(|e| CardError::Font(format!("{}: {e}", path.display())))?;
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| CardError::Font(format!("{}: {e}", path.display())))?;
        Ok(Self { font })
    }

    /// Honors `[card] font_path`, falling back to the bundled font.
    pub fn from_config(config: &CardConfig) -> Result<Self, CardError> {
        match &config.font_path {
            Some(path) => Self::from_font_file(path),
            None => Self::bundled(),
        }
    }

    /// Renders the card for `entry` at `rank`.
    pub async fn render(
        &self,
        entry: &LeaderboardEntry,
        rank: usize,
        settings: &ConferenceSettings,
    ) -> Result<ShareCard, CardError> {
        let url = settings.conference_url.clone();
        let qr = match tokio::task::spawn_blocking(move || draw::qr_image(&url, QR_SIDE, CYAN)).await
        {
            Ok(Ok(img)) => Some(img),
            Ok(Err(err)) => {
                warn!(error = %err, "qr code generation failed; card rendered without it");
                None
            }
            Err(err) => {
                warn!(error = %err, "qr task failed; card rendered without it");
                None
            }
        };

        let has_qr = qr.is_some();
        let font = self.font.clone();
        let entry = entry.clone();
        let settings = settings.clone();
        let png = tokio::task::spawn_blocking(move || {
            let img = compose(&font, &entry, rank, &settings, qr.as_ref());
            encode_png(img)
        })
        .await??;

        debug!(rank, bytes = png.len(), has_qr, "share card rendered");
        Ok(ShareCard { png, has_qr })
    }

    /// Renders and hands the PNG bytes to `on_generated`.
    pub async fn render_with<F>(
        &self,
        entry: &LeaderboardEntry,
        rank: usize,
        settings: &ConferenceSettings,
        on_generated: F,
    ) -> Result<bool, CardError>
    where
        F: FnOnce(Vec<u8>),
    {
        let card = self.render(entry, rank, settings).await?;
        on_generated(card.png);
        Ok(card.has_qr)
    }
}

/// Download name: `<name>_leaderboard_card.png`.
pub fn card_file_name(entry: &LeaderboardEntry) -> String {
    format!("{}_leaderboard_card.png", entry.name)
}

fn compose(
    font: &FontArc,
    entry: &LeaderboardEntry,
    rank: usize,
    settings: &ConferenceSettings,
    qr: Option<&RgbaImage>,
) -> RgbaImage {
    let palette = Palette::for_rank(rank);
    let (w, h) = (CARD_WIDTH, CARD_HEIGHT);
    let mut img = RgbaImage::new(w, h);

    draw::fill_gradient(&mut img, &palette);
    draw::circuit_lines(&mut img, 20, CYAN, 0.1);

    if palette.glow {
        draw::glow_rect(&mut img, 20, 20, i64::from(w) - 40, i64::from(h) - 40, 6, 40, palette.accent);
    }
    draw::stroke_rect(&mut img, 20, 20, w - 40, h - 40, 6, palette.accent);

    draw::glowing_disc(&mut img, 150, 120, 70, 20, palette.accent);
    draw::text_centered(&mut img, font, 48.0, 150, 140, palette::BLACK, &format!("#{rank}"));

    draw::text(&mut img, font, 42.0, 250, 100, RED, &settings.conference_name);
    draw::text(&mut img, font, 24.0, 250, 135, CYAN, &settings.village_name);
    draw::text(&mut img, font, 56.0, 100, 280, WHITE, &entry.name);
    draw::text(&mut img, font, 32.0, 100, 330, LIGHT_GREY, &entry.organization);
    draw::text(&mut img, font, 48.0, 100, 420, PINK, &format!("Score: {}", entry.score));
    draw::text(
        &mut img,
        font,
        48.0,
        100,
        480,
        CYAN,
        &format!("Time: {}", format_time(entry.time)),
    );
    draw::text(&mut img, font, 20.0, 100, 560, GREY, &settings.conference_date);
    draw::text(&mut img, font, 20.0, 100, 590, CYAN, &settings.conference_url);

    if let Some(qr) = qr {
        draw::paste(&mut img, qr, w - 200, h - 200);
    }
    img
}

fn encode_png(img: RgbaImage) -> Result<Vec<u8>, CardError> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(img).write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}
