use std::borrow::Cow;

use crate::{
    entry::LeaderboardEntry,
    rank::{format_time, rank},
    settings::ConferenceSettings,
};

/// Header row of the entry table.
pub const CSV_HEADER: [&str; 5] = ["Rank", "Name", "University/Company", "Score", "Time"];

/// Builds the CSV document: four metadata lines, a blank line, the header
/// and one row per ranked entry. Lines are `\n`-separated with no trailing
/// newline.
pub fn export_csv(entries: &[LeaderboardEntry], settings: &ConferenceSettings) -> String {
    let mut lines: Vec<String> = vec![
        quote(&settings.conference_name).into_owned(),
        quote(&settings.village_name).into_owned(),
        quote(&format!("Date: {}", settings.conference_date)).into_owned(),
        quote(&format!("URL: {}", settings.conference_url)).into_owned(),
        String::new(),
        CSV_HEADER.join(","),
    ];

    for ranked in rank(entries) {
        let row = [
            ranked.rank.to_string(),
            quote(&ranked.entry.name).into_owned(),
            quote(&ranked.entry.organization).into_owned(),
            ranked.entry.score.to_string(),
            format_time(ranked.entry.time),
        ];
        lines.push(row.join(","));
    }

    lines.join("\n")
}

/// Quotes a field only when it holds a delimiter, quote or line break.
fn quote(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
