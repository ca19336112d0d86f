use confboard::{
    entry::LeaderboardEntry,
    export::{export_csv, export_pdf},
    rank::{format_time, rank, top_scores},
    settings::ConferenceSettings,
};

fn entry(id: &str, name: &str, org: &str, score: u64, time: u64) -> LeaderboardEntry {
    LeaderboardEntry {
        id: id.to_string(),
        name: name.to_string(),
        organization: org.to_string(),
        score,
        time,
        timestamp: 1_700_000_000_000,
    }
}

fn scenario() -> Vec<LeaderboardEntry> {
    vec![
        entry("a", "Ann Lee", "MIT", 500, 10),
        entry("b", "Ben Ode", "CMU", 900, 20),
        entry("c", "Cy Park", "ETH", 900, 5),
    ]
}

#[test]
fn csv_rows_follow_ranking() {
    let csv = export_csv(&scenario(), &ConferenceSettings::default());
    let rows: Vec<&str> = csv.lines().skip(6).collect();
    assert_eq!(
        rows,
        [
            "1,Cy Park,ETH,900,00:00:05",
            "2,Ben Ode,CMU,900,00:00:20",
            "3,Ann Lee,MIT,500,00:00:10",
        ]
    );
}

#[test]
fn csv_header_block_uses_settings() {
    let settings = ConferenceSettings {
        conference_name: "BSides".to_string(),
        village_name: "Lockpick".to_string(),
        conference_date: "May 2026".to_string(),
        conference_url: "https://bsides.example".to_string(),
    };
    let csv = export_csv(&scenario(), &settings);
    let head: Vec<&str> = csv.lines().take(6).collect();
    assert_eq!(
        head,
        [
            "BSides",
            "Lockpick",
            "Date: May 2026",
            "URL: https://bsides.example",
            "",
            "Rank,Name,University/Company,Score,Time",
        ]
    );
    assert!(!csv.ends_with('\n'));
}

#[test]
fn chart_and_table_agree_on_order() {
    let entries = scenario();
    let ranked = rank(&entries);
    let chart = top_scores(&entries, 10);
    assert_eq!(chart.len(), 3);
    assert_eq!(chart[0].label, "Cy");
    assert_eq!(chart[0].score, ranked[0].entry.score);
    assert_eq!(chart[2].label, "Ann");
}

#[test]
fn time_formatting_examples() {
    assert_eq!(format_time(3661), "01:01:01");
    assert_eq!(format_time(59), "00:00:59");
    assert_eq!(format_time(7384), "02:03:04");
    assert_eq!(format_time(360_000), "100:00:00");
}

#[test]
fn pdf_export_handles_empty_and_full_boards() {
    let settings = ConferenceSettings::default();
    let empty = export_pdf(&[], &settings).expect("empty pdf");
    assert!(empty.starts_with(b"%PDF"));

    let many: Vec<_> = (0..75)
        .map(|i| entry(&format!("id{i}"), &format!("Player {i}"), "Org", 1000 - i, i))
        .collect();
    let full = export_pdf(&many, &settings).expect("full pdf");
    assert!(full.starts_with(b"%PDF"));
    assert!(full.len() > empty.len());
}
