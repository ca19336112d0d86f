use std::time::Duration;

use confboard::{
    auth::{AuthError, Authenticator, hash_password},
    config::AdminConfig,
    core::store::EntryStore,
    entry::{EntryForm, EntryPatch},
    persist::memory::MemorySlots,
    runtime::handle::{LeaderboardHandle, RuntimeConfig, spawn_leaderboard},
    settings::ConferenceSettings,
    types::now_ms,
    views::{AdminView, PublicView, ViewError},
};

fn spawn() -> LeaderboardHandle {
    spawn_leaderboard(
        EntryStore::new(),
        ConferenceSettings::default(),
        Box::new(MemorySlots::new()),
        RuntimeConfig::default(),
    )
}

fn admin_config(password: &str) -> AdminConfig {
    AdminConfig {
        password_hash: Some(hash_password(password).expect("hash")),
        ..AdminConfig::default()
    }
}

async fn admin(handle: &LeaderboardHandle) -> AdminView {
    let auth = Authenticator::new(handle.clone(), admin_config("s3cret"));
    let session = auth.login("s3cret").await.expect("login");
    AdminView::new(handle.clone(), session)
}

#[tokio::test]
async fn login_resume_logout_cycle() {
    let handle = spawn();
    let auth = Authenticator::new(handle.clone(), admin_config("s3cret"));

    let err = auth.login("admin").await.expect_err("wrong password");
    assert!(matches!(err, AuthError::InvalidCredentials));
    assert!(auth.resume().await.expect("resume").is_none());

    let session = auth.login("s3cret").await.expect("login");
    let resumed = auth.resume().await.expect("resume").expect("live session");
    assert_eq!(resumed, session);
    let record = handle.load_session().await.expect("load").expect("stored");
    assert_eq!(record.token, session.token());
    assert_eq!(record.issued_at_ms, session.issued_at_ms());

    let admin = AdminView::new(handle.clone(), session.clone());
    assert_eq!(admin.session(), &session);

    auth.logout().await.expect("logout");
    assert!(auth.resume().await.expect("resume").is_none());
    assert!(matches!(auth.require().await, Err(AuthError::NoSession)));

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn unconfigured_password_blocks_login() {
    let handle = spawn();
    let auth = Authenticator::new(handle.clone(), AdminConfig::default());
    let err = auth.login("anything").await.expect_err("no hash");
    assert!(matches!(err, AuthError::NotConfigured));
    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn expired_session_is_dropped() {
    let handle = spawn();
    let config = AdminConfig {
        session_ttl_secs: 0,
        ..admin_config("pw")
    };
    let auth = Authenticator::new(handle.clone(), config);
    auth.login("pw").await.expect("login");
    tokio::time::sleep(Duration::from_millis(5)).await;

    assert!(auth.resume().await.expect("resume").is_none());
    assert!(handle.load_session().await.expect("load").is_none());
    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn admin_add_shows_up_on_public_page() {
    let handle = spawn();
    let admin = admin(&handle).await;
    let public = PublicView::new(handle.clone());

    let before = now_ms();
    let entry = admin
        .add_entry(EntryForm::new("Alice Smith", "MIT", "500", "10"))
        .await
        .expect("add");
    assert!(entry.timestamp >= before);

    let page = public.snapshot("").await.expect("snapshot");
    assert_eq!(page.rows.len(), 1);
    assert_eq!(page.rows[0].rank, 1);
    assert_eq!(page.rows[0].entry, entry);
    assert_eq!(page.chart[0].label, "Alice");

    let invalid = admin
        .add_entry(EntryForm::new("", "MIT", "1", "1"))
        .await
        .expect_err("invalid");
    assert!(matches!(invalid, ViewError::Runtime(_)));

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn search_filters_rows_but_not_chart() {
    let handle = spawn();
    let admin = admin(&handle).await;
    admin
        .add_entry(EntryForm::new("Alice", "MIT", "500", "10"))
        .await
        .expect("add");
    admin
        .add_entry(EntryForm::new("Bob", "CMU", "900", "20"))
        .await
        .expect("add");

    let page = PublicView::new(handle.clone())
        .snapshot("mit")
        .await
        .expect("snapshot");
    assert_eq!(page.rows.len(), 1);
    assert_eq!(page.rows[0].entry.organization, "MIT");
    assert_eq!(page.rows[0].rank, 1);
    assert_eq!(page.chart.len(), 2);
    assert_eq!(page.chart[0].label, "Bob");

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn public_view_wakes_on_changes() {
    let handle = spawn();
    let admin = admin(&handle).await;
    let mut public = PublicView::new(handle.clone());

    let entry = admin
        .add_entry(EntryForm::new("Alice", "MIT", "500", "10"))
        .await
        .expect("add");
    tokio::time::timeout(Duration::from_secs(1), public.next_change())
        .await
        .expect("woke")
        .expect("change");

    admin
        .update_entry(
            &entry.id,
            EntryPatch {
                time: Some(9),
                ..EntryPatch::default()
            },
        )
        .await
        .expect("update");
    tokio::time::timeout(Duration::from_secs(1), public.next_change())
        .await
        .expect("woke")
        .expect("change");

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn exports_use_current_ranking_and_sharing_is_public() {
    let handle = spawn();
    let admin = admin(&handle).await;
    for (name, score, time) in [("Ann", "500", "10"), ("Ben", "900", "20"), ("Cy", "900", "5")] {
        admin
            .add_entry(EntryForm::new(name, "Org", score, time))
            .await
            .expect("add");
    }

    let csv = admin.export_csv().await.expect("csv");
    assert_eq!(csv.file_name, "Hospitalizing Malware Village_Leaderboard.csv");
    let text = String::from_utf8(csv.bytes).expect("utf8");
    assert!(text.ends_with("3,Ann,Org,500,00:00:10"));

    let pdf = admin.export_pdf().await.expect("pdf");
    assert_eq!(pdf.file_name, "Hospitalizing Malware Village_Leaderboard.pdf");
    assert!(pdf.bytes.starts_with(b"%PDF"));

    let ben = handle
        .list()
        .await
        .expect("list")
        .into_iter()
        .find(|e| e.name == "Ben")
        .expect("ben");
    let public = PublicView::new(handle.clone());
    let links = public.share_links(&ben.id).await.expect("links");
    assert!(links.text.starts_with("Just ranked #2 at "));

    let card = public.share_card(&ben.id).await.expect("card");
    assert_eq!(card.file_name, "Ben_leaderboard_card.png");
    assert!(card.card.has_qr);
    assert!(card.card.png.starts_with(&[0x89, b'P', b'N', b'G']));

    let missing = public.share_links("nope").await.expect_err("missing");
    assert!(matches!(missing, ViewError::NotFound(_)));

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn settings_round_trip_through_admin() {
    let handle = spawn();
    let admin = admin(&handle).await;
    assert_eq!(admin.settings().await.expect("get"), ConferenceSettings::default());

    let custom = ConferenceSettings {
        conference_name: "HOPE 16".to_string(),
        ..ConferenceSettings::default()
    };
    admin.save_settings(custom.clone()).await.expect("save");
    assert_eq!(admin.settings().await.expect("get"), custom);

    let page = PublicView::new(handle.clone()).snapshot("").await.expect("snapshot");
    assert_eq!(page.settings, custom);

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn share_ranks_against_whole_board_without_login() {
    let handle = spawn();
    for (name, org, score) in [("Ann", "MIT", "900"), ("Ben", "MIT", "500"), ("Cy", "CMU", "700")] {
        handle
            .add(EntryForm::new(name, org, score, "10"))
            .await
            .expect("add");
    }
    let ben = handle
        .list()
        .await
        .expect("list")
        .into_iter()
        .find(|e| e.name == "Ben")
        .expect("ben");

    let public = PublicView::new(handle.clone());
    let filtered = public.snapshot("mit").await.expect("snapshot");
    assert_eq!(filtered.rows[1].entry.id, ben.id);
    assert_eq!(filtered.rows[1].rank, 2);

    let links = public.share_links(&ben.id).await.expect("links");
    assert!(links.text.starts_with("Just ranked #3 at "));

    handle.shutdown().await.expect("shutdown");
}
