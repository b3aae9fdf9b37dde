//! CLI command tests
//!
//! Each test runs commands against its own temp snapshot file.

use std::path::PathBuf;

use crate::commands;

fn temp_snapshot() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("state_v1.json");
    (dir, path)
}

fn group_id(path: &std::path::Path, name: &str) -> String {
    let store = commands::open_store(Some(path)).unwrap();
    store
        .state()
        .groups
        .iter()
        .find(|g| g.name == name)
        .unwrap()
        .id
        .clone()
}

#[test]
fn test_cmd_init_creates_snapshot_file() {
    let (_dir, path) = temp_snapshot();
    commands::cmd_init(Some(path.as_path())).unwrap();
    assert!(path.exists());
}

#[tokio::test]
async fn test_add_and_list_flow() {
    let (_dir, path) = temp_snapshot();
    commands::cmd_groups_add(Some(path.as_path()), "Home", None, Some(500.0)).unwrap();
    let gid = group_id(&path, "Home");

    commands::cmd_add(
        Some(path.as_path()),
        75.0,
        "expense",
        &gid,
        None,
        Some("2025-06-01"),
        Some("groceries"),
        None,
        false,
    )
    .await
    .unwrap();

    let store = commands::open_store(Some(path.as_path())).unwrap();
    assert_eq!(store.state().transactions.len(), 1);
    assert_eq!(store.state().wallet_balance, -75.0);

    commands::cmd_tx_list(Some(path.as_path()), "all", None, 20).unwrap();
    commands::cmd_report_summary(Some(path.as_path())).unwrap();
    commands::cmd_report_budget(Some(path.as_path())).unwrap();
}

#[test]
fn test_installment_pay_flow() {
    let (_dir, path) = temp_snapshot();
    commands::cmd_installments_add(
        Some(path.as_path()),
        "TV",
        1200.0,
        12,
        0.0,
        Some("2025-01-01"),
        "purchase",
        None,
    )
    .unwrap();

    let store = commands::open_store(Some(path.as_path())).unwrap();
    let iid = store.state().installments[0].id.clone();
    drop(store);

    commands::cmd_installments_pay(Some(path.as_path()), &iid, 0.0, Some("2025-02-01")).unwrap();

    let store = commands::open_store(Some(path.as_path())).unwrap();
    assert_eq!(store.state().installments[0].paid_count, 1);
    assert_eq!(store.state().wallet_balance, -100.0);
}

#[test]
fn test_export_and_import_round_trip() {
    let (_dir, path) = temp_snapshot();
    commands::cmd_groups_add(Some(path.as_path()), "Work", None, None).unwrap();

    let out = path.with_file_name("backup.json");
    commands::cmd_export_full(Some(path.as_path()), &out).unwrap();
    assert!(out.exists());

    let (_dir2, path2) = temp_snapshot();
    commands::cmd_import(Some(path2.as_path()), &out, true).unwrap();
    let store = commands::open_store(Some(path2.as_path())).unwrap();
    assert!(store.state().groups.iter().any(|g| g.name == "Work"));
}

#[test]
fn test_import_rejects_invalid_snapshot() {
    let (_dir, path) = temp_snapshot();
    let bad = path.with_file_name("bad.json");
    std::fs::write(&bad, r#"{"groups": []}"#).unwrap();
    assert!(commands::cmd_import(Some(path.as_path()), &bad, true).is_err());
}

#[test]
fn test_export_transactions_csv_to_file() {
    let (_dir, path) = temp_snapshot();
    commands::cmd_groups_add(Some(path.as_path()), "Home", None, None).unwrap();

    let out = path.with_file_name("txs.csv");
    commands::cmd_export_transactions(Some(path.as_path()), Some(out.as_path()), None, None, None)
        .unwrap();
    let csv = std::fs::read_to_string(&out).unwrap();
    assert!(csv.starts_with("id,date,type,amount"));
}

#[test]
fn test_config_pro_toggle() {
    let (_dir, path) = temp_snapshot();
    commands::cmd_config_pro(Some(path.as_path()), "on").unwrap();
    let store = commands::open_store(Some(path.as_path())).unwrap();
    assert!(store.state().is_pro);

    assert!(commands::cmd_config_pro(Some(path.as_path()), "sideways").is_err());
}

#[test]
fn test_login_logout() {
    let (_dir, path) = temp_snapshot();
    commands::cmd_login(Some(path.as_path()), "Sara", Some("sara@example.test")).unwrap();
    let store = commands::open_store(Some(path.as_path())).unwrap();
    assert!(store.state().user_profile.is_authenticated);
    drop(store);

    commands::cmd_logout(Some(path.as_path())).unwrap();
    let store = commands::open_store(Some(path.as_path())).unwrap();
    assert!(!store.state().user_profile.is_authenticated);
}
