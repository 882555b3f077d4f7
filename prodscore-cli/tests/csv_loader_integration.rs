//! Loads the on-disk fixture and imports it into a store, end to end.

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use prodscore_cli::csv_loader;
use prodscore_core::Tracker;
use prodscore_core::db::MemoryRepository;
use rust_decimal_macros::dec;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("charges.csv")
}

#[test]
fn test_load_fixture_file_succeeds() {
    let charges =
        csv_loader::load_from_file(&fixture_path()).expect("fixture file should load without error");

    assert_eq!(charges.len(), 4);
}

#[test]
fn test_load_fixture_values() {
    let charges = csv_loader::load_from_file(&fixture_path()).unwrap();

    let names: Vec<_> = charges.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Rent", "Phone", "Gym", "Streaming"]);
    assert_eq!(charges[1].amount_per_month, dec!(19.99));
    assert_eq!(charges[2].amount_per_month, dec!(29.90));
}

#[tokio::test]
async fn test_imported_charges_lower_net_rate() {
    let repo = MemoryRepository::new();
    let tracker = Tracker::new(&repo);
    tracker.complete_onboarding(dec!(25), dec!(35)).await.unwrap();

    let imported = tracker
        .import_charges(csv_loader::load_from_file(&fixture_path()).unwrap())
        .await
        .unwrap();

    assert_eq!(imported.len(), 4);

    assert_eq!(tracker.total_charges_per_month().await.unwrap(), dec!(712.39));
    assert!(tracker.net_per_hour().await.unwrap() < dec!(25));
}
