use chrono::Utc;
use folio_core::settings::entity::{MAX_NETWORK_PROFILES, NetworkProfile, Settings};
use folio_core::settings::error::StoreError;
use folio_core::settings::port::ConfigStore;
use folio_store::json::JsonConfigStore;
use folio_store::memory::MemoryConfigStore;
use tempfile::tempdir;

#[test]
fn test_json_store_roundtrip_across_reopen() {
    let tmp_dir = tempdir().expect("Failed to create temp dir");

    {
        let mut store = JsonConfigStore::open(tmp_dir.path()).unwrap();
        assert_eq!(store.settings(), &Settings::default());

        store.add_or_update_network(NetworkProfile::new("home", "pw", 7, true)).unwrap();
        assert_eq!(store.set_volume(150).unwrap(), 100);
        assert!(!store.toggle_access_point().unwrap());
        store.record_association("home", Utc::now(), Some(-48)).unwrap();
    }

    let reopened = JsonConfigStore::open(tmp_dir.path()).unwrap();
    let settings = reopened.settings();
    assert_eq!(settings.networks.len(), 1);
    assert_eq!(settings.networks[0].attempts, 1);
    assert_eq!(settings.networks[0].signal_dbm, Some(-48));
    assert_eq!(settings.buzzer.volume, 100);
    assert!(!settings.access_point_enabled);
}

#[test]
fn test_json_store_invalid_file_falls_back_to_defaults() {
    let tmp_dir = tempdir().unwrap();
    std::fs::write(tmp_dir.path().join("settings.json"), b"{ not json").unwrap();

    let store = JsonConfigStore::open(tmp_dir.path()).unwrap();
    assert_eq!(store.settings(), &Settings::default());
}

#[test]
fn test_json_store_foreign_schema_falls_back_to_defaults() {
    let tmp_dir = tempdir().unwrap();
    std::fs::write(
        tmp_dir.path().join("settings.json"),
        br#"{ "schema": 99, "settings": { "access_point_enabled": false } }"#,
    )
    .unwrap();

    let store = JsonConfigStore::open(tmp_dir.path()).unwrap();
    assert!(store.settings().access_point_enabled);
}

#[test]
fn test_json_store_leaves_no_temp_file() {
    let tmp_dir = tempdir().unwrap();
    let mut store = JsonConfigStore::open(tmp_dir.path()).unwrap();
    store.set_display_brightness(40).unwrap();

    assert!(store.path().exists());
    assert!(!tmp_dir.path().join("settings.json.tmp").exists());
}

#[test]
fn test_network_table_evicts_lowest_priority() {
    let mut store = MemoryConfigStore::default();
    for (i, priority) in [5u8, 2, 8, 2, 9].into_iter().enumerate() {
        store
            .add_or_update_network(NetworkProfile::new(format!("net{i}"), "", priority, true))
            .unwrap();
    }
    assert_eq!(store.settings().networks.len(), MAX_NETWORK_PROFILES);

    store.add_or_update_network(NetworkProfile::new("new", "", 4, true)).unwrap();

    let ssids: Vec<&str> = store.settings().networks.iter().map(|n| n.ssid.as_str()).collect();
    assert_eq!(ssids, vec!["net0", "net2", "net3", "net4", "new"]);
}

#[test]
fn test_empty_ssid_rejected() {
    let mut store = MemoryConfigStore::default();
    let err = store.add_or_update_network(NetworkProfile::new("  ", "", 5, true)).unwrap_err();
    assert!(matches!(err, StoreError::Invalid(_)));
    assert!(store.settings().networks.is_empty());
}

#[test]
fn test_remove_network() {
    let mut store = MemoryConfigStore::default();
    store.add_or_update_network(NetworkProfile::new("a", "", 5, true)).unwrap();
    assert!(store.remove_network("a").unwrap());
    assert!(!store.remove_network("a").unwrap());
}
