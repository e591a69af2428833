mod common;

use common::{fixture_source, TISANES_YAML};
use pretty_assertions::assert_eq;
use std::fs;
use tea_explorer::catalog::{CatalogHandle, CatalogLoader, ExportFormat, RecordKind};
use tea_explorer::journal::{EntryUpdate, JournalStore, NewEntry, RecordRef};
use tempfile::tempdir;

#[test]
fn test_entries_keep_snapshot_after_record_is_removed() {
    let dir = tempdir().unwrap();
    let handle = CatalogHandle::open(CatalogLoader::strict(), fixture_source(dir.path())).unwrap();
    let mut journal = JournalStore::new(dir.path().join("tea_journal.json"));

    let set = handle.snapshot();
    let hibiscus = set.get_by_id(RecordKind::Tisane, "hibiscus").unwrap();
    let entry = journal
        .add(NewEntry::for_record(hibiscus, 4).with_notes("Iced, with mint"))
        .unwrap();
    assert_eq!(entry.record, RecordRef::new(RecordKind::Tisane, "hibiscus"));

    let remaining = TISANES_YAML.replace("id: hibiscus", "id: roselle");
    fs::write(dir.path().join("tisanes.yaml"), remaining).unwrap();
    let reloaded = handle.reload().unwrap();
    assert!(reloaded
        .get_by_id(RecordKind::Tisane, "hibiscus")
        .unwrap_err()
        .is_not_found());

    // the journal is never pruned by a reload
    let mut reopened = JournalStore::new(journal.path());
    let kept = reopened.get(entry.id).unwrap();
    assert_eq!(kept.record_name, "Hibiscus");
    assert_eq!(kept.notes, "Iced, with mint");
}

#[test]
fn test_journal_round_trip_through_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("journal.json");
    let sencha = RecordRef::new(RecordKind::Tea, "sencha");

    {
        let mut journal = JournalStore::new(&path);
        journal
            .add(NewEntry::new(sencha.clone(), "Sencha", 4).with_brewing("70°C, 60s"))
            .unwrap();
        journal.add(NewEntry::new(sencha.clone(), "Sencha", 2)).unwrap();
        journal
            .update(
                2,
                EntryUpdate {
                    notes: Some("Oversteeped".to_string()),
                    ..EntryUpdate::default()
                },
            )
            .unwrap();
    }

    let stored: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(stored.as_array().unwrap().len(), 2);
    assert_eq!(stored[0]["record"]["kind"], "tea");
    assert_eq!(stored[1]["notes"], "Oversteeped");
    assert!(stored[0].get("updated_at").is_none());

    let mut journal = JournalStore::new(&path);
    assert_eq!(journal.average_rating(&sencha).unwrap(), Some(3.0));
    assert!(!dir.path().join("nested").join("journal.json.tmp").exists());
}

#[test]
fn test_journal_json_export_matches_entries() {
    let dir = tempdir().unwrap();
    let mut journal = JournalStore::new(dir.path().join("journal.json"));
    journal
        .add(NewEntry::new(RecordRef::new(RecordKind::Blend, "earl-grey"), "Earl Grey", 5))
        .unwrap();

    let exported: serde_json::Value =
        serde_json::from_slice(&journal.export(ExportFormat::Json).unwrap()).unwrap();
    assert_eq!(exported[0]["record_name"], "Earl Grey");
    assert_eq!(exported[0]["rating"], 5);

    let first = journal.export(ExportFormat::Csv).unwrap();
    let second = journal.export(ExportFormat::Csv).unwrap();
    assert_eq!(first, second);
}
