use std::path::Path;

use nucleo::common::storage::{DATA_DIR_ENV, LocalStore, Storable};
use nucleo::engine::auth::{self, AuthFlag};
use nucleo::engine::history::{self, HistoryLog, UNNAMED_PERIOD};
use nucleo::engine::model::{AnalysisType, BusinessProfile, HistoryRecord, HistorySummary};
use nucleo::engine::profile;
use serial_test::serial;
use tempfile::tempdir;

fn record(id: &str) -> HistoryRecord {
    HistoryRecord {
        id: id.to_string(),
        kind: AnalysisType::Business,
        date: "2024-03-31T12:00:00+00:00".into(),
        month_year: "Março 2024".into(),
        input: "in".into(),
        result: "out".into(),
        summary: HistorySummary {
            faturamento: "R$ 1,00".into(),
            lucro_bruto: "N/A".into(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Storage ────────────────────────────────────────────────

    #[test]
    fn test_open_creates_directory() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("nested").join("data");
        let store = LocalStore::open(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(store.root(), root.as_path());
        assert_eq!(store.path_for("k"), root.join("k.json"));
    }

    #[test]
    fn test_missing_key_loads_none() {
        let dir = tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        assert_eq!(store.load::<AuthFlag>().unwrap(), None);
        // Removing what is not there is fine.
        store.remove::<AuthFlag>().unwrap();
    }

    #[test]
    fn test_corrupt_blob_is_an_error() {
        let dir = tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        std::fs::write(store.path_for(HistoryLog::KEY), "{not json").unwrap();
        let err = HistoryLog::load(&store).unwrap_err();
        assert!(format!("{err:#}").contains("Corrupt data"));
    }

    #[test]
    fn test_history_json_shape() {
        let dir = tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        store.save(&HistoryLog(vec![record("a")])).unwrap();

        let raw = std::fs::read_to_string(store.path_for("nucleo_history")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let first = &value[0];
        assert_eq!(first["type"], "CNPJ");
        assert_eq!(first["monthYear"], "Março 2024");
        assert_eq!(first["summary"]["lucroBruto"], "N/A");
    }

    #[test]
    #[serial]
    fn test_resolve_root_precedence() {
        let explicit = Path::new("/tmp/explicit-nucleo");
        unsafe { std::env::set_var(DATA_DIR_ENV, "/tmp/env-nucleo") };
        assert_eq!(
            LocalStore::resolve_root(Some(explicit)),
            Path::new("/tmp/env-nucleo")
        );

        unsafe { std::env::remove_var(DATA_DIR_ENV) };
        assert_eq!(LocalStore::resolve_root(Some(explicit)), explicit);
        assert!(LocalStore::resolve_root(None).ends_with("nucleo"));
    }

    // ── History ────────────────────────────────────────────────

    #[test]
    fn test_save_record_prepends() {
        let dir = tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();

        let first = history::save_record(&store, AnalysisType::Business, "Janeiro 2024", "p1", "r1").unwrap();
        let second = history::save_record(&store, AnalysisType::Personal, "  ", "p2", "r2").unwrap();

        let log = HistoryLog::load(&store).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.records()[0].id, second.id);
        assert_eq!(log.records()[1].id, first.id);
        assert_eq!(second.month_year, UNNAMED_PERIOD);
        assert_eq!(second.kind, AnalysisType::Personal);
        assert_ne!(first.id, second.id);
        assert!(chrono::DateTime::parse_from_rfc3339(&first.date).is_ok());
    }

    #[test]
    fn test_find_by_prefix() {
        let log = HistoryLog(vec![record("abc123"), record("abd456"), record("ab")]);
        assert_eq!(log.find("abc").unwrap().id, "abc123");
        // An exact id wins over prefix matches.
        assert_eq!(log.find("ab").unwrap().id, "ab");

        let log = HistoryLog(vec![record("abc123"), record("abd456")]);
        assert!(log.find("ab").unwrap_err().to_string().contains("Ambiguous"));
        assert!(log.find("zz").unwrap_err().to_string().contains("No analysis"));
        assert!(log.find("").is_err());
    }

    #[test]
    fn test_delete_is_persisted() {
        let dir = tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        store
            .save(&HistoryLog(vec![record("one"), record("two"), record("three")]))
            .unwrap();

        let removed = history::delete_record(&store, "tw").unwrap();
        assert_eq!(removed.id, "two");

        let ids: Vec<String> = HistoryLog::load(&store)
            .unwrap()
            .records()
            .iter()
            .map(|r| r.id.clone())
            .collect();
        assert_eq!(ids, vec!["one", "three"]);

        assert!(history::delete_record(&store, "two").is_err());
    }

    #[test]
    fn test_clear_history() {
        let dir = tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        history::save_record(&store, AnalysisType::Business, "Maio 2024", "p", "r").unwrap();
        history::clear(&store).unwrap();
        assert!(HistoryLog::load(&store).unwrap().is_empty());
        assert!(!store.path_for(HistoryLog::KEY).exists());
    }

    // ── Auth ───────────────────────────────────────────────────

    #[test]
    fn test_login_logout() {
        let dir = tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        assert!(!auth::is_logged_in(&store));

        auth::login(&store).unwrap();
        assert!(auth::is_logged_in(&store));
        let raw = std::fs::read_to_string(store.path_for("nucleo_auth")).unwrap();
        assert_eq!(raw.trim(), "true");

        auth::logout(&store).unwrap();
        assert!(!auth::is_logged_in(&store));
    }

    #[test]
    fn test_unreadable_auth_counts_as_logged_out() {
        let dir = tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        std::fs::write(store.path_for(AuthFlag::KEY), "maybe").unwrap();
        assert!(!auth::is_logged_in(&store));
        std::fs::write(store.path_for(AuthFlag::KEY), "false").unwrap();
        assert!(!auth::is_logged_in(&store));
    }

    // ── Profile ────────────────────────────────────────────────

    #[test]
    fn test_profile_round_trip() {
        let dir = tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        assert!(!profile::load(&store).unwrap().is_configured());

        let mut p = BusinessProfile::default();
        p.general.name = "Oficina do Zé".into();
        p.operation.sales_channel = vec!["WhatsApp".into()];
        profile::save(&store, &p).unwrap();
        assert_eq!(profile::load(&store).unwrap(), p);

        profile::clear(&store).unwrap();
        assert_eq!(profile::load(&store).unwrap(), BusinessProfile::default());
    }

    #[test]
    fn test_profile_accepts_partial_json() {
        let dir = tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        std::fs::write(
            store.path_for(BusinessProfile::KEY),
            r#"{"general":{"name":"Café"},"structure":{"type":"online"}}"#,
        )
        .unwrap();
        let p = profile::load(&store).unwrap();
        assert_eq!(p.general.name, "Café");
        assert_eq!(p.structure.store_type, nucleo::engine::model::StoreType::Online);
        assert_eq!(p.structure.units, "1");
    }
}
