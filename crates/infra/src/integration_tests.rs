//! Integration tests for the file-backed pipeline.
//!
//! Catalog files → engine → file override store → event bus → cart.

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::sync::Arc;

    use uuid::Uuid;

    use rackquote_catalog::{Axis, Selection};
    use rackquote_core::{ExpectedVersion, PartId, RackFamily};
    use rackquote_engine::{EngineSettings, QuoteEngine, QuoteRequest};
    use rackquote_events::{EventBus, InMemoryEventBus, PriceEvent};
    use rackquote_pricing::{OverrideRepository, PartDescriptor, SubtotalPolicy};

    use crate::batch::run_batch;
    use crate::catalog_files::{BOM_TEMPLATES_FILE, PRICE_TABLE_FILE, load_catalog};
    use crate::config::EngineConfig;
    use crate::override_store::{FileOverrideRepository, parse_backup};

    const PRICES: &str = r#"{ "stainless": { "45x90": { "180": { "L4": 70000 } } } }"#;

    const TEMPLATES: &str = r#"{
        "light-duty": { "900x450": { "H1800": { "L4": { "standalone": {
            "total_price": 32000,
            "components": [
                { "name": "Upright", "quantity": 4, "unit_price": 3000 },
                { "name": "Shelf", "quantity": 4, "unit_price": 5000 }
            ]
        } } } } }
    }"#;

    type Engine = QuoteEngine<Arc<FileOverrideRepository>, Arc<InMemoryEventBus<PriceEvent>>>;

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("rackquote-{}", Uuid::now_v7()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_catalog(dir: &PathBuf) {
        fs::write(dir.join(PRICE_TABLE_FILE), PRICES).unwrap();
        fs::write(dir.join(BOM_TEMPLATES_FILE), TEMPLATES).unwrap();
    }

    fn setup(dir: &PathBuf) -> (Engine, Arc<FileOverrideRepository>, Arc<InMemoryEventBus<PriceEvent>>) {
        write_catalog(dir);
        let catalog = load_catalog(dir).unwrap();
        let store = Arc::new(FileOverrideRepository::open(dir.join("overrides.json")).unwrap());
        let bus = Arc::new(InMemoryEventBus::new());
        let engine = QuoteEngine::with_settings(catalog, Arc::clone(&store), Arc::clone(&bus), EngineSettings::default());
        (engine, store, bus)
    }

    fn light_duty(quantity: u64) -> QuoteRequest {
        let selection = Selection::default()
            .with(Axis::Size, "900x450")
            .with(Axis::Height, "H1800")
            .with(Axis::Level, "L4")
            .with(Axis::FormType, "standalone");
        QuoteRequest::new(RackFamily::LightDuty, selection, quantity)
    }

    fn post() -> PartDescriptor {
        PartDescriptor::new(RackFamily::LightDuty, "Post(H1800)", "Height H1800").with_unit_price(3000)
    }

    #[test]
    fn catalog_without_accessories_still_quotes() {
        let dir = scratch_dir();
        let (engine, _, _) = setup(&dir);

        assert_eq!(engine.quote_price(&light_duty(2)), 64_000);
        assert!(engine.catalog().accessories.find(RackFamily::LightDuty, "anything").is_none());
    }

    #[test]
    fn missing_price_table_is_an_error() {
        let dir = scratch_dir();
        fs::write(dir.join(BOM_TEMPLATES_FILE), TEMPLATES).unwrap();

        let err = load_catalog(&dir).unwrap_err();
        assert!(format!("{err:#}").contains(PRICE_TABLE_FILE));
    }

    #[test]
    fn overrides_survive_reopening_the_store() {
        let dir = scratch_dir();
        {
            let (engine, _, _) = setup(&dir);
            engine.update_override(&post(), 3600.0, "Post H1800", "admin", ExpectedVersion::Exact(0)).unwrap();
        }

        let (engine, store, _) = setup(&dir);
        assert_eq!(engine.resolve_price(&post()), 3600);
        let record = store.get(&post().part_id()).unwrap().unwrap();
        assert_eq!(record.revision, 1);
        assert_eq!(record.actor, "admin");
        assert_eq!(store.history(&post().part_id()).unwrap().len(), 1);

        // Stale revision is rejected and nothing is written.
        assert!(
            engine
                .update_override(&post(), 4000.0, "", "admin", ExpectedVersion::Exact(0))
                .is_err()
        );
        let reopened = FileOverrideRepository::open(store.path()).unwrap();
        assert_eq!(reopened.get(&post().part_id()).unwrap().unwrap().price, 3600);
    }

    #[test]
    fn removing_an_override_is_persisted() {
        let dir = scratch_dir();
        let (engine, store, _) = setup(&dir);
        engine.update_override(&post(), 3600.0, "", "admin", ExpectedVersion::Any).unwrap();
        engine.update_override(&post(), 0.0, "", "admin", ExpectedVersion::Any).unwrap();

        let reopened = FileOverrideRepository::open(store.path()).unwrap();
        assert!(reopened.get(&post().part_id()).unwrap().is_none());
        assert_eq!(reopened.history(&post().part_id()).unwrap().len(), 2);
        assert_eq!(engine.quote_price(&light_duty(1)), 32_000);
    }

    #[test]
    fn malformed_entries_are_skipped_on_load() {
        let dir = scratch_dir();
        let path = dir.join("overrides.json");
        fs::write(
            &path,
            r#"{
                "overrides": {
                    "good": { "price": 1200, "timestamp": "2026-01-05T09:00:00Z", "actor": "admin" },
                    "bad": { "price": "twelve hundred" }
                },
                "history": {
                    "good": [
                        { "timestamp": "2026-01-05T09:00:00Z", "old_price": 1000, "new_price": 1200 },
                        { "old_price": 1 }
                    ],
                    "odd": 42
                }
            }"#,
        )
        .unwrap();

        let store = FileOverrideRepository::open(&path).unwrap();
        let overrides = store.list().unwrap();
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides[0].0, PartId::from_raw("good"));
        assert_eq!(store.history(&PartId::from_raw("good")).unwrap().len(), 1);
        assert!(store.history(&PartId::from_raw("odd")).unwrap().is_empty());
    }

    #[test]
    fn garbage_store_file_starts_empty_and_is_kept_aside() {
        let dir = scratch_dir();
        let path = dir.join("overrides.json");
        fs::write(&path, "not json at all").unwrap();

        let store = Arc::new(FileOverrideRepository::open(&path).unwrap());
        assert!(store.list().unwrap().is_empty());
        assert_eq!(fs::read_to_string(dir.join("overrides.json.corrupt")).unwrap(), "not json at all");

        write_catalog(&dir);
        let engine = QuoteEngine::new(load_catalog(&dir).unwrap(), Arc::clone(&store), InMemoryEventBus::new());
        assert_eq!(engine.quote_price(&light_duty(1)), 32_000);
        engine.update_override(&post(), 3300.0, "", "admin", ExpectedVersion::Exact(0)).unwrap();

        let reopened = FileOverrideRepository::open(&path).unwrap();
        assert_eq!(reopened.get(&post().part_id()).unwrap().unwrap().price, 3300);
    }

    #[test]
    fn backup_restore_round_trip_notifies_subscribers() {
        let dir = scratch_dir();
        let (engine, store, bus) = setup(&dir);
        engine.update_override(&post(), 3600.0, "", "admin", ExpectedVersion::Any).unwrap();
        let backup = store.backup().unwrap();

        engine.update_override(&post(), 0.0, "", "admin", ExpectedVersion::Any).unwrap();
        assert_eq!(engine.resolve_price(&post()), 3000);

        let events = bus.subscribe();
        engine.restore_overrides(parse_backup(&backup).unwrap()).unwrap();

        assert_eq!(engine.resolve_price(&post()), 3600);
        assert!(matches!(events.drain().as_slice(), [PriceEvent::OverridesReloaded { .. }]));
        let reopened = FileOverrideRepository::open(store.path()).unwrap();
        assert_eq!(reopened.get(&post().part_id()).unwrap().unwrap().price, 3600);
    }

    #[test]
    fn backup_without_override_sections_is_rejected() {
        assert!(parse_backup(r#"{ "version": 1 }"#).is_err());
        assert!(parse_backup("[]").is_err());
        assert!(parse_backup(r#"{ "overrides": {} }"#).unwrap().is_empty());
    }

    #[test]
    fn config_file_values_are_clamped() {
        let dir = scratch_dir();
        fs::write(
            dir.join("rackquote.toml"),
            "history_cap = 500\nsubtotal_policy = \"item-only\"\napply_rate = 150.0\ncatalog_dir = \"fixtures\"\n",
        )
        .unwrap();

        let config = EngineConfig::load_from(&dir).unwrap();
        assert_eq!(config.history_cap, 100);
        assert_eq!(config.subtotal_policy, SubtotalPolicy::ItemOnly);
        assert_eq!(config.apply_rate, 100.0);
        assert_eq!(config.catalog_dir, PathBuf::from("fixtures"));
        assert!(config.suffix_fallback);

        let settings = config.engine_settings();
        assert_eq!(settings.resolver.history_cap, 100);
        assert_eq!(settings.subtotal_policy, SubtotalPolicy::ItemOnly);
    }

    #[test]
    fn local_config_overrides_the_shared_file() {
        let dir = scratch_dir();
        fs::write(dir.join("rackquote.toml"), "history_cap = 60\nsuffix_fallback = true\n").unwrap();
        fs::write(dir.join("local.toml"), "history_cap = 10\nsuffix_fallback = false\n").unwrap();

        let config = EngineConfig::load_from(&dir).unwrap();
        assert_eq!(config.history_cap, 50);
        assert!(!config.suffix_fallback);
    }

    #[test]
    fn empty_config_dir_uses_defaults() {
        let config = EngineConfig::load_from(&scratch_dir()).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn batch_report_merges_materials() {
        let dir = scratch_dir();
        let (engine, _, _) = setup(&dir);
        let stainless = Selection::default()
            .with(Axis::Size, "45x90")
            .with(Axis::Height, "180")
            .with(Axis::Level, "L4");
        let requests = vec![
            light_duty(1),
            light_duty(0),
            QuoteRequest::new(RackFamily::Stainless, stainless, 1),
            light_duty(2),
        ];

        let report = run_batch(&engine, requests).unwrap();
        assert_eq!(report.items.len(), 3);
        assert_eq!(report.totals.item_sum, 3 * 32_000 + 70_000);
        let posts: u64 = report
            .materials
            .iter()
            .filter(|l| l.name == "Post(H1800)")
            .map(|l| l.quantity)
            .sum();
        assert_eq!(posts, 12);
    }
}
