use super::*;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "rec_pipeline_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn defaults_match_production_layout() {
    let cfg = PipelineConfig::default();
    assert_eq!(cfg.show, "rec");
    assert_eq!(cfg.version_indicator, 'v');
    assert_eq!(cfg.alembic_assets, vec!["robotFace".to_string()]);
    assert_eq!(cfg.queue.queue_file, PathBuf::from("__render_queue.txt"));
    assert_eq!(cfg.queue.backup_suffix, BackupSuffix::Tilde);
    cfg.validate().unwrap();
}

#[test]
fn empty_object_is_default() {
    let cfg: PipelineConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(cfg, PipelineConfig::default());
}

#[test]
fn unknown_fields_are_rejected() {
    assert!(serde_json::from_str::<PipelineConfig>(r#"{"shows": "x"}"#).is_err());
}

#[test]
fn backup_suffix_spellings() {
    let q: QueueConfig = serde_json::from_str(r#"{"backup_suffix": ".bak"}"#).unwrap();
    assert_eq!(q.backup_suffix, BackupSuffix::Bak);
    assert!(serde_json::from_str::<QueueConfig>(r#"{"backup_suffix": ".old"}"#).is_err());

    let p = Path::new("/data/__render_queue.txt");
    assert_eq!(
        BackupSuffix::Tilde.sibling(p),
        PathBuf::from("/data/__render_queue.txt~")
    );
    assert_eq!(
        BackupSuffix::Bak.sibling(p),
        PathBuf::from("/data/__render_queue.txt.bak")
    );
}

#[test]
fn validate_rejects_bad_values() {
    let cfg = PipelineConfig {
        show: String::new(),
        ..PipelineConfig::default()
    };
    assert!(matches!(cfg.validate(), Err(PipelineError::Validation(_))));

    let cfg = PipelineConfig {
        version_indicator: '_',
        ..PipelineConfig::default()
    };
    assert!(cfg.validate().is_err());

    let cfg = PipelineConfig {
        alembic_assets: vec![String::new()],
        ..PipelineConfig::default()
    };
    assert!(cfg.validate().is_err());

    let cfg = PipelineConfig {
        alembic_assets: vec!["robtFace".to_string()],
        ..PipelineConfig::default()
    };
    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("robtFace"));
}

#[test]
fn from_path_resolves_queue_paths_next_to_file() {
    let tmp = temp_dir("config_from_path");
    std::fs::create_dir_all(&tmp).unwrap();
    let path = tmp.join("pipeline.json");
    std::fs::write(
        &path,
        r#"{
            "alembic_assets": ["robotFace", "mechanic"],
            "queue": { "queue_file": "q.txt", "failure_log": "/abs/failed.csv" },
            "render": { "maya_bin": "/opt/maya/bin" }
        }"#,
    )
    .unwrap();

    let cfg = PipelineConfig::from_path(&path).unwrap();
    assert_eq!(cfg.alembic_assets.len(), 2);
    assert_eq!(cfg.queue.queue_file, tmp.join("q.txt"));
    assert_eq!(cfg.queue.failure_log, PathBuf::from("/abs/failed.csv"));
    assert_eq!(cfg.queue.journal, tmp.join(".rec_renderJobs.json"));
    assert_eq!(
        cfg.render.maya_bin_dir().unwrap(),
        PathBuf::from("/opt/maya/bin")
    );

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn from_path_reports_parse_errors() {
    let tmp = temp_dir("config_bad_json");
    std::fs::create_dir_all(&tmp).unwrap();
    let path = tmp.join("pipeline.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = PipelineConfig::from_path(&path).unwrap_err();
    assert!(matches!(err, PipelineError::Serde(_)));

    let missing = PipelineConfig::from_path(&tmp.join("nope.json")).unwrap_err();
    assert!(matches!(missing, PipelineError::Filesystem { .. }));

    std::fs::remove_dir_all(&tmp).ok();
}
