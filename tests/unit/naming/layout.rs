use super::*;
use crate::naming::ids::SHOW;

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

fn touch(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"").unwrap();
}

#[test]
fn shot_files_are_filtered_and_sorted() {
    let tmp = temp_dir("layout_shot_files");
    for name in [
        "rec_abc010_cam_v002.ma",
        "rec_abc010_cam_v001.ma",
        "rec_def020_cam_v001.ma",
        "notes.txt",
    ] {
        touch(&tmp.join(name));
    }
    std::fs::create_dir_all(tmp.join("rec_abc010_dir")).unwrap();

    let shot = ShotId::from_filename("rec_abc010", SHOW).unwrap();
    let files = find_shot_files(&shot, &tmp).unwrap();
    assert_eq!(
        files,
        vec![
            tmp.join("rec_abc010_cam_v001.ma"),
            tmp.join("rec_abc010_cam_v002.ma"),
        ]
    );

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn shot_dir_resolves_sequence_then_number() {
    let tmp = temp_dir("layout_shot_dir");
    std::fs::create_dir_all(tmp.join("01_ABC").join("SH_010")).unwrap();
    std::fs::create_dir_all(tmp.join("01_ABC").join("SH_020")).unwrap();
    std::fs::create_dir_all(tmp.join("02_DEF").join("SH_010")).unwrap();

    let shot = ShotId::from_filename("rec_abc010_lights", SHOW).unwrap();
    assert_eq!(
        find_shot_dir(&shot, &tmp).unwrap(),
        tmp.join("01_ABC").join("SH_010")
    );
    assert_eq!(
        caches_dir(&find_shot_dir(&shot, &tmp).unwrap()),
        tmp.join("01_ABC").join("SH_010").join("LIGHT").join("cache")
    );

    let missing = ShotId::from_filename("rec_abc030", SHOW).unwrap();
    let err = find_shot_dir(&missing, &tmp).unwrap_err();
    assert!(matches!(err, PipelineError::DirectoryNotFound(_)));

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn missing_root_is_directory_not_found() {
    let tmp = temp_dir("layout_missing_root");
    let shot = ShotId::from_filename("rec_abc010", SHOW).unwrap();
    let err = find_shot_files(&shot, &tmp).unwrap_err();
    assert!(matches!(err, PipelineError::DirectoryNotFound(_)));
}

#[test]
fn model_path_finds_master_scene() {
    let tmp = temp_dir("layout_model");
    let scenes = tmp
        .join("MECHANIC")
        .join("MODEL")
        .join("1.2")
        .join("MAYA")
        .join("scenes");
    touch(&scenes.join("rec_asset_mechanic_model_1.2_WIP.ma"));
    touch(&scenes.join("rec_asset_mechanic_model_1.2_MASTER.abc"));
    touch(&scenes.join("rec_asset_mechanic_model_1.2_MASTER.mb"));
    touch(
        &tmp.join("MECHANIC")
            .join("MODEL")
            .join("draft")
            .join("MAYA")
            .join("scenes")
            .join("rec_asset_mechanic_model_0.9_MASTER.ma"),
    );

    let found = find_model_path(AssetName::Mechanic, SHOW, &tmp).unwrap();
    assert_eq!(found, scenes.join("rec_asset_mechanic_model_1.2_MASTER.mb"));

    let err = find_model_path(AssetName::Robot, SHOW, &tmp).unwrap_err();
    assert!(matches!(err, PipelineError::NotFound(_)));

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn unknown_shared_drive_is_not_found() {
    let err = find_shared_drive("REC_NO_SUCH_DRIVE_7f3a").unwrap_err();
    assert!(matches!(
        err,
        PipelineError::DirectoryNotFound(_) | PipelineError::Validation(_)
    ));
}

#[test]
fn caches_dir_is_light_cache() {
    assert_eq!(
        caches_dir(Path::new("/drive/SEQ_ABC/SH_010")),
        Path::new("/drive/SEQ_ABC/SH_010/LIGHT/cache")
    );
}

#[test]
fn assets_dir_sits_on_the_main_drive() {
    assert_eq!(
        assets_dir(Path::new("/drives/REC")),
        Path::new("/drives/REC/02_ASSETS")
    );
    let err = find_assets_dir().unwrap_err();
    assert!(matches!(
        err,
        PipelineError::DirectoryNotFound(_) | PipelineError::Validation(_)
    ));
}
