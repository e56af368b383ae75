use super::*;
use crate::foundation::config::BackupSuffix;

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "rec_pipeline_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn config(tmp: &Path) -> QueueConfig {
    QueueConfig::default().resolved(tmp)
}

fn write_queue(cfg: &QueueConfig, items: &[PathBuf]) {
    let body: String = items
        .iter()
        .map(|p| format!("{}\n", p.display()))
        .collect();
    std::fs::write(&cfg.queue_file, body).unwrap();
}

#[test]
fn missing_scene_is_logged_and_queue_advances() {
    let tmp = temp_dir("session_scenario");
    let cfg = config(&tmp);
    let scene1 = tmp.join("scene1.ma");
    let scene2 = tmp.join("scene2.ma");
    std::fs::write(&scene2, b"//Maya ASCII").unwrap();
    write_queue(&cfg, &[scene1.clone(), scene2.clone()]);

    let mut session = QueueSession::open(&cfg).unwrap();

    let first = session.pop().unwrap();
    assert_eq!(first, scene1.display().to_string());
    assert!(!Path::new(&first).is_file());
    session.failures().record(&first, NOT_FOUND).unwrap();
    assert_eq!(
        std::fs::read_to_string(&cfg.queue_file).unwrap(),
        format!("{}\n", scene2.display())
    );

    let second = session.pop().unwrap();
    assert_eq!(second, scene2.display().to_string());
    assert_eq!(std::fs::read_to_string(&cfg.queue_file).unwrap(), "");

    assert!(session.pop().unwrap_err().is_queue_empty());

    let failures = session.failures().read_all().unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].item, scene1.display().to_string());
    assert_eq!(failures[0].reason, "not found");

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn open_backs_up_once_before_mutation() {
    let tmp = temp_dir("session_backup");
    let mut cfg = config(&tmp);
    cfg.backup_suffix = BackupSuffix::Bak;
    std::fs::write(&cfg.queue_file, "a.ma\nb.ma\n").unwrap();

    let mut session = QueueSession::open(&cfg).unwrap();
    assert_eq!(session.backup_path(), tmp.join("__render_queue.txt.bak"));
    session.pop().unwrap();

    assert_eq!(
        std::fs::read_to_string(session.backup_path()).unwrap(),
        "a.ma\nb.ma\n"
    );
    assert_eq!(std::fs::read_to_string(&cfg.queue_file).unwrap(), "b.ma\n");

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn open_without_queue_file_is_fatal() {
    let tmp = temp_dir("session_missing_queue");
    let err = QueueSession::open(&config(&tmp)).unwrap_err();
    assert!(err.is_fatal());
    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn next_valid_skips_missing_scenes() {
    let tmp = temp_dir("session_next_valid");
    let cfg = config(&tmp);
    let good = tmp.join("rec_abc010_lights_v001.mb");
    std::fs::write(&good, b"").unwrap();
    write_queue(&cfg, &[tmp.join("gone.ma"), good.clone(), tmp.join("later.ma")]);

    let mut session = QueueSession::open(&cfg).unwrap();
    assert_eq!(session.next_valid().unwrap(), good);
    assert_eq!(session.remaining(), 1);
    assert_eq!(
        std::fs::read_to_string(&cfg.queue_file).unwrap(),
        format!("{}\n", tmp.join("later.ma").display())
    );

    assert!(session.next_valid().unwrap_err().is_queue_empty());
    assert_eq!(session.failures().read_all().unwrap().len(), 2);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn drain_processes_every_item_and_logs_failures() {
    let tmp = temp_dir("session_drain");
    let cfg = config(&tmp);
    let ok = tmp.join("ok.ma");
    let bad = tmp.join("bad_arnold.mb");
    std::fs::write(&ok, b"").unwrap();
    std::fs::write(&bad, b"").unwrap();
    write_queue(&cfg, &[ok.clone(), tmp.join("missing.ma"), bad.clone()]);
    // Trailing blank line.
    let mut body = std::fs::read_to_string(&cfg.queue_file).unwrap();
    body.push('\n');
    std::fs::write(&cfg.queue_file, body).unwrap();

    let mut seen = Vec::new();
    let mut processor = |scene: &Path| -> anyhow::Result<()> {
        seen.push(scene.to_path_buf());
        if scene.to_string_lossy().contains("bad") {
            anyhow::bail!("render exited with status 3");
        }
        Ok(())
    };

    let mut session = QueueSession::open(&cfg).unwrap();
    let summary = session.drain(&mut processor).unwrap();

    assert_eq!(
        summary,
        SessionSummary {
            completed: 1,
            failed: 1,
            missing: 1,
            blank: 1,
        }
    );
    assert_eq!(summary.total(), 4);
    assert_eq!(seen, vec![ok, bad.clone()]);
    assert_eq!(std::fs::read_to_string(&cfg.queue_file).unwrap(), "");
    assert_eq!(session.remaining(), 0);

    let failures = session.failures().read_all().unwrap();
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0].reason, NOT_FOUND);
    assert_eq!(failures[1].item, bad.display().to_string());
    assert!(failures[1].reason.contains("status 3"));

    assert!(session.journal().in_flight().unwrap().is_empty());
    let log = std::fs::read_to_string(session.journal().session_log()).unwrap();
    assert_eq!(log.lines().count(), 2);
    assert!(log.lines().nth(1).unwrap().ends_with("\tfailed"));

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn item_is_persisted_away_before_processing() {
    let tmp = temp_dir("session_write_after_pop");
    let cfg = config(&tmp);
    let a = tmp.join("a.ma");
    let b = tmp.join("b.ma");
    std::fs::write(&a, b"").unwrap();
    std::fs::write(&b, b"").unwrap();
    write_queue(&cfg, &[a.clone(), b.clone()]);

    let queue_file = cfg.queue_file.clone();
    let journal_file = cfg.journal.clone();
    let mut snapshots = Vec::new();
    let mut processor = |_: &Path| -> anyhow::Result<()> {
        snapshots.push((
            std::fs::read_to_string(&queue_file).unwrap(),
            std::fs::read_to_string(&journal_file).unwrap(),
        ));
        Ok(())
    };

    let mut session = QueueSession::open(&cfg).unwrap();
    session.drain(&mut processor).unwrap();

    // While `a` renders, the file no longer lists it and the journal names it.
    assert_eq!(snapshots[0].0, format!("{}\n", b.display()));
    assert!(snapshots[0].1.contains("a.ma"));
    assert_eq!(snapshots[1].0, "");
    assert!(snapshots[1].1.contains("b.ma"));

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn crashed_drain_moves_past_the_item_that_killed_it() {
    let tmp = temp_dir("session_crash_advance");
    let cfg = config(&tmp);
    let poison = tmp.join("poison.ma");
    let next = tmp.join("next.ma");
    std::fs::write(&poison, b"").unwrap();
    std::fs::write(&next, b"").unwrap();
    write_queue(&cfg, &[poison.clone(), next.clone()]);

    let mut seen = Vec::new();
    for _ in 0..3 {
        let mut session = QueueSession::open(&cfg).unwrap();
        let mut processor = |scene: &Path| -> anyhow::Result<()> {
            seen.push(scene.to_path_buf());
            if scene.ends_with("poison.ma") {
                panic!("renderer took the driver down");
            }
            Ok(())
        };
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            session.drain(&mut processor)
        }));
    }

    assert_eq!(seen, vec![poison.clone(), next.clone()]);
    assert_eq!(std::fs::read_to_string(&cfg.queue_file).unwrap(), "");

    let failures = FailureLog::new(&cfg.failure_log).read_all().unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].item, poison.display().to_string());
    assert_eq!(failures[0].reason, INTERRUPTED);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn interrupted_jobs_are_recorded_on_open() {
    let tmp = temp_dir("session_recover");
    let cfg = config(&tmp);
    let head = tmp.join("head.ma");
    write_queue(&cfg, &[head.clone()]);

    let journal = JobJournal::new(&cfg.journal, &cfg.session_log);
    journal.start("old-1", &head.display().to_string()).unwrap();
    journal.start("old-2", "/shots/lost.ma").unwrap();

    let session = QueueSession::open(&cfg).unwrap();
    assert!(session.journal().in_flight().unwrap().is_empty());

    let mut failures = session.failures().read_all().unwrap();
    failures.sort_by(|a, b| a.item.cmp(&b.item));
    assert_eq!(failures.len(), 2);
    assert!(failures.iter().all(|f| f.reason == INTERRUPTED));
    assert_eq!(failures[0].item, "/shots/lost.ma");
    assert_eq!(failures[1].item, head.display().to_string());
    assert_eq!(session.remaining(), 1);

    std::fs::remove_dir_all(&tmp).ok();
}
