use dupsweep::actions::DeletionMode;
use dupsweep::pipeline::{self, Pipeline, PipelineConfig, RunError};
use dupsweep::progress::{NullSink, ProgressSink, PHASE_HASH, PHASE_METADATA};
use dupsweep::scanner::HashAlgorithm;
use dupsweep::signal::StopSignal;
use filetime::{set_file_mtime, FileTime};
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use tempfile::tempdir;

fn permanent(workers: usize) -> Pipeline {
    Pipeline::new(
        PipelineConfig::default()
            .with_deletion_mode(DeletionMode::Permanent)
            .with_workers(workers),
    )
}

fn write_aged(path: &Path, content: &[u8], unix_secs: i64) {
    fs::write(path, content).unwrap();
    set_file_mtime(path, FileTime::from_unix_time(unix_secs, 0)).unwrap();
}

#[test]
fn test_scan_a_b_c_scenario() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    let c = dir.path().join("c.txt");

    write_aged(&a, &[b'x'; 100], 1_000_000);
    std::thread::sleep(std::time::Duration::from_millis(20));
    write_aged(&b, &[b'x'; 100], 2_000_000);
    write_aged(&c, &[b'y'; 100], 3_000_000);

    let lines = Mutex::new(Vec::new());
    let sink = |line: &str| lines.lock().unwrap().push(line.to_string());
    let summary = permanent(1)
        .run(dir.path(), &sink, &StopSignal::new())
        .unwrap();

    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.size_duplicates, 3);
    assert_eq!(summary.content_duplicates, 2);
    assert_eq!(summary.content_groups, 1);
    assert_eq!(summary.removed, 1);
    assert_eq!(summary.failed_removals, 0);
    assert_eq!(summary.bytes_freed, 100);

    assert!(a.exists(), "oldest copy must survive");
    assert!(!b.exists());
    assert!(c.exists());

    let lines = lines.into_inner().unwrap();
    assert!(lines.contains(&"Total files: 3".to_string()));
    assert!(lines.contains(&"Size duplicates: 3 files in 1 groups".to_string()));
    assert!(lines.contains(&"Content duplicates: 2 files in 1 groups".to_string()));
    assert!(lines.contains(&"Removed: 1 files (0 failed)".to_string()));
}

/// Records the phases a run starts.
#[derive(Default)]
struct PhaseRecorder {
    phases: Mutex<Vec<String>>,
}

impl ProgressSink for PhaseRecorder {
    fn on_message(&self, _message: &str) {}

    fn on_phase_start(&self, phase: &str, _total: usize) {
        self.phases.lock().unwrap().push(phase.to_string());
    }
}

#[test]
fn test_scan_all_distinct_sizes_skips_hashing() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("one.txt"), b"1").unwrap();
    fs::write(dir.path().join("two.txt"), b"22").unwrap();
    fs::write(dir.path().join("three.txt"), b"333").unwrap();

    let recorder = PhaseRecorder::default();
    let summary = permanent(1)
        .run(dir.path(), &recorder, &StopSignal::new())
        .unwrap();

    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.size_duplicates, 0);
    assert_eq!(summary.content_duplicates, 0);
    assert_eq!(summary.removed, 0);

    let phases = recorder.phases.into_inner().unwrap();
    assert!(phases.iter().any(|p| p == PHASE_METADATA));
    assert!(!phases.iter().any(|p| p == PHASE_HASH));
}

#[test]
fn test_scan_same_size_different_content() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.bin"), b"aaaa").unwrap();
    fs::write(dir.path().join("b.bin"), b"bbbb").unwrap();

    let summary = permanent(1)
        .run(dir.path(), &NullSink, &StopSignal::new())
        .unwrap();

    assert_eq!(summary.size_duplicates, 2);
    assert_eq!(summary.content_duplicates, 0);
    assert!(dir.path().join("a.bin").exists());
    assert!(dir.path().join("b.bin").exists());
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub").join("deeper");
    fs::create_dir_all(&sub).unwrap();

    write_aged(&dir.path().join("top.txt"), b"shared content", 1_000);
    write_aged(&sub.join("nested.txt"), b"shared content", 2_000);

    let summary = permanent(1)
        .run(dir.path(), &NullSink, &StopSignal::new())
        .unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(summary.removed, 1);
    assert!(dir.path().join("top.txt").exists());
    assert!(!sub.join("nested.txt").exists());
}

#[test]
fn test_scan_idempotent() {
    let dir = tempdir().unwrap();
    for i in 0..4 {
        write_aged(&dir.path().join(format!("copy{i}.dat")), b"payload", 1_000 + i);
    }
    fs::write(dir.path().join("other.dat"), b"different").unwrap();

    let first = permanent(1)
        .run(dir.path(), &NullSink, &StopSignal::new())
        .unwrap();
    assert_eq!(first.removed, 3);

    let second = permanent(1)
        .run(dir.path(), &NullSink, &StopSignal::new())
        .unwrap();
    assert_eq!(second.total_files, 2);
    assert_eq!(second.content_duplicates, 0);
    assert_eq!(second.removed, 0);
    assert!(dir.path().join("copy0.dat").exists());
}

#[test]
fn test_scan_parallel_matches_sequential() {
    let sequential_dir = tempdir().unwrap();
    let parallel_dir = tempdir().unwrap();

    for root in [sequential_dir.path(), parallel_dir.path()] {
        for i in 0..60u32 {
            // 20 distinct contents, each written three times
            let content = format!("content number {:03}", i % 20);
            write_aged(&root.join(format!("f{i:03}.txt")), content.as_bytes(), 1_000 + i64::from(i));
        }
    }

    let sequential = permanent(1)
        .run(sequential_dir.path(), &NullSink, &StopSignal::new())
        .unwrap();
    let parallel = Pipeline::new(
        PipelineConfig::default()
            .with_deletion_mode(DeletionMode::Permanent)
            .with_workers(4)
            .with_parallel_threshold(0),
    )
    .run(parallel_dir.path(), &NullSink, &StopSignal::new())
    .unwrap();

    assert_eq!(sequential.total_files, 60);
    assert_eq!(sequential.content_groups, 20);
    assert_eq!(sequential.removed, 40);
    assert_eq!(parallel.total_files, sequential.total_files);
    assert_eq!(parallel.content_groups, sequential.content_groups);
    assert_eq!(parallel.removed, sequential.removed);

    // Survivors are the oldest copies: f000..f019
    for i in 0..20 {
        assert!(parallel_dir.path().join(format!("f{i:03}.txt")).exists());
    }
    assert_eq!(fs::read_dir(parallel_dir.path()).unwrap().count(), 20);
}

#[test]
fn test_scan_sha256_finds_same_groups() {
    let dir = tempdir().unwrap();
    write_aged(&dir.path().join("a.txt"), b"same bytes", 10);
    write_aged(&dir.path().join("b.txt"), b"same bytes", 20);

    let summary = Pipeline::new(
        PipelineConfig::default()
            .with_hash_algorithm(HashAlgorithm::Sha256)
            .with_dry_run(true)
            .with_workers(1),
    )
    .run(dir.path(), &NullSink, &StopSignal::new())
    .unwrap();

    assert_eq!(summary.content_groups, 1);
    assert_eq!(summary.bytes_freed, 10);
}

#[test]
fn test_run_shortcut_missing_root() {
    let dir = tempdir().unwrap();
    let result = pipeline::run(
        &dir.path().join("does-not-exist"),
        DeletionMode::Permanent,
        &NullSink,
        &StopSignal::new(),
    );
    assert!(matches!(result, Err(RunError::NotFound(_))));
}

#[test]
fn test_run_no_files() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("empty_sub")).unwrap();

    let result = pipeline::run(dir.path(), DeletionMode::Permanent, &NullSink, &StopSignal::new());
    assert!(matches!(result, Err(RunError::NoFiles(_))));
}
