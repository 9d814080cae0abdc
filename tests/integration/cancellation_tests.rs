use dupsweep::actions::DeletionMode;
use dupsweep::pipeline::{Pipeline, PipelineConfig, RunError};
use dupsweep::progress::{NullSink, ProgressSink, PHASE_HASH, PHASE_REMOVE, PHASE_SCAN};
use dupsweep::signal::StopSignal;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::tempdir;

/// Raises the stop signal when a given phase starts.
struct StopAtPhase {
    phase: &'static str,
    stop: StopSignal,
}

impl ProgressSink for StopAtPhase {
    fn on_message(&self, _message: &str) {}

    fn on_phase_start(&self, phase: &str, _total: usize) {
        if phase == self.phase {
            self.stop.request_stop();
        }
    }
}

/// Raises the stop signal once the walk has found `after` paths.
struct StopMidWalk {
    after: usize,
    walking: AtomicBool,
    stop: StopSignal,
}

impl ProgressSink for StopMidWalk {
    fn on_message(&self, _message: &str) {}

    fn on_phase_start(&self, phase: &str, _total: usize) {
        self.walking.store(phase == PHASE_SCAN, Ordering::SeqCst);
    }

    fn on_progress(&self, current: usize) {
        if self.walking.load(Ordering::SeqCst) && current == self.after {
            self.stop.request_stop();
        }
    }

    fn on_phase_end(&self, _phase: &str) {
        self.walking.store(false, Ordering::SeqCst);
    }
}

fn pipeline() -> Pipeline {
    Pipeline::new(
        PipelineConfig::default()
            .with_deletion_mode(DeletionMode::Permanent)
            .with_workers(1),
    )
}

fn populate(root: &Path) {
    fs::write(root.join("a.txt"), b"duplicate").unwrap();
    fs::write(root.join("b.txt"), b"duplicate").unwrap();
    fs::write(root.join("c.txt"), b"unique!").unwrap();
}

fn assert_untouched(root: &Path) {
    for name in ["a.txt", "b.txt", "c.txt"] {
        assert!(root.join(name).exists(), "{name} was deleted");
    }
}

#[test]
fn test_stop_after_scan() {
    let dir = tempdir().unwrap();
    populate(dir.path());

    let stop = StopSignal::new();
    let trigger = stop.clone();
    let sink = move |line: &str| {
        if line.starts_with("Total files") {
            trigger.request_stop();
        }
    };

    let err = pipeline().run(dir.path(), &sink, &stop).unwrap_err();
    let summary = err.partial_summary().expect("partial summary");

    assert!(err.is_cancelled());
    assert!(summary.stopped);
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.size_duplicates, 0);
    assert_eq!(summary.content_duplicates, 0);
    assert_eq!(summary.removed, 0);
    assert_untouched(dir.path());
}

#[test]
fn test_stop_during_hashing() {
    let dir = tempdir().unwrap();
    populate(dir.path());

    let stop = StopSignal::new();
    let sink = StopAtPhase {
        phase: PHASE_HASH,
        stop: stop.clone(),
    };

    let err = pipeline().run(dir.path(), &sink, &stop).unwrap_err();
    let summary = err.partial_summary().unwrap();

    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.size_duplicates, 2);
    assert_eq!(summary.content_duplicates, 0);
    assert_eq!(summary.removed, 0);
    assert_untouched(dir.path());
}

#[test]
fn test_stop_before_first_removal() {
    let dir = tempdir().unwrap();
    populate(dir.path());

    let stop = StopSignal::new();
    let sink = StopAtPhase {
        phase: PHASE_REMOVE,
        stop: stop.clone(),
    };

    let err = pipeline().run(dir.path(), &sink, &stop).unwrap_err();
    let summary = err.partial_summary().unwrap();

    assert_eq!(summary.content_duplicates, 2);
    assert_eq!(summary.removed, 0);
    assert_eq!(summary.failed_removals, 0);
    assert_untouched(dir.path());
}

#[test]
fn test_stop_during_walk_is_cancelled_not_no_files() {
    let dir = tempdir().unwrap();
    populate(dir.path());
    let stop = StopSignal::new();
    stop.request_stop();

    let result = pipeline().run(dir.path(), &NullSink, &stop);
    assert!(matches!(result, Err(RunError::Cancelled { .. })));
    assert_untouched(dir.path());
}

#[test]
fn test_stop_mid_walk_keeps_scanned_count() {
    let dir = tempdir().unwrap();
    for i in 0..50 {
        fs::write(dir.path().join(format!("file_{i:02}.txt")), b"same").unwrap();
    }

    let stop = StopSignal::new();
    let sink = StopMidWalk {
        after: 10,
        walking: AtomicBool::new(false),
        stop: stop.clone(),
    };

    let err = pipeline().run(dir.path(), &sink, &stop).unwrap_err();
    let summary = err.partial_summary().unwrap();

    assert!(summary.stopped);
    assert!(summary.total_files >= 10);
    assert!(summary.total_files < 50);
    assert_eq!(summary.size_duplicates, 0);
    assert_eq!(summary.removed, 0);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 50);
}

#[test]
fn test_reset_signal_allows_new_run() {
    let dir = tempdir().unwrap();
    populate(dir.path());
    let stop = StopSignal::new();
    stop.request_stop();
    assert!(pipeline().run(dir.path(), &NullSink, &stop).is_err());

    stop.reset();
    let summary = pipeline().run(dir.path(), &NullSink, &stop).unwrap();
    assert_eq!(summary.removed, 1);
}
