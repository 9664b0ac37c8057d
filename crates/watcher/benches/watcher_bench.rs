//! Performance benchmarks for the notification queue and polling detector

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use vigil_core::{ChangeKind, ChangeNotification, EventMask};
use vigil_watcher::{NotificationQueue, PollingDetector};

fn bench_queue(c: &mut Criterion) {
    let notifications: Vec<_> = (0..1000)
        .map(|i| ChangeNotification::new(ChangeKind::Modified, PathBuf::from(format!("/repo/file{i}.rs"))))
        .collect();

    c.bench_function("queue_push_poll_1000", |b| {
        b.iter_batched(
            || notifications.clone(),
            |batch| {
                let queue = NotificationQueue::new();
                for notification in batch {
                    queue.push(notification);
                }
                while let Some(notification) = queue.poll() {
                    black_box(notification);
                }
            },
            BatchSize::SmallInput,
        );
    });

    c.bench_function("queue_extend_1000", |b| {
        b.iter_batched(
            || notifications.clone(),
            |batch| {
                let queue = NotificationQueue::new();
                queue.extend(batch);
                black_box(queue.len())
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_detector(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("watched.txt");
    fs::write(&file, b"content").unwrap();

    let mut all = PollingDetector::new(&file, EventMask::SIZE | EventMask::LAST_WRITE);
    all.detect_changes();
    c.bench_function("detect_changes_unchanged", |b| {
        b.iter(|| black_box(all.detect_changes()));
    });

    let mut existence = PollingDetector::new(&file, EventMask::FILE_NAME);
    existence.detect_changes();
    c.bench_function("detect_changes_existence_only", |b| {
        b.iter(|| black_box(existence.detect_changes()));
    });

    let missing = temp_dir.path().join("missing.txt");
    let mut absent = PollingDetector::new(&missing, EventMask::SIZE);
    absent.detect_changes();
    c.bench_function("detect_changes_missing", |b| {
        b.iter(|| black_box(absent.detect_changes()));
    });
}

criterion_group!(benches, bench_queue, bench_detector);
criterion_main!(benches);
