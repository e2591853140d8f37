//! Benchmarks for symlink-walker
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::path::{Path, PathBuf};

fn benchmark_queue_operations(c: &mut Criterion) {
    use symlink_walker::walker::queue::{ScanTask, TaskQueue};

    c.bench_function("queue_push_pop", |b| {
        let queue = TaskQueue::new(1);
        let root = ScanTask::root(PathBuf::from("/test"));

        b.iter(|| {
            queue.push(root.child(PathBuf::from("/test/path")));
            let received = queue.next_task().unwrap();
            black_box(received);
        })
    });
}

fn benchmark_link_resolution(c: &mut Criterion) {
    use symlink_walker::classify::resolve_link;

    c.bench_function("resolve_relative_link", |b| {
        let link = Path::new("/srv/releases/42/lib/python3/site-packages/pkg/link");

        b.iter(|| {
            let resolved = resolve_link(black_box(link), Path::new("../../../../shared/./pkg/../lib"));
            black_box(resolved);
        })
    });
}

#[cfg(unix)]
fn benchmark_directory_search(c: &mut Criterion) {
    use std::fs;
    use std::os::unix::fs::symlink;
    use std::sync::Arc;
    use symlink_walker::{MatchCollector, MatchPolicy, SearchConfig, SearchCoordinator};

    let dir = tempfile::tempdir().unwrap();
    let base = fs::canonicalize(dir.path()).unwrap();
    let target = base.join("target");
    fs::write(&target, b"").unwrap();
    let root = base.join("root");
    for i in 0..50 {
        let sub = root.join(format!("d{}", i));
        fs::create_dir_all(&sub).unwrap();
        for j in 0..20 {
            symlink("/elsewhere", sub.join(format!("l{}", j))).unwrap();
        }
        symlink(&target, sub.join("ref")).unwrap();
    }

    c.bench_function("search_50_dirs", |b| {
        b.iter(|| {
            let config = SearchConfig::new(&target, &root)
                .with_workers(4)
                .with_policy(MatchPolicy::All);
            let collector = Arc::new(MatchCollector::new());
            SearchCoordinator::new(config)
                .unwrap()
                .run(collector.clone())
                .unwrap();
            black_box(collector.len());
        })
    });
}

#[cfg(not(unix))]
fn benchmark_directory_search(_c: &mut Criterion) {}

criterion_group!(
    benches,
    benchmark_queue_operations,
    benchmark_link_resolution,
    benchmark_directory_search
);
criterion_main!(benches);
