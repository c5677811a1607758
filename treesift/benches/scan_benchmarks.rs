use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::fs;
use std::io;
use std::num::NonZeroUsize;
use tempfile::TempDir;
use treesift::{scan_with_writer, OutputMode, ScanOptions};

fn create_tree(files: usize, lines: usize) -> TempDir {
    let dir = TempDir::new().unwrap();
    for i in 0..files {
        let mut content = String::new();
        for j in 0..lines {
            if j % 10 == 0 {
                content.push_str(&format!("line {} carries the needle marker\n", j));
            } else {
                content.push_str(&format!("line {} is plain text payload\n", j));
            }
        }
        fs::write(dir.path().join(format!("file_{:03}.txt", i)), content).unwrap();
    }
    dir
}

fn run(opts: ScanOptions) {
    let config = opts.compile().unwrap();
    black_box(scan_with_writer(&config, Box::new(io::sink())).unwrap());
}

fn bench_accept_or(c: &mut Criterion) {
    let dir = create_tree(20, 100);
    c.bench_function("accept_or_single_pattern", |b| {
        b.iter(|| {
            run(ScanOptions {
                accept_or: vec!["needle".to_string()],
                output: OutputMode::None,
                roots: vec![dir.path().to_path_buf()],
                ..Default::default()
            })
        })
    });
}

fn bench_accept_and(c: &mut Criterion) {
    let dir = create_tree(20, 100);
    c.bench_function("accept_and_cumulative", |b| {
        b.iter(|| {
            run(ScanOptions {
                accept_and: vec![
                    "needle".to_string(),
                    "payload".to_string(),
                    r"line \d+".to_string(),
                ],
                output: OutputMode::None,
                roots: vec![dir.path().to_path_buf()],
                ..Default::default()
            })
        })
    });
}

fn bench_name_filtered(c: &mut Criterion) {
    let dir = create_tree(50, 50);
    c.bench_function("include_exclude_filters", |b| {
        b.iter(|| {
            run(ScanOptions {
                accept_or: vec!["needle".to_string()],
                include_or: vec![r"\.txt$".to_string()],
                exclude_or: vec!["file_00".to_string()],
                output: OutputMode::None,
                roots: vec![dir.path().to_path_buf()],
                ..Default::default()
            })
        })
    });
}

fn bench_job_scaling(c: &mut Criterion) {
    let dir = create_tree(50, 200);
    let mut group = c.benchmark_group("job_scaling");
    for jobs in [1, 2, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(jobs), &jobs, |b, &jobs| {
            b.iter(|| {
                run(ScanOptions {
                    accept_or: vec!["needle".to_string()],
                    max_jobs: NonZeroUsize::new(jobs).unwrap(),
                    output: OutputMode::None,
                    roots: vec![dir.path().to_path_buf()],
                    ..Default::default()
                })
            })
        });
    }
    group.finish();
}

fn bench_tree_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_size");
    for files in [10, 100, 500] {
        let dir = create_tree(files, 50);
        group.bench_with_input(BenchmarkId::from_parameter(files), &files, |b, _| {
            b.iter(|| {
                run(ScanOptions {
                    accept_or: vec!["needle".to_string()],
                    output: OutputMode::None,
                    roots: vec![dir.path().to_path_buf()],
                    ..Default::default()
                })
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_accept_or,
    bench_accept_and,
    bench_name_filtered,
    bench_job_scaling,
    bench_tree_size
);
criterion_main!(benches);
