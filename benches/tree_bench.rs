use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use nstree::Tree;
use rand::Rng;
use std::hint::black_box;
use std::sync::Arc;
use std::thread;

fn populate(tree: &Tree, width: usize) {
    for i in 0..width {
        tree.create(&format!("/{}/", letters(i))).unwrap();
    }
}

fn letters(mut n: usize) -> String {
    let mut out = Vec::new();
    loop {
        out.push(b'a' + u8::try_from(n % 26).unwrap());
        n /= 26;
        if n == 0 {
            break;
        }
        n -= 1;
    }
    out.reverse();
    String::from_utf8(out).unwrap()
}

fn bench_single_threaded(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_threaded");

    group.bench_function("create_remove", |b| {
        let tree = Tree::new();
        b.iter(|| {
            black_box(tree.create("/scratch/").unwrap());
            black_box(tree.remove("/scratch/").unwrap());
        })
    });

    for width in [8_usize, 64, 512] {
        let tree = Tree::new();
        populate(&tree, width);
        group.throughput(Throughput::Elements(width as u64));
        group.bench_with_input(BenchmarkId::new("list_root", width), &tree, |b, tree| {
            b.iter(|| black_box(tree.list("/").unwrap()))
        });
    }

    // A randomized access pattern at the widest tree, so the benchmark
    // isn't just repeatedly warming the cache line for a single child.
    let wide = Tree::new();
    populate(&wide, 512);
    group.bench_function("list_random_child", |b| {
        let mut rng = rand::rng();
        b.iter(|| {
            let name = letters(rng.random_range(0..512));
            black_box(wide.list(&format!("/{name}/")).unwrap())
        })
    });

    group.finish();
}

/// Readers under write contention: several threads repeatedly list the
/// root while one thread churns a sibling folder, exercising the
/// reader/writer hand-off on the same monitor the readers are waiting on.
fn bench_contended(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended");
    group.throughput(Throughput::Elements(1));

    group.bench_function("list_under_writer_churn", |b| {
        let tree = Arc::new(Tree::new());
        populate(&tree, 16);
        tree.create("/churn/").unwrap();
        let stop = Arc::new(std::sync::atomic::AtomicBool::new(false));

        let writer = {
            let tree = Arc::clone(&tree);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let mut i: usize = 0;
                while !stop.load(std::sync::atomic::Ordering::Relaxed) {
                    let name = format!("/churn/{}/", letters(i));
                    let _ = tree.create(&name);
                    let _ = tree.remove(&name);
                    i += 1;
                }
            })
        };

        b.iter(|| black_box(tree.list("/").unwrap()));

        stop.store(true, std::sync::atomic::Ordering::Relaxed);
        writer.join().unwrap();
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .sample_size(200)
        .warm_up_time(std::time::Duration::from_millis(500))
        .measurement_time(std::time::Duration::from_secs(3));
    targets = bench_single_threaded, bench_contended
}
criterion_main!(benches);
