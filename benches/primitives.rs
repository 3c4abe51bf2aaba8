//! Benchmarks for the core primitives.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use taskmill::prelude::*;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn bench_queue_push_pop(c: &mut Criterion) {
    let queue = Queue::new(1024);

    c.bench_function("queue_push_pop_1k", |b| {
        b.iter(|| {
            for n in 0..1000u64 {
                queue.push(black_box(n)).unwrap();
            }
            for _ in 0..1000 {
                black_box(queue.pop_wait().unwrap());
            }
        });
    });
}

fn bench_pool_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_drain_1k");

    for workers in [1usize, 2, 4].iter() {
        group.bench_with_input(
            BenchmarkId::new("workers", workers),
            workers,
            |b, &workers| {
                b.iter(|| {
                    let queue = Arc::new(Queue::new(1024));
                    let done = Arc::new(AtomicUsize::new(0));
                    let pool = {
                        let done = done.clone();
                        WorkerPool::new(workers, queue.clone(), move |_token, n: u64| {
                            black_box(n);
                            done.fetch_add(1, Ordering::Relaxed);
                            Ok(())
                        })
                    };
                    pool.run(&CancelToken::new()).unwrap();

                    for n in 0..1000u64 {
                        queue.push(n).unwrap();
                    }
                    queue.close();
                    while done.load(Ordering::Relaxed) != 1000 {
                        std::hint::spin_loop();
                    }
                    pool.close();
                });
            },
        );
    }

    group.finish();
}

fn bench_semaphore_cycle(c: &mut Criterion) {
    let sem = Semaphore::new(8);

    c.bench_function("semaphore_acquire_release", |b| {
        b.iter(|| {
            sem.acquire().unwrap();
            sem.release();
        });
    });
}

fn bench_promise_roundtrip(c: &mut Criterion) {
    c.bench_function("promise_spawn_wait", |b| {
        b.iter(|| {
            taskmill::promise::spawn(|| black_box(42u64))
                .wait()
                .unwrap()
        });
    });
}

fn bench_buffer_reuse(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_acquire");

    group.bench_function("pooled", |b| {
        let pool = BufferPool::new(4096);
        pool.put(pool.get());
        b.iter(|| {
            let buf = pool.get();
            black_box(&buf);
            pool.put(buf);
        });
    });

    group.bench_function("fresh", |b| {
        b.iter(|| {
            let buf: Vec<u8> = Vec::with_capacity(4096);
            black_box(&buf);
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_queue_push_pop,
    bench_pool_drain,
    bench_semaphore_cycle,
    bench_promise_roundtrip,
    bench_buffer_reuse
);
criterion_main!(benches);
