use taskmill::prelude::*;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .init();

    println!("=== Worker Pool Pipeline Example ===\n");

    let queue = Arc::new(Queue::new(8));
    let buffers = Arc::new(BufferPool::new(256));
    let processed = Arc::new(AtomicUsize::new(0));

    let pool = {
        let buffers = buffers.clone();
        let processed = processed.clone();
        WorkerPool::new(3, queue.clone(), move |token, chunk: Vec<u8>| {
            if token.is_cancelled() {
                // drain fast once the run is cancelled
                return Ok(());
            }
            let mut buf = buffers.get();
            buf.extend_from_slice(&chunk);
            buf.reverse();
            processed.fetch_add(1, Ordering::SeqCst);
            buffers.put(buf);
            Ok(())
        })
    }
    .named("pipeline");

    let token = CancelToken::new();
    pool.run(&token).expect("failed to start workers");

    // a scheduled heartbeat alongside the pipeline
    let heartbeat = {
        let processed = processed.clone();
        Arc::new(ScheduledExecutor::new(Duration::from_millis(100), move || {
            println!("  processed so far: {}", processed.load(Ordering::SeqCst));
        }))
    };
    let heartbeat_runner = {
        let heartbeat = heartbeat.clone();
        thread::spawn(move || heartbeat.execute())
    };

    for n in 0..32u8 {
        let chunk = vec![n; 64];
        queue.push(chunk).expect("queue closed early");
    }

    queue.close();
    queue.wait_empty();
    pool.close();
    heartbeat.close();
    heartbeat_runner.join().expect("heartbeat thread panicked");

    println!("\nprocessed {} chunks", processed.load(Ordering::SeqCst));
    println!("buffers waiting for reuse: {}", buffers.pooled());

    println!("\n=== Example Complete ===");
}
