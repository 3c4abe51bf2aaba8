use taskmill::prelude::*;

use std::thread;
use std::time::Duration;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .init();

    println!("=== Error Group Example ===\n");

    let (group, token) = ErrorGroup::with_cancel(&CancelToken::new());
    group.set_limit(4);

    // well-behaved workers that notice cancellation
    for id in 0..6 {
        let token = token.clone();
        group.go(move || {
            for step in 0..10 {
                if token.is_cancelled() {
                    println!("  worker {id} stopping early at step {step}");
                    return Ok(());
                }
                thread::sleep(Duration::from_millis(20));
            }
            println!("  worker {id} finished all steps");
            Ok(())
        });
    }

    // one of them fails partway through
    group.go(|| {
        thread::sleep(Duration::from_millis(70));
        Err(Error::task_failed("disk went away"))
    });

    // and one panics, which the group turns into a plain error
    group.go(|| {
        thread::sleep(Duration::from_millis(90));
        panic!("unexpected state");
    });

    match group.wait() {
        Ok(()) => println!("\nall tasks succeeded"),
        Err(err) => {
            println!("\nfirst failure: {err}");
            println!("was it a panic? {}", err.is_panic());
        }
    }
    println!("token cancelled: {}", token.is_cancelled());

    println!("\n=== Example Complete ===");
}
