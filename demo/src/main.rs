use log::info;
use pcqueue::{BoundedQueue, ManagedChannel};
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

const CHANNEL_CAPACITY: usize = 10;

fn wait_for_enter(phase: &str) {
    info!("Press Enter to stop the {} phase", phase);
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .expect("Failed to read from stdin");
}

/// Manual threads sharing one queue: a producer, a popping consumer and an
/// iterating consumer.
fn run_manual() {
    let queue = BoundedQueue::new();
    let running = AtomicBool::new(true);
    queue.open();

    thread::scope(|s| {
        s.spawn(|| {
            let mut i = 0u64;
            while running.load(Ordering::Acquire) {
                queue.push(i);
                i += 1;
                thread::sleep(Duration::from_millis(300));
            }
        });

        s.spawn(|| {
            while running.load(Ordering::Acquire) {
                match queue.pop() {
                    Some(v) => info!("{} pop ---- 1 {:?}", v, thread::current().id()),
                    None => break,
                }
                thread::sleep(Duration::from_secs(1));
            }
        });

        s.spawn(|| {
            for v in &queue {
                info!("{} pop ---- 2", v);
                thread::sleep(Duration::from_secs(1));
            }
        });

        wait_for_enter("manual");
        running.store(false, Ordering::Release);
        queue.close();
    });

    info!("Manual phase finished, {:?}", queue.stats());
}

/// The same traffic driven by a managed channel.
fn run_managed() {
    let channel = ManagedChannel::with_capacity(CHANNEL_CAPACITY);
    channel.open();

    let mut i = 0u64;
    channel
        .produce(move || {
            thread::sleep(Duration::from_millis(500));
            i += 1;
            i - 1
        })
        .expect("Failed to spawn producer");

    let mut j = 5000u64;
    channel
        .produce(move || {
            thread::sleep(Duration::from_millis(400));
            j += 1;
            j - 1
        })
        .expect("Failed to spawn producer");

    channel
        .consume(|v| {
            info!("{} pop ---- 3", v);
            thread::sleep(Duration::from_secs(1));
        })
        .expect("Failed to spawn consumer");

    channel
        .consume(|v| {
            info!("{} pop ---- 4", v);
            thread::sleep(Duration::from_millis(800));
        })
        .expect("Failed to spawn consumer");

    wait_for_enter("managed");
    let report = channel.close();

    info!("=== Shutdown Complete ===");
    info!("Tasks joined: {}", report.joined);
    info!("Tasks panicked: {}", report.panicked);
    info!("Items left in queue: {}", channel.len());
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    run_manual();
    run_managed();

    info!("end");
}
