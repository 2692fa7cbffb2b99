use std::sync::{Arc, Barrier};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use pcqueue::{BoundedQueue, QueueState};

fn opened<T>(capacity: usize) -> Arc<BoundedQueue<T>> {
    let queue = Arc::new(BoundedQueue::with_capacity(capacity));
    queue.open();
    queue
}

#[test]
fn single_producer_single_consumer_keeps_fifo() {
    let queue = opened(8);

    let producer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            for i in 0..10_000u32 {
                queue.push(i);
            }
        })
    };

    let received: Vec<u32> = (0..10_000).map(|_| queue.pop().unwrap()).collect();
    producer.join().unwrap();

    assert_eq!(received, (0..10_000).collect::<Vec<_>>());
}

#[test]
fn capacity_is_never_exceeded() {
    const CAPACITY: usize = 3;
    let queue = opened(CAPACITY);
    let done = Arc::new(AtomicBool::new(false));

    let watcher = {
        let queue = Arc::clone(&queue);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut max_seen = 0;
            while !done.load(Ordering::SeqCst) {
                max_seen = max_seen.max(queue.len());
            }
            max_seen
        })
    };

    let producers: Vec<_> = (0..4)
        .map(|p| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..500u32 {
                    queue.push(p * 1000 + i);
                }
            })
        })
        .collect();

    let mut received = 0;
    while received < 4 * 500 {
        assert!(queue.pop().is_some());
        received += 1;
    }

    for producer in producers {
        producer.join().unwrap();
    }
    done.store(true, Ordering::SeqCst);

    let max_seen = watcher.join().unwrap();
    assert!(max_seen <= CAPACITY, "observed {max_seen} items in a queue of {CAPACITY}");
}

#[test]
fn per_producer_order_survives_interleaving() {
    let queue = opened(16);
    let producers: Vec<_> = (0..3u32)
        .map(|p| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..1000u32 {
                    queue.push((p, i));
                }
            })
        })
        .collect();

    let mut last = [None::<u32>; 3];
    for _ in 0..3000 {
        let (p, i) = queue.pop().unwrap();
        if let Some(prev) = last[p as usize] {
            assert!(i > prev);
        }
        last[p as usize] = Some(i);
    }

    for producer in producers {
        producer.join().unwrap();
    }
    assert!(queue.is_empty());
}

#[test]
fn close_wakes_every_blocked_pop() {
    let queue: Arc<BoundedQueue<u32>> = opened(0);
    let (tx, rx) = mpsc::channel();

    let waiters: Vec<_> = (0..8)
        .map(|_| {
            let queue = Arc::clone(&queue);
            let tx = tx.clone();
            thread::spawn(move || {
                tx.send(queue.pop()).unwrap();
            })
        })
        .collect();
    drop(tx);

    thread::sleep(Duration::from_millis(50));
    queue.close();

    for _ in 0..8 {
        let result = rx.recv_timeout(Duration::from_secs(5)).expect("waiter still blocked");
        assert_eq!(result, None);
    }
    for waiter in waiters {
        waiter.join().unwrap();
    }
}

#[test]
fn close_wakes_every_blocked_push() {
    let queue = opened(1);
    queue.push(0u32);

    let pushers: Vec<_> = (1..=5u32)
        .map(|i| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.push(i))
        })
        .collect();

    thread::sleep(Duration::from_millis(50));
    queue.close();
    for pusher in pushers {
        pusher.join().unwrap();
    }

    assert_eq!(queue.len(), 1);
    assert_eq!(queue.stats().dropped, 5);
}

#[test]
fn second_push_waits_for_first_pop() {
    let queue = opened(1);
    let second_done = Arc::new(AtomicBool::new(false));

    let producer = {
        let queue = Arc::clone(&queue);
        let second_done = Arc::clone(&second_done);
        thread::spawn(move || {
            queue.push(1);
            queue.push(2);
            second_done.store(true, Ordering::SeqCst);
        })
    };

    thread::sleep(Duration::from_millis(50));
    assert!(!second_done.load(Ordering::SeqCst));
    assert_eq!(queue.len(), 1);

    assert_eq!(queue.pop(), Some(1));
    assert_eq!(queue.pop(), Some(2));
    producer.join().unwrap();
    assert!(second_done.load(Ordering::SeqCst));
}

#[test]
fn pop_on_closed_empty_queue_returns_immediately() {
    let queue: BoundedQueue<String> = BoundedQueue::new();
    queue.open();
    queue.close();

    let start = Instant::now();
    assert_eq!(queue.pop(), None);
    assert!(start.elapsed() < Duration::from_millis(100));
    assert_eq!(queue.state(), QueueState::Closed);
}

#[test]
fn reopen_does_not_keep_earlier_waiters_blocked() {
    let queue: Arc<BoundedQueue<u32>> = opened(0);
    let returned = Arc::new(AtomicUsize::new(0));
    let started = Arc::new(Barrier::new(5));

    let waiters: Vec<_> = (0..4)
        .map(|_| {
            let queue = Arc::clone(&queue);
            let returned = Arc::clone(&returned);
            let started = Arc::clone(&started);
            thread::spawn(move || {
                started.wait();
                let item = queue.pop();
                returned.fetch_add(1, Ordering::SeqCst);
                item
            })
        })
        .collect();

    started.wait();
    thread::sleep(Duration::from_millis(100));
    queue.close();
    queue.open();

    for waiter in waiters {
        assert_eq!(waiter.join().unwrap(), None);
    }
    assert_eq!(returned.load(Ordering::SeqCst), 4);

    // new callers use the re-opened queue normally
    queue.push(9);
    assert_eq!(queue.pop(), Some(9));
}

#[test]
fn iterator_drains_concurrent_producers() {
    let queue = opened(4);
    let producers: Vec<_> = (0..4u64)
        .map(|p| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..250u64 {
                    queue.push(p * 250 + i);
                }
            })
        })
        .collect();

    let closer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            for producer in producers {
                producer.join().unwrap();
            }
            while !queue.is_empty() {
                thread::sleep(Duration::from_millis(1));
            }
            queue.close();
        })
    };

    let sum: u64 = queue.iter().sum();
    closer.join().unwrap();
    assert_eq!(sum, (0..1000u64).sum());
}
