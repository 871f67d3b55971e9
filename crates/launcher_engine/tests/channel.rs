use std::thread;

use launcher_engine::MessageChannel;

#[test]
fn concurrent_push_and_drain_keep_order_without_loss() {
    let channel = MessageChannel::new();
    let producer = channel.clone();
    let expected: Vec<String> = (0..5_000).map(|i| format!("line {i}")).collect();
    let to_push = expected.clone();

    let worker = thread::spawn(move || {
        for line in to_push {
            producer.push(line);
        }
    });

    let mut received = Vec::new();
    while !worker.is_finished() {
        received.extend(channel.drain_all());
        thread::yield_now();
    }
    worker.join().unwrap();
    received.extend(channel.drain_all());

    assert_eq!(received.len(), expected.len());
    assert!(received == expected, "lines were lost, duplicated or reordered");
}

#[test]
fn drain_after_all_pushes_returns_exact_sequence() {
    let channel = MessageChannel::new();
    for line in ["m1", "m2", "m3"] {
        channel.push(line);
    }
    assert_eq!(channel.drain_all(), ["m1", "m2", "m3"]);
    assert!(channel.drain_all().is_empty());
}
