//! PacketQueue tests
//!
//! FIFO ordering, blocking pop, and the open/close lifecycle used by
//! connect/disconnect cycles.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use streamhub::packet::Packet;
use streamhub::queue::PacketQueue;

fn packet(byte: u8) -> Packet {
    Packet::from_buffer(vec![byte])
}

#[test]
fn test_queue_starts_closed_and_empty() {
    let queue = PacketQueue::new();
    assert!(!queue.is_open());
    assert_eq!(queue.len(), 0);
    // Closed and empty: pop returns immediately instead of blocking
    assert!(queue.pop().is_none());
}

#[test]
fn test_fifo_order() {
    let queue = PacketQueue::new();
    queue.reopen();
    queue.push(packet(1));
    queue.push(packet(2));
    queue.push(packet(3));

    assert_eq!(queue.len(), 3);
    assert_eq!(queue.pop().unwrap().buffer().as_ref(), &[1]);
    assert_eq!(queue.pop().unwrap().buffer().as_ref(), &[2]);
    assert_eq!(queue.pop().unwrap().buffer().as_ref(), &[3]);
    assert!(queue.is_empty());
}

#[test]
fn test_try_pop_never_blocks() {
    let queue = PacketQueue::new();
    queue.reopen();
    assert!(queue.try_pop().is_none());
    queue.push(packet(7));
    assert!(queue.try_pop().is_some());
}

#[test]
fn test_pop_blocks_until_push() {
    let queue = Arc::new(PacketQueue::new());
    queue.reopen();

    let producer_queue = Arc::clone(&queue);
    let producer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        producer_queue.push(packet(42));
    });

    let received = queue.pop().expect("pop should return the pushed packet");
    assert_eq!(received.buffer().as_ref(), &[42]);
    producer.join().unwrap();
}

#[test]
fn test_close_wakes_blocked_consumer() {
    let queue = Arc::new(PacketQueue::new());
    queue.reopen();

    let consumer_queue = Arc::clone(&queue);
    let consumer = thread::spawn(move || consumer_queue.pop());

    thread::sleep(Duration::from_millis(50));
    queue.close();

    assert!(consumer.join().unwrap().is_none());
}

#[test]
fn test_closed_queue_drains_remaining_items() {
    let queue = PacketQueue::new();
    queue.reopen();
    queue.push(packet(1));
    queue.push(packet(2));
    queue.close();

    assert!(queue.pop().is_some());
    assert!(queue.pop().is_some());
    assert!(queue.pop().is_none());
}

#[test]
fn test_clear_discards_everything() {
    let queue = PacketQueue::new();
    queue.reopen();
    queue.push(packet(1));
    queue.push(packet(2));
    queue.clear();
    assert_eq!(queue.len(), 0);
}

#[test]
fn test_reopen_after_close() {
    let queue = PacketQueue::new();
    queue.reopen();
    queue.close();
    assert!(queue.pop().is_none());

    queue.reopen();
    queue.push(packet(9));
    assert!(queue.pop().is_some());
}
