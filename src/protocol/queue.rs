// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Lock-free byte queue between the USART receive interrupt and the host-link loop.
//!
//! Single producer, single consumer, fixed capacity and no allocation. The producer never blocks:
//! a byte that does not fit is dropped and counted, and so is a gap reported by the UART itself.
//! Once a gap is recorded the queue refuses further bytes until the consumer has drained it, so
//! [`ByteQueue::pop`] reports the gap exactly where it happened in the stream.

use core::sync::atomic::{AtomicU32, AtomicU8, AtomicUsize, Ordering};

/// One item taken off a [`ByteQueue`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Received {
    Byte(u8),
    /// Bytes and receive errors lost at this point of the stream.
    Gap(u32),
}

pub struct ByteQueue<const N: usize> {
    buf: [AtomicU8; N],
    /// Total bytes pushed (producer side).
    head: AtomicUsize,
    /// Total bytes popped (consumer side).
    tail: AtomicUsize,
    lost: AtomicU32,
}

impl<const N: usize> ByteQueue<N> {
    pub const fn new() -> Self {
        const EMPTY: AtomicU8 = AtomicU8::new(0);
        Self {
            buf: [EMPTY; N],
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            lost: AtomicU32::new(0),
        }
    }

    /// Append `byte`. Returns `false` (and counts a loss) when the queue is full or a gap is
    /// still waiting to be popped.
    pub fn push(&self, byte: u8) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        if head.wrapping_sub(tail) >= N || self.lost.load(Ordering::Relaxed) > 0 {
            self.mark_lost();
            return false;
        }
        self.buf[head % N].store(byte, Ordering::Relaxed);
        self.head.store(head.wrapping_add(1), Ordering::Release);
        true
    }

    /// Record a gap in the byte stream that happened before the queue (e.g. a UART overrun).
    #[inline]
    pub fn mark_lost(&self) {
        self.lost.fetch_add(1, Ordering::Release);
    }

    /// Oldest queued byte, or the pending gap once every byte before it has been popped.
    pub fn pop(&self) -> Option<Received> {
        let tail = self.tail.load(Ordering::Relaxed);
        // While a gap is pending the producer pushes nothing, so `head` read after it is final.
        let lost = self.lost.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        if tail != head {
            let byte = self.buf[tail % N].load(Ordering::Relaxed);
            self.tail.store(tail.wrapping_add(1), Ordering::Release);
            return Some(Received::Byte(byte));
        }
        if lost == 0 {
            return None;
        }
        Some(Received::Gap(self.lost.swap(0, Ordering::AcqRel)))
    }

    #[inline]
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        head.wrapping_sub(tail)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<const N: usize> Default for ByteQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::vec::Vec;

    use Received::{Byte, Gap};

    #[test]
    fn fifo_order_across_wraparound() {
        let queue = ByteQueue::<4>::new();
        for round in 0..5u8 {
            assert!(queue.push(round));
            assert!(queue.push(round + 100));
            assert_eq!(queue.len(), 2);
            assert_eq!(queue.pop(), Some(Byte(round)));
            assert_eq!(queue.pop(), Some(Byte(round + 100)));
        }
        assert!(queue.is_empty());
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn full_queue_drops_and_reports_gap_after_queued_bytes() {
        let queue = ByteQueue::<3>::new();
        assert!(queue.push(1));
        assert!(queue.push(2));
        assert!(queue.push(3));
        assert!(!queue.push(4));
        assert!(!queue.push(5));

        assert_eq!(queue.pop(), Some(Byte(1)));
        // Room again, but the gap has not been popped yet.
        assert!(!queue.push(6));
        assert_eq!(queue.pop(), Some(Byte(2)));
        assert_eq!(queue.pop(), Some(Byte(3)));
        assert_eq!(queue.pop(), Some(Gap(3)));
        assert_eq!(queue.pop(), None);

        assert!(queue.push(7));
        assert_eq!(queue.pop(), Some(Byte(7)));
    }

    #[test]
    fn external_gap_lands_between_bytes() {
        let queue = ByteQueue::<8>::new();
        queue.push(1);
        queue.mark_lost();
        assert!(!queue.push(2));

        assert_eq!(queue.pop(), Some(Byte(1)));
        assert_eq!(queue.pop(), Some(Gap(2)));
        assert!(queue.push(3));
        assert_eq!(queue.pop(), Some(Byte(3)));
    }

    #[test]
    fn bytes_cross_threads_in_order() {
        const CAPACITY: usize = 16;
        let queue = ByteQueue::<CAPACITY>::new();
        let sent: Vec<u8> = (0..2000u32).map(|i| (i % 251) as u8).collect();

        let received = thread::scope(|s| {
            s.spawn(|| {
                for &b in &sent {
                    while queue.len() >= CAPACITY {
                        thread::yield_now();
                    }
                    assert!(queue.push(b));
                }
            });

            let mut received = Vec::with_capacity(sent.len());
            while received.len() < sent.len() {
                match queue.pop() {
                    Some(Byte(b)) => received.push(b),
                    Some(Gap(n)) => panic!("unexpected gap of {n}"),
                    None => thread::yield_now(),
                }
            }
            received
        });

        assert_eq!(received, sent);
    }
}
