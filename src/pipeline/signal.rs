// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Single-slot "frame ready" notification.
//!
//! The pipeline bumps a sequence number every time a frame has been analysed. A [`Subscriber`]
//! remembers the last sequence number it consumed and only ever learns about the newest frame:
//! frames published while it was busy are skipped, never queued.

use core::sync::atomic::{AtomicU32, Ordering};

/// Latest-only frame notification, safe to share between interrupt and thread context.
pub struct FrameSignal {
    sequence: AtomicU32,
}

impl FrameSignal {
    pub const fn new() -> Self {
        Self {
            sequence: AtomicU32::new(0),
        }
    }

    /// Announce a new frame and return its sequence number.
    #[inline]
    pub fn publish(&self) -> u32 {
        self.sequence.fetch_add(1, Ordering::Release).wrapping_add(1)
    }

    /// Sequence number of the most recent frame (0 before the first one).
    #[inline]
    pub fn latest(&self) -> u32 {
        self.sequence.load(Ordering::Acquire)
    }

    /// Start listening. Frames published before this call are not reported.
    pub fn subscribe(&self) -> Subscriber<'_> {
        Subscriber {
            signal: self,
            seen: self.latest(),
        }
    }
}

impl Default for FrameSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Consumer side of a [`FrameSignal`].
pub struct Subscriber<'a> {
    signal: &'a FrameSignal,
    seen: u32,
}

impl Subscriber<'_> {
    /// Consume the pending notification, if a frame was published since the last one taken.
    pub fn try_take(&mut self) -> Option<u32> {
        let latest = self.signal.latest();
        if latest == self.seen {
            return None;
        }
        self.seen = latest;
        Some(latest)
    }

    /// Block until the next frame is published. `relax` runs between polls (e.g. `wfi` on the MCU
    /// or a thread yield on a host).
    pub fn wait(&mut self, mut relax: impl FnMut()) -> u32 {
        loop {
            if let Some(seq) = self.try_take() {
                return seq;
            }
            relax();
        }
    }
}
