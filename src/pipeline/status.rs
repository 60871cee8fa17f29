// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! State shared between the pipeline and the game-flow code.
//!
//! Game flow only ever toggles the two enable flags and polls the calibration flag, which the
//! pipeline clears once a calibration session commits. A change is picked up at the next frame;
//! being one frame late is harmless, so relaxed atomics are enough.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::pipeline::FrameSignal;

/// The two externally written enable flags.
pub struct StatusFlags {
    audio_command: AtomicBool,
    calibration: AtomicBool,
}

impl StatusFlags {
    pub const fn new() -> Self {
        Self {
            audio_command: AtomicBool::new(false),
            calibration: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn set_audio_command(&self, on: bool) {
        self.audio_command.store(on, Ordering::Relaxed);
    }

    #[inline]
    pub fn audio_command_enabled(&self) -> bool {
        self.audio_command.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_calibration(&self, on: bool) {
        self.calibration.store(on, Ordering::Relaxed);
    }

    #[inline]
    pub fn calibration_enabled(&self) -> bool {
        self.calibration.load(Ordering::Relaxed)
    }
}

impl Default for StatusFlags {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the outside world may touch while the pipeline runs: flags in, frame signal out.
///
/// Usually a `static`; the pipeline borrows it for its whole lifetime.
pub struct ControlSurface {
    pub flags: StatusFlags,
    pub frame_ready: FrameSignal,
}

impl ControlSurface {
    pub const fn new() -> Self {
        Self {
            flags: StatusFlags::new(),
            frame_ready: FrameSignal::new(),
        }
    }

    /// Enable or disable steering by tone.
    #[inline]
    pub fn set_audio_command(&self, on: bool) {
        self.flags.set_audio_command(on);
    }

    /// Start (or withdraw) a calibration session.
    #[inline]
    pub fn set_calibration(&self, on: bool) {
        self.flags.set_calibration(on);
    }

    /// True while a calibration session is requested and not yet committed.
    #[inline]
    pub fn calibration_active(&self) -> bool {
        self.flags.calibration_enabled()
    }
}

impl Default for ControlSurface {
    fn default() -> Self {
        Self::new()
    }
}
