// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Closed-loop steering toward the player's tone.
//!
//! The controller looks for the strongest bin in a narrow window around the calibrated target bin.
//! The offset of that peak from the target is the steering error: a peak below the target slows
//! the left wheel, a peak above it slows the right wheel. Losing the tone stops the robot.
//!
//! Typical usage pattern:
//!
//! ```no_run
//! # use tonefollow::control::SteeringController;
//! # use tonefollow::config::SteeringConfig;
//! # let spectrum = [0.0f32; 1024];
//! let mut steering = SteeringController::new(SteeringConfig::new(), 10_000.0);
//!
//! let command = steering.step(true, 15, &spectrum);
//! ```

use log::debug;
use micromath::F32Ext;

use crate::audio::{find_peak, Peak};
use crate::config::SteeringConfig;
use crate::control::Pid;
use crate::motors::WheelCommand;

/// Operating mode of the steering controller, re-evaluated every frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SteeringMode {
    /// Command disabled or no tone in the window: wheels stopped.
    Disabled,
    /// Following a detected peak.
    Tracking,
}

/// Controller state and configuration.
#[derive(Clone, Debug)]
pub struct SteeringController {
    config: SteeringConfig,
    threshold: f32,
    pid: Pid,
    mode: SteeringMode,
    last_peak: Option<Peak>,
}

impl SteeringController {
    /// Create a controller from its gains and the shared noise floor.
    pub fn new(config: SteeringConfig, threshold: f32) -> Self {
        let pid = Pid::new(config.kp, config.ki, config.kd)
            .with_integral_limit(config.integral_limit());
        Self {
            config,
            threshold,
            pid,
            mode: SteeringMode::Disabled,
            last_peak: None,
        }
    }

    #[inline]
    pub fn mode(&self) -> SteeringMode {
        self.mode
    }

    #[inline]
    pub fn integral(&self) -> f32 {
        self.pid.integral()
    }

    #[inline]
    pub fn previous_error(&self) -> f32 {
        self.pid.previous_error()
    }

    /// Peak tracked on the last step, if any.
    #[inline]
    pub fn last_peak(&self) -> Option<Peak> {
        self.last_peak
    }

    /// Run one control step on the combined spectrum of the current frame.
    pub fn step(&mut self, enabled: bool, target_bin: usize, spectrum: &[f32]) -> WheelCommand {
        let hb = self.config.half_bandwidth;
        let peak = if enabled {
            find_peak(
                spectrum,
                target_bin.saturating_sub(hb)..=target_bin + hb,
                self.threshold,
            )
        } else {
            None
        };
        self.last_peak = peak;

        let Some(peak) = peak else {
            self.set_mode(SteeringMode::Disabled);
            self.pid.reset_integral();
            return WheelCommand::STOP;
        };
        self.set_mode(SteeringMode::Tracking);

        let base = self.config.base_speed;
        let error = peak.bin as f32 - target_bin as f32;
        let raw = self.pid.update(error);

        if error.abs() < self.config.error_threshold {
            self.pid.reset_integral();
            WheelCommand::straight(base)
        } else if error < 0.0 {
            // Tone below target: turn left.
            WheelCommand::new(base + raw, base)
        } else {
            WheelCommand::new(base, base - raw)
        }
    }

    fn set_mode(&mut self, mode: SteeringMode) {
        if self.mode != mode {
            debug!("steering {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }
}
