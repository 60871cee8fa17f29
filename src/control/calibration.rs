// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Per-player tone calibration.
//!
//! While a session is running, every frame contributes the strongest bin of the calibration band
//! (if it clears the noise floor). After a fixed number of valid peaks the integer mean becomes the
//! player's target bin. There is no timeout; silent frames simply do not count.

use log::{debug, info};

use crate::audio::find_peak;
use crate::config::CalibrationConfig;

/// Operating mode of the calibrator.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CalibrationMode {
    Idle,
    Calibrating,
}

/// What a single [`Calibrator::step`] did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CalibrationEvent {
    /// No session running.
    Idle,
    /// Session running, nothing above the noise floor this frame.
    NoPeak,
    /// A valid peak was added to the running mean.
    Sampled { bin: usize, count: u32 },
    /// The session completed and `target_bin` was updated.
    Committed { target_bin: usize },
    /// The enable flag was withdrawn before the session completed.
    Abandoned,
}

/// Calibration state and configuration.
#[derive(Clone, Debug)]
pub struct Calibrator {
    config: CalibrationConfig,
    threshold: f32,
    mode: CalibrationMode,

    running_sum: u32,
    sample_count: u32,

    /// Last committed target (persists across sessions).
    target_bin: usize,
}

impl Calibrator {
    pub const fn new(config: CalibrationConfig, threshold: f32) -> Self {
        Self {
            config,
            threshold,
            mode: CalibrationMode::Idle,
            running_sum: 0,
            sample_count: 0,
            target_bin: config.initial_target_bin,
        }
    }

    #[inline]
    pub fn mode(&self) -> CalibrationMode {
        self.mode
    }

    #[inline]
    pub fn target_bin(&self) -> usize {
        self.target_bin
    }

    #[inline]
    pub fn running_sum(&self) -> u32 {
        self.running_sum
    }

    #[inline]
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Advance by one frame.
    ///
    /// `enabled` is the externally owned calibration flag as read at the start of the cycle. The
    /// caller must clear that flag when this returns [`CalibrationEvent::Committed`].
    pub fn step(&mut self, enabled: bool, spectrum: &[f32]) -> CalibrationEvent {
        match (self.mode, enabled) {
            (CalibrationMode::Idle, false) => return CalibrationEvent::Idle,
            (CalibrationMode::Calibrating, false) => {
                debug!(
                    "calibration abandoned after {} of {} samples",
                    self.sample_count, self.config.samples
                );
                self.clear_session();
                self.mode = CalibrationMode::Idle;
                return CalibrationEvent::Abandoned;
            }
            (CalibrationMode::Idle, true) => {
                info!("calibration started");
                self.clear_session();
                self.mode = CalibrationMode::Calibrating;
            }
            (CalibrationMode::Calibrating, true) => {}
        }

        let Some(peak) = find_peak(
            spectrum,
            self.config.min_bin..=self.config.max_bin,
            self.threshold,
        ) else {
            return CalibrationEvent::NoPeak;
        };

        self.running_sum += peak.bin as u32;
        self.sample_count += 1;

        if self.sample_count < self.config.samples {
            return CalibrationEvent::Sampled {
                bin: peak.bin,
                count: self.sample_count,
            };
        }

        self.target_bin = (self.running_sum / self.sample_count) as usize;
        self.clear_session();
        self.mode = CalibrationMode::Idle;
        info!("calibration committed target bin {}", self.target_bin);

        CalibrationEvent::Committed {
            target_bin: self.target_bin,
        }
    }

    fn clear_session(&mut self) {
        self.running_sum = 0;
        self.sample_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const N: usize = 64;

    fn spectrum_with_peak(bin: usize, magnitude: f32) -> [f32; N] {
        let mut s = [0.0; N];
        s[bin] = magnitude;
        s
    }

    fn calibrator(samples: u32) -> Calibrator {
        Calibrator::new(CalibrationConfig::new().with_samples(samples), 10_000.0)
    }

    #[test]
    fn converges_on_constant_peak() {
        let mut cal = calibrator(40);
        let s = spectrum_with_peak(12, 50_000.0);

        for i in 1..40 {
            assert_eq!(
                cal.step(true, &s),
                CalibrationEvent::Sampled { bin: 12, count: i }
            );
            assert_eq!(cal.mode(), CalibrationMode::Calibrating);
        }
        assert_eq!(
            cal.step(true, &s),
            CalibrationEvent::Committed { target_bin: 12 }
        );
        assert_eq!(cal.target_bin(), 12);
        assert_eq!(cal.running_sum(), 0);
        assert_eq!(cal.sample_count(), 0);
        assert_eq!(cal.mode(), CalibrationMode::Idle);
    }

    #[test]
    fn mean_uses_integer_division() {
        let mut cal = calibrator(3);
        cal.step(true, &spectrum_with_peak(10, 20_000.0));
        cal.step(true, &spectrum_with_peak(11, 20_000.0));
        assert_eq!(
            cal.step(true, &spectrum_with_peak(11, 20_000.0)),
            CalibrationEvent::Committed { target_bin: 10 }
        );
    }

    #[test]
    fn frames_below_noise_floor_do_not_count() {
        let mut cal = calibrator(2);
        let quiet = spectrum_with_peak(12, 9_999.0);
        for _ in 0..10 {
            assert_eq!(cal.step(true, &quiet), CalibrationEvent::NoPeak);
        }
        assert_eq!(cal.sample_count(), 0);
        assert_eq!(cal.target_bin(), 15);
    }

    #[test]
    fn peaks_outside_band_are_ignored() {
        let mut cal = calibrator(2);
        // Band is 8..=22 by default.
        assert_eq!(
            cal.step(true, &spectrum_with_peak(30, 90_000.0)),
            CalibrationEvent::NoPeak
        );
        assert_eq!(
            cal.step(true, &spectrum_with_peak(7, 90_000.0)),
            CalibrationEvent::NoPeak
        );
    }

    #[test]
    fn idle_when_disabled() {
        let mut cal = calibrator(1);
        assert_eq!(
            cal.step(false, &spectrum_with_peak(12, 50_000.0)),
            CalibrationEvent::Idle
        );
        assert_eq!(cal.target_bin(), 15);
    }

    #[test]
    fn withdrawn_flag_abandons_and_next_session_starts_clean() {
        let mut cal = calibrator(4);
        let s = spectrum_with_peak(20, 50_000.0);
        cal.step(true, &s);
        cal.step(true, &s);
        assert_eq!(cal.step(false, &s), CalibrationEvent::Abandoned);
        assert_eq!(cal.sample_count(), 0);
        assert_eq!(cal.target_bin(), 15);

        let t = spectrum_with_peak(9, 50_000.0);
        for _ in 0..3 {
            cal.step(true, &t);
        }
        assert_eq!(
            cal.step(true, &t),
            CalibrationEvent::Committed { target_bin: 9 }
        );
    }

    #[test]
    fn target_persists_across_sessions() {
        let mut cal = calibrator(1);
        cal.step(true, &spectrum_with_peak(18, 50_000.0));
        assert_eq!(cal.target_bin(), 18);
        assert_eq!(cal.step(false, &[0.0; N]), CalibrationEvent::Idle);
        assert_eq!(cal.target_bin(), 18);
    }
}
