// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Deployment constants and the runtime configuration of the audio pipeline.
//!
//! The frame size and the number of analysed channels are compile-time parameters of
//! [`Pipeline`](crate::pipeline::Pipeline) because they size the scratch buffers. Everything else
//! (frequency band, noise floor, PID gains, speeds) is a field of [`PipelineConfig`] so that it can
//! be tuned per robot and per test.
//!
//! A configuration is checked once with [`PipelineConfig::validate`]; the real-time path assumes a
//! validated configuration and never re-checks indices.

use thiserror::Error;

use crate::audio::{fft, ChannelMap};

// Capture
/// Samples per second per microphone.
pub const SAMPLE_RATE_HZ: u32 = 16_000;
/// Number of interleaved microphones in a capture batch.
pub const MIC_STRIDE: usize = 4;
/// Samples per microphone delivered by one capture callback (10 ms at 16 kHz).
pub const SAMPLES_PER_CALLBACK: usize = 160;
/// Canonical FFT length.
pub const FFT_SIZE: usize = 1024;

// Spectral detection
/// Magnitude a spectral peak must exceed to count as a detection.
pub const MIN_VALUE_THRESHOLD: f32 = 10_000.0;
/// Lowest bin scanned during calibration.
pub const MIN_FREQ_BIN: usize = 8;
/// Highest bin scanned during calibration.
pub const MAX_FREQ_BIN: usize = 22;
/// Target bin used before the first calibration.
pub const MID_FREQ_BIN: usize = 15;
/// Half width of the tracking window around the target bin.
pub const HALF_BANDWIDTH: usize = 5;
/// Valid peaks averaged by one calibration session.
pub const CALIBRATION_SAMPLES: u32 = 40;

// Steering
pub const KP: f32 = 200.0;
pub const KI: f32 = 2.25;
pub const KD: f32 = 2.0;
/// Forward speed in steps/s while following the tone.
pub const BASE_SPEED: f32 = 1100.0;
/// Errors (in bins) below this are treated as "on target".
pub const ERROR_THRESHOLD: f32 = 0.1;
/// Hardware limit of the wheel speed setters, steps/s.
pub const MAX_WHEEL_SPEED: i16 = 1100;

/// Errors reported when a configuration cannot be used with the chosen buffer sizes.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("frame size {0} is not a supported FFT length")]
    UnsupportedFrameSize(usize),

    #[error("at least one analysis channel is required")]
    NoChannels,

    #[error("channel offset {offset} is outside the capture stride {stride}")]
    ChannelOutOfRange { offset: usize, stride: usize },

    #[error("channel offset {0} is mapped more than once")]
    DuplicateChannel(usize),

    #[error("calibration band [{min}, {max}] is inverted")]
    InvertedBand { min: usize, max: usize },

    #[error("bin {bin} is outside the usable half spectrum (< {limit})")]
    BinOutOfRange { bin: usize, limit: usize },

    #[error("initial target bin {target} is outside the calibration band [{min}, {max}]")]
    TargetOutsideBand { target: usize, min: usize, max: usize },

    #[error("calibration needs at least one sample")]
    ZeroCalibrationSamples,

    #[error("{samples} calibration samples overflow the bin sum (at most {max})")]
    TooManyCalibrationSamples { samples: u32, max: u32 },

    #[error("{0} must be finite and non-negative")]
    InvalidParameter(&'static str),
}

/// Calibration band and session length.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CalibrationConfig {
    pub min_bin: usize,
    pub max_bin: usize,
    /// Valid peaks to collect before committing a target bin.
    pub samples: u32,
    /// Target bin in effect until the first session commits.
    pub initial_target_bin: usize,
}

impl CalibrationConfig {
    pub const fn new() -> Self {
        Self {
            min_bin: MIN_FREQ_BIN,
            max_bin: MAX_FREQ_BIN,
            samples: CALIBRATION_SAMPLES,
            initial_target_bin: MID_FREQ_BIN,
        }
    }

    pub const fn with_band(mut self, min_bin: usize, max_bin: usize) -> Self {
        self.min_bin = min_bin;
        self.max_bin = max_bin;
        self
    }

    pub const fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples;
        self
    }

    pub const fn with_initial_target(mut self, bin: usize) -> Self {
        self.initial_target_bin = bin;
        self
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// PID gains and speed shaping of the steering law.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SteeringConfig {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
    pub base_speed: f32,
    pub error_threshold: f32,
    pub half_bandwidth: usize,
}

impl SteeringConfig {
    pub const fn new() -> Self {
        Self {
            kp: KP,
            ki: KI,
            kd: KD,
            base_speed: BASE_SPEED,
            error_threshold: ERROR_THRESHOLD,
            half_bandwidth: HALF_BANDWIDTH,
        }
    }

    pub const fn with_gains(mut self, kp: f32, ki: f32, kd: f32) -> Self {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
        self
    }

    pub const fn with_base_speed(mut self, base_speed: f32) -> Self {
        self.base_speed = base_speed;
        self
    }

    pub const fn with_half_bandwidth(mut self, half_bandwidth: usize) -> Self {
        self.half_bandwidth = half_bandwidth;
        self
    }

    /// Symmetric bound on the integral term: `base_speed / ki`.
    pub fn integral_limit(&self) -> f32 {
        if self.ki > 0.0 {
            self.base_speed / self.ki
        } else {
            f32::INFINITY
        }
    }
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Complete configuration of one pipeline instance with `CH` analysis channels.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PipelineConfig<const CH: usize> {
    pub sample_rate_hz: u32,
    pub channels: ChannelMap<CH>,
    /// Noise floor shared by calibration and tracking.
    pub min_value_threshold: f32,
    pub calibration: CalibrationConfig,
    pub steering: SteeringConfig,
    /// Saturation applied before commands reach the wheels.
    pub max_wheel_speed: i16,
}

impl<const CH: usize> PipelineConfig<CH> {
    /// Defaults from the deployment constants above, with the given channel wiring.
    pub const fn new(channels: ChannelMap<CH>) -> Self {
        Self {
            sample_rate_hz: SAMPLE_RATE_HZ,
            channels,
            min_value_threshold: MIN_VALUE_THRESHOLD,
            calibration: CalibrationConfig::new(),
            steering: SteeringConfig::new(),
            max_wheel_speed: MAX_WHEEL_SPEED,
        }
    }

    pub const fn with_threshold(mut self, min_value_threshold: f32) -> Self {
        self.min_value_threshold = min_value_threshold;
        self
    }

    pub const fn with_calibration(mut self, calibration: CalibrationConfig) -> Self {
        self.calibration = calibration;
        self
    }

    pub const fn with_steering(mut self, steering: SteeringConfig) -> Self {
        self.steering = steering;
        self
    }

    /// Check that every index this configuration can produce stays inside the low half of a
    /// `frame_size`-point spectrum, and that the remaining parameters are usable.
    pub fn validate(&self, frame_size: usize) -> Result<(), ConfigError> {
        if !fft::is_supported(frame_size) {
            return Err(ConfigError::UnsupportedFrameSize(frame_size));
        }

        self.channels.validate()?;

        let cal = &self.calibration;
        let limit = frame_size / 2;

        if cal.min_bin > cal.max_bin {
            return Err(ConfigError::InvertedBand {
                min: cal.min_bin,
                max: cal.max_bin,
            });
        }
        if cal.max_bin >= limit {
            return Err(ConfigError::BinOutOfRange {
                bin: cal.max_bin,
                limit,
            });
        }
        if !(cal.min_bin..=cal.max_bin).contains(&cal.initial_target_bin) {
            return Err(ConfigError::TargetOutsideBand {
                target: cal.initial_target_bin,
                min: cal.min_bin,
                max: cal.max_bin,
            });
        }
        if cal.samples == 0 {
            return Err(ConfigError::ZeroCalibrationSamples);
        }
        // The running sum adds at most `max_bin` per sample and is a u32.
        let max_samples = u32::MAX / (cal.max_bin as u32 + 1);
        if cal.samples > max_samples {
            return Err(ConfigError::TooManyCalibrationSamples {
                samples: cal.samples,
                max: max_samples,
            });
        }

        // A committed target always lies in the calibration band, so the tracking window is
        // bounded by the band widened on both sides.
        let half_bw = self.steering.half_bandwidth;
        if half_bw > cal.min_bin {
            return Err(ConfigError::BinOutOfRange {
                bin: 0,
                limit,
            });
        }
        if cal.max_bin + half_bw >= limit {
            return Err(ConfigError::BinOutOfRange {
                bin: cal.max_bin + half_bw,
                limit,
            });
        }

        check_non_negative("min_value_threshold", self.min_value_threshold)?;
        let st = &self.steering;
        check_non_negative("kp", st.kp)?;
        check_non_negative("ki", st.ki)?;
        check_non_negative("kd", st.kd)?;
        check_non_negative("base_speed", st.base_speed)?;
        check_non_negative("error_threshold", st.error_threshold)?;

        if self.max_wheel_speed <= 0 {
            return Err(ConfigError::InvalidParameter("max_wheel_speed"));
        }
        if self.sample_rate_hz == 0 {
            return Err(ConfigError::InvalidParameter("sample_rate_hz"));
        }

        Ok(())
    }
}

fn check_non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter(name))
    }
}
