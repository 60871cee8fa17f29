// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Control Algorithms
//!
//! Everything that consumes a magnitude spectrum.
//!
//! ## Modules
//!
//! - [`pid`] - Discrete PID controller with anti-windup.
//! - [`calibration`] - Per-player target-bin calibration.
//! - [`steering`] - PID steering toward the target bin.

pub mod calibration;
pub mod pid;
pub mod steering;

pub use calibration::{CalibrationEvent, CalibrationMode, Calibrator};
pub use pid::Pid;
pub use steering::{SteeringController, SteeringMode};
