// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Actuator Abstractions
//!
//! The steering law produces a [`WheelCommand`]; anything implementing [`DifferentialDrive`] can
//! execute it. The board's H-bridge wheels live in `hw::wheels`.
//!
//! ## Modules
//!
//! - [`drive`] - Wheel command type, saturation and the differential-drive trait.

pub mod drive;

pub use drive::{DifferentialDrive, WheelCommand};
