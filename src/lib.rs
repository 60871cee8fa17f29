// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Tonefollow Firmware
//!
//! Acoustic steering core of a small wheeled robot that follows a whistled or hummed tone. Each
//! robot is calibrated to its player's pitch; afterwards the robot drives forward and turns
//! toward the side that brings the dominant pitch back onto the calibrated frequency bin.
//!
//! The library is `no_std` and hardware independent so that the whole signal chain can be tested
//! on a host. Board bring-up for the STM32F777 lives behind the `board` feature.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`audio`] | Sample accumulation, FFT and magnitude spectra |
//! | [`control`] | Calibration, PID and the steering law |
//! | [`motors`] | Wheel commands and the differential-drive seam |
//! | [`pipeline`] | Per-frame driver, enable flags and frame-ready signal |
//! | [`protocol`] | `START`-framed debug link to a host PC |
//! | [`config`] | Deployment constants and [`PipelineConfig`](config::PipelineConfig) |
//! | `hw` | MCU-level wrappers around USART, timers and pins (`board` only) |
//!
//! ## Getting Started
//!
//! Run the host test suite:
//!
//! ```bash
//! cargo test
//! ```
//!
//! Flash the board:
//!
//! ```bash
//! cargo run --release --target thumbv7em-none-eabihf --features board
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![no_std]

#[cfg(test)]
extern crate std;

pub mod audio;
pub mod config;
pub mod control;
pub mod motors;
pub mod pipeline;
pub mod protocol;

#[cfg(feature = "board")]
pub mod hw;
