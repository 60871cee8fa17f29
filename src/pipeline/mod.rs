// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Pipeline Driver
//!
//! Binds the audio front end and the control algorithms into one per-frame step and exposes the
//! small surface shared with the rest of the firmware.
//!
//! ## Modules
//!
//! - [`driver`] - The [`Pipeline`] object and its per-batch `process` step.
//! - [`status`] - Enable flags written by game flow.
//! - [`signal`] - Latest-only "frame ready" notification.

pub mod driver;
pub mod signal;
pub mod status;

pub use driver::{CycleReport, Pipeline};
pub use signal::{FrameSignal, Subscriber};
pub use status::{ControlSurface, StatusFlags};
