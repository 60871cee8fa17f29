// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Audio Front End
//!
//! Turns interleaved microphone samples into magnitude spectra.
//!
//! ## Modules
//!
//! - [`accumulator`] - Demultiplexes capture batches into per-channel complex frames.
//! - [`fft`] - Fixed-size in-place complex FFT dispatch.
//! - [`spectrum`] - Magnitude spectra, channel averaging and peak search.

pub mod accumulator;
pub mod fft;
pub mod spectrum;

pub use accumulator::{AudioFrame, ChannelMap, Mic, SampleAccumulator};
pub use spectrum::{find_peak, Peak, SpectralAnalyzer, SpectrumFrame};
