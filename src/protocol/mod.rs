// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Debug Transport
//!
//! `START`-framed buffers exchanged with a host over the debug serial link.
//!
//! - [`messages`] - Frame layout and encoders for spectra and sample batches.
//! - [`parser`] - Byte-wise receiver for sample batches sent by the host.
//! - [`queue`] - Interrupt-to-loop byte queue feeding the parser.

pub mod messages;
pub mod parser;
pub mod queue;

pub use messages::{send_f32s, send_i16s, ByteSink, START_MARKER};
pub use parser::Parser;
pub use queue::{ByteQueue, Received};
