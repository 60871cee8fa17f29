// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Debug stream framing shared with the host visualisation tools.
//!
//! A frame is the ASCII marker `START`, a little-endian `u16` element count, then the elements as
//! little-endian bytes. Spectra go out as `f32`, sample batches come in as `i16`.

/// Sync marker opening every frame.
pub const START_MARKER: &[u8; 5] = b"START";

/// Marker plus the element count.
pub const HEADER_LEN: usize = START_MARKER.len() + 2;

/// Anything that can swallow raw bytes (a UART, a test buffer).
pub trait ByteSink {
    fn write_bytes(&mut self, bytes: &[u8]);
}

/// Frame header announcing `count` elements.
pub fn header(count: u16) -> [u8; HEADER_LEN] {
    let mut out = [0u8; HEADER_LEN];
    out[..START_MARKER.len()].copy_from_slice(START_MARKER);
    out[START_MARKER.len()..].copy_from_slice(&count.to_le_bytes());
    out
}

/// Stream a float buffer (e.g. a magnitude spectrum). At most `u16::MAX` elements are sent.
pub fn send_f32s<S: ByteSink + ?Sized>(sink: &mut S, data: &[f32]) {
    let count = data.len().min(u16::MAX as usize);
    sink.write_bytes(&header(count as u16));
    for value in &data[..count] {
        sink.write_bytes(&value.to_le_bytes());
    }
}

/// Stream a sample buffer. At most `u16::MAX` elements are sent.
pub fn send_i16s<S: ByteSink + ?Sized>(sink: &mut S, data: &[i16]) {
    let count = data.len().min(u16::MAX as usize);
    sink.write_bytes(&header(count as u16));
    for value in &data[..count] {
        sink.write_bytes(&value.to_le_bytes());
    }
}
