// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

#![allow(dead_code)]

use std::f32::consts::PI;

use tonefollow::motors::DifferentialDrive;
use tonefollow::protocol::ByteSink;

pub const STRIDE: usize = 4;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// `groups` interleaved groups of a sine at exactly `bin` of an `n`-point frame, identical on
/// all four microphones.
pub fn tone(bin: usize, n: usize, amplitude: f32, groups: usize) -> Vec<i16> {
    let mut out = Vec::with_capacity(groups * STRIDE);
    for i in 0..groups {
        let phase = 2.0 * PI * (bin * i) as f32 / n as f32;
        let sample = (amplitude * phase.sin()).round() as i16;
        out.extend(std::iter::repeat(sample).take(STRIDE));
    }
    out
}

pub fn silence(groups: usize) -> Vec<i16> {
    vec![0; groups * STRIDE]
}

/// Records every wheel write.
#[derive(Default)]
pub struct Recorder {
    pub writes: Vec<(i16, i16)>,
}

impl DifferentialDrive for Recorder {
    fn set_speeds(&mut self, left: i16, right: i16) {
        self.writes.push((left, right));
    }
}

/// In-memory serial line.
#[derive(Default)]
pub struct Wire(pub Vec<u8>);

impl ByteSink for Wire {
    fn write_bytes(&mut self, bytes: &[u8]) {
        self.0.extend_from_slice(bytes);
    }
}
