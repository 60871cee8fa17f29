// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Sample batches replayed from a host go through the same path as live capture.

mod common;

use common::{init_logging, tone, Recorder, Wire};
use tonefollow::audio::ChannelMap;
use tonefollow::config::{PipelineConfig, FFT_SIZE, MIC_STRIDE, SAMPLES_PER_CALLBACK};
use tonefollow::pipeline::{ControlSurface, Pipeline};
use tonefollow::protocol::{send_f32s, send_i16s, ByteQueue, Parser, Received, START_MARKER};

const N: usize = FFT_SIZE;
const BATCH: usize = SAMPLES_PER_CALLBACK * MIC_STRIDE;

#[test]
fn replayed_tone_drives_the_wheels() {
    init_logging();
    let surface = ControlSurface::new();
    let mut pipeline =
        Pipeline::<4, N>::new(PipelineConfig::new(ChannelMap::FOUR_MICS), &surface).unwrap();
    let mut wheels = Recorder::default();
    surface.set_audio_command(true);

    // Host side: split one frame into callback-sized frames, with line noise in between.
    let mut wire = Wire::default();
    for batch in tone(17, N, 1000.0, N).chunks(BATCH) {
        wire.0.extend_from_slice(b"\r\nnoise");
        send_i16s(&mut wire, batch);
    }

    let mut parser = Parser::<BATCH>::new();
    let mut reports = Vec::new();
    for &byte in &wire.0 {
        if let Some(batch) = parser.push(byte) {
            reports.extend(pipeline.process(batch, &mut wheels));
        }
    }

    assert_eq!(reports.len(), 1);
    assert_eq!(parser.rejected(), 0);
    assert_eq!(wheels.writes, [(1100, 691)]);
}

#[test]
fn receive_gap_drops_only_the_damaged_batch() {
    init_logging();
    let samples = tone(17, N, 1000.0, N);
    let batches: Vec<&[i16]> = samples.chunks(BATCH).collect();

    let queue = ByteQueue::<2048>::new();
    let mut parser = Parser::<BATCH>::new();
    let mut decoded = Vec::new();

    for (index, batch) in batches.iter().enumerate() {
        let mut wire = Wire::default();
        send_i16s(&mut wire, batch);

        // Receive interrupt: the third batch hits an overrun in its payload.
        for (at, &byte) in wire.0.iter().enumerate() {
            if index == 2 && at == 100 {
                queue.mark_lost();
                continue;
            }
            queue.push(byte);
        }

        // Host-link loop.
        while let Some(received) = queue.pop() {
            match received {
                Received::Byte(byte) => {
                    if let Some(batch) = parser.push(byte) {
                        decoded.push(batch.to_vec());
                    }
                }
                Received::Gap(_) => parser.reset(),
            }
        }
    }

    let expected: Vec<Vec<i16>> = batches
        .iter()
        .enumerate()
        .filter(|&(index, _)| index != 2)
        .map(|(_, batch)| batch.to_vec())
        .collect();
    assert_eq!(decoded, expected);
    assert_eq!(parser.rejected(), 0);
}

#[test]
fn streamed_spectrum_has_expected_layout() {
    let surface = ControlSurface::new();
    let mut pipeline =
        Pipeline::<4, N>::new(PipelineConfig::new(ChannelMap::FOUR_MICS), &surface).unwrap();
    let mut wheels = Recorder::default();
    for batch in tone(17, N, 1000.0, N).chunks(BATCH) {
        pipeline.process(batch, &mut wheels);
    }

    let half = &pipeline.spectra().combined()[..N / 2];
    let mut wire = Wire::default();
    send_f32s(&mut wire, half);

    let bytes = &wire.0;
    assert_eq!(&bytes[..5], START_MARKER);
    assert_eq!(u16::from_le_bytes([bytes[5], bytes[6]]) as usize, N / 2);
    assert_eq!(bytes.len(), 7 + 4 * N / 2);

    let at = 7 + 4 * 17;
    let peak = f32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
    assert_eq!(peak, half[17]);
    assert!(peak > 10_000.0);
}
