// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Receiver for sample batches sent by the host.
//!
//! The host link lets a PC replay recorded (or synthetic) microphone data through the same
//! accumulate/analyse path as the live capture callback. Bytes are fed one at a time; a complete
//! batch is returned as a borrowed slice that stays valid until the next [`Parser::push`].

use log::warn;

use crate::protocol::messages::START_MARKER;

enum State {
    WaitMarker { matched: usize },
    WaitLenLo,
    WaitLenHi { lo: u8 },
    Payload { expected: usize, received: usize },
    PayloadHi { expected: usize, received: usize, lo: u8 },
}

/// Byte-wise parser for `START`-framed `i16` batches of at most `MAX` samples.
pub struct Parser<const MAX: usize> {
    state: State,
    buf: [i16; MAX],
    rejected: u32,
}

impl<const MAX: usize> Parser<MAX> {
    pub const fn new() -> Self {
        Self {
            state: State::WaitMarker { matched: 0 },
            buf: [0; MAX],
            rejected: 0,
        }
    }

    /// Number of frames dropped because they announced more than `MAX` samples.
    #[inline]
    pub fn rejected(&self) -> u32 {
        self.rejected
    }

    /// Drop any partially received frame and wait for the next marker.
    ///
    /// Call this when bytes are known to be missing from the stream, otherwise the payload count
    /// runs into the following frame.
    pub fn reset(&mut self) {
        if !matches!(self.state, State::WaitMarker { matched: 0 }) {
            warn!("host frame abandoned after a gap in the byte stream");
        }
        self.state = State::WaitMarker { matched: 0 };
    }

    /// Process a single incoming byte. Returns the samples once a complete frame is received.
    pub fn push(&mut self, byte: u8) -> Option<&[i16]> {
        match self.state {
            State::WaitMarker { matched } => {
                let matched = if byte == START_MARKER[matched] {
                    matched + 1
                } else if byte == START_MARKER[0] {
                    1
                } else {
                    0
                };
                self.state = if matched == START_MARKER.len() {
                    State::WaitLenLo
                } else {
                    State::WaitMarker { matched }
                };
            }
            State::WaitLenLo => {
                self.state = State::WaitLenHi { lo: byte };
            }
            State::WaitLenHi { lo } => {
                let expected = u16::from_le_bytes([lo, byte]) as usize;
                if expected > MAX {
                    warn!("host frame of {} samples exceeds buffer of {}", expected, MAX);
                    self.rejected = self.rejected.wrapping_add(1);
                    self.state = State::WaitMarker { matched: 0 };
                } else if expected == 0 {
                    self.state = State::WaitMarker { matched: 0 };
                    return Some(&self.buf[..0]);
                } else {
                    self.state = State::Payload {
                        expected,
                        received: 0,
                    };
                }
            }
            State::Payload { expected, received } => {
                self.state = State::PayloadHi {
                    expected,
                    received,
                    lo: byte,
                };
            }
            State::PayloadHi {
                expected,
                received,
                lo,
            } => {
                self.buf[received] = i16::from_le_bytes([lo, byte]);
                let received = received + 1;
                if received == expected {
                    self.state = State::WaitMarker { matched: 0 };
                    return Some(&self.buf[..expected]);
                }
                self.state = State::Payload { expected, received };
            }
        }
        None
    }
}

impl<const MAX: usize> Default for Parser<MAX> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::messages::{send_i16s, ByteSink};
    use std::vec;
    use std::vec::Vec;

    struct Wire(Vec<u8>);

    impl ByteSink for Wire {
        fn write_bytes(&mut self, bytes: &[u8]) {
            self.0.extend_from_slice(bytes);
        }
    }

    fn frame(samples: &[i16]) -> Vec<u8> {
        let mut wire = Wire(Vec::new());
        send_i16s(&mut wire, samples);
        wire.0
    }

    fn feed<const MAX: usize>(parser: &mut Parser<MAX>, bytes: &[u8]) -> Vec<Vec<i16>> {
        let mut out = Vec::new();
        for &b in bytes {
            if let Some(batch) = parser.push(b) {
                out.push(batch.to_vec());
            }
        }
        out
    }

    #[test]
    fn decodes_frame_sent_by_encoder() {
        let mut parser = Parser::<8>::new();
        let got = feed(&mut parser, &frame(&[1, -1, 32767, -32768]));
        let expected: [Vec<i16>; 1] = [vec![1, -1, 32767, -32768]];
        assert_eq!(got, expected);
    }

    #[test]
    fn resynchronises_after_garbage_and_partial_marker() {
        let mut bytes = b"xxSTAST".to_vec();
        bytes.extend_from_slice(&frame(&[7, 8]));
        bytes.extend_from_slice(b"\x00STAR");
        bytes.extend_from_slice(&frame(&[9]));

        let mut parser = Parser::<8>::new();
        let expected: [Vec<i16>; 2] = [vec![7, 8], vec![9]];
        assert_eq!(feed(&mut parser, &bytes), expected);
    }

    #[test]
    fn oversized_frame_is_rejected() {
        let mut bytes = frame(&[1, 2, 3, 4, 5]);
        bytes.extend_from_slice(&frame(&[6]));

        let mut parser = Parser::<4>::new();
        // The oversized payload is scanned as noise; the following frame still decodes.
        let expected: [Vec<i16>; 1] = [vec![6]];
        assert_eq!(feed(&mut parser, &bytes), expected);
        assert_eq!(parser.rejected(), 1);
    }

    #[test]
    fn reset_after_lost_byte_recovers_next_frame() {
        let first = frame(&[1, 2, 3, 4]);
        let second = frame(&[5, 6]);

        // One payload byte of the first frame never arrives.
        let mut damaged = first.clone();
        damaged.remove(9);

        let mut parser = Parser::<8>::new();
        assert!(feed(&mut parser, &damaged).is_empty());
        parser.reset();
        let expected: [Vec<i16>; 1] = [vec![5, 6]];
        assert_eq!(feed(&mut parser, &second), expected);
    }

    #[test]
    fn lost_byte_without_reset_swallows_next_header() {
        let mut damaged = frame(&[1, 2, 3, 4]);
        damaged.remove(9);
        damaged.extend_from_slice(&frame(&[5, 6]));

        let mut parser = Parser::<8>::new();
        let got = feed(&mut parser, &damaged);
        // The first frame is completed with bytes of the second header, the second is lost.
        assert_eq!(got.len(), 1);
        assert_ne!(got[0], vec![1i16, 2, 3, 4]);
    }

    #[test]
    fn empty_frame_yields_empty_batch() {
        let mut parser = Parser::<4>::new();
        assert_eq!(feed(&mut parser, b"START\x00\x00"), [Vec::<i16>::new()]);
    }
}
