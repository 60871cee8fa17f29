// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Sample accumulation for the microphone array.
//!
//! The capture callback delivers samples interleaved round-robin across all physical microphones:
//! `[right0, left0, back0, front0, right1, left1, ...]`. The accumulator picks the channels named
//! by a [`ChannelMap`] out of each group and stores them as complex numbers with a zero imaginary
//! part, ready for an in-place FFT.

use microfft::Complex32;

use crate::config::{ConfigError, MIC_STRIDE};

/// Physical microphones, numbered by their position inside one interleaved capture group.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mic {
    Right = 0,
    Left = 1,
    Back = 2,
    Front = 3,
}

impl Mic {
    #[inline]
    pub const fn offset(self) -> usize {
        self as usize
    }
}

/// Which offsets of each interleaved group feed the `CH` analysis channels.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChannelMap<const CH: usize> {
    /// Samples per interleaved group (number of physical microphones).
    pub stride: usize,
    /// Offset inside a group for each analysis channel.
    pub offsets: [usize; CH],
}

impl ChannelMap<4> {
    /// All four microphones, in wiring order.
    pub const FOUR_MICS: Self = Self::from_mics([Mic::Right, Mic::Left, Mic::Back, Mic::Front]);
}

impl ChannelMap<1> {
    /// Single-microphone revision: only the left microphone is analysed.
    pub const LEFT_ONLY: Self = Self::from_mics([Mic::Left]);
}

impl<const CH: usize> ChannelMap<CH> {
    /// Map analysis channels onto the standard four-microphone capture layout.
    pub const fn from_mics(mics: [Mic; CH]) -> Self {
        let mut offsets = [0; CH];
        let mut i = 0;
        while i < CH {
            offsets[i] = mics[i].offset();
            i += 1;
        }
        Self {
            stride: MIC_STRIDE,
            offsets,
        }
    }

    /// Arbitrary layout, e.g. for a board with a different microphone count.
    pub const fn from_offsets(stride: usize, offsets: [usize; CH]) -> Self {
        Self { stride, offsets }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if CH == 0 {
            return Err(ConfigError::NoChannels);
        }
        for (i, &offset) in self.offsets.iter().enumerate() {
            if offset >= self.stride {
                return Err(ConfigError::ChannelOutOfRange {
                    offset,
                    stride: self.stride,
                });
            }
            if self.offsets[..i].contains(&offset) {
                return Err(ConfigError::DuplicateChannel(offset));
            }
        }
        Ok(())
    }
}

/// One analysis window: `N` complex samples for each of `CH` channels.
pub struct AudioFrame<const CH: usize, const N: usize> {
    channels: [[Complex32; N]; CH],
}

impl<const CH: usize, const N: usize> AudioFrame<CH, N> {
    pub const fn new() -> Self {
        Self {
            channels: [[Complex32::new(0.0, 0.0); N]; CH],
        }
    }

    #[inline]
    pub fn channel(&self, index: usize) -> &[Complex32; N] {
        &self.channels[index]
    }

    #[inline]
    pub fn channels_mut(&mut self) -> &mut [[Complex32; N]; CH] {
        &mut self.channels
    }
}

impl<const CH: usize, const N: usize> Default for AudioFrame<CH, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Fills an [`AudioFrame`] from successive capture batches.
pub struct SampleAccumulator<const CH: usize, const N: usize> {
    map: ChannelMap<CH>,
    frame: AudioFrame<CH, N>,
    /// Write position in scalar slots (real and imaginary), `0..=2 * N`.
    cursor: usize,
}

impl<const CH: usize, const N: usize> SampleAccumulator<CH, N> {
    /// Scalar slots per channel buffer.
    pub const CAPACITY: usize = 2 * N;

    /// The channel map must have passed [`ChannelMap::validate`].
    pub const fn new(map: ChannelMap<CH>) -> Self {
        Self {
            map,
            frame: AudioFrame::new(),
            cursor: 0,
        }
    }

    /// Current write position in scalar slots.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn channel_map(&self) -> &ChannelMap<CH> {
        &self.map
    }

    /// Consume one capture batch.
    ///
    /// `samples.len()` should be a multiple of the stride; a trailing partial group is ignored.
    /// When the frame fills up, the rest of the batch is dropped, the cursor rewinds to zero and
    /// the completed frame is returned for analysis. The frame stays intact until the next call.
    pub fn accumulate(&mut self, samples: &[i16]) -> Option<&mut AudioFrame<CH, N>> {
        for group in samples.chunks_exact(self.map.stride) {
            let slot = self.cursor / 2;
            for (buf, &offset) in self.frame.channels.iter_mut().zip(self.map.offsets.iter()) {
                buf[slot] = Complex32::new(f32::from(group[offset]), 0.0);
            }
            self.cursor += 2;

            if self.cursor >= Self::CAPACITY {
                self.cursor = 0;
                return Some(&mut self.frame);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    fn batch(groups: usize, start: i16) -> Vec<i16> {
        // Each group carries its index in every slot, offset by the mic position.
        (0..groups)
            .flat_map(|g| (0..4).map(move |m| start + (g as i16) * 10 + m as i16))
            .collect()
    }

    #[test]
    fn triggers_once_per_frame_across_batch_sizes() {
        let mut acc = SampleAccumulator::<4, 16>::new(ChannelMap::FOUR_MICS);

        assert!(acc.accumulate(&batch(5, 0)).is_none());
        assert_eq!(acc.cursor(), 10);
        assert!(acc.accumulate(&batch(7, 0)).is_none());
        assert_eq!(acc.cursor(), 24);
        assert!(acc.accumulate(&batch(4, 0)).is_some());
        assert_eq!(acc.cursor(), 0);
    }

    #[test]
    fn demultiplexes_in_wiring_order() {
        let mut acc = SampleAccumulator::<4, 16>::new(ChannelMap::FOUR_MICS);
        let frame = acc.accumulate(&batch(16, 100)).expect("frame complete");

        let channels = frame.channels_mut();
        for (ch, buf) in channels.iter().enumerate() {
            for (i, c) in buf.iter().enumerate() {
                assert_eq!(c.re, (100 + i as i16 * 10 + ch as i16) as f32);
                assert_eq!(c.im, 0.0);
            }
        }
    }

    #[test]
    fn single_channel_map_reads_left_mic() {
        let mut acc = SampleAccumulator::<1, 16>::new(ChannelMap::LEFT_ONLY);
        let frame = acc.accumulate(&batch(16, 0)).expect("frame complete");
        assert_eq!(frame.channel(0)[3].re, 31.0);
    }

    #[test]
    fn leftover_samples_after_a_full_frame_are_dropped() {
        let mut acc = SampleAccumulator::<4, 16>::new(ChannelMap::FOUR_MICS);
        assert!(acc.accumulate(&batch(12, 0)).is_none());

        // 4 groups complete the frame, the other 6 are discarded.
        assert!(acc.accumulate(&batch(10, 0)).is_some());
        assert_eq!(acc.cursor(), 0);

        assert!(acc.accumulate(&batch(15, 0)).is_none());
        assert_eq!(acc.cursor(), 30);
    }

    #[test]
    fn trailing_partial_group_is_ignored() {
        let mut acc = SampleAccumulator::<4, 16>::new(ChannelMap::FOUR_MICS);
        assert!(acc.accumulate(&[1, 2, 3, 4, 5, 6]).is_none());
        assert_eq!(acc.cursor(), 2);
    }

    #[test]
    fn channel_map_validation() {
        assert_eq!(ChannelMap::FOUR_MICS.validate(), Ok(()));
        assert_eq!(
            ChannelMap::from_offsets(4, [0, 4]).validate(),
            Err(ConfigError::ChannelOutOfRange {
                offset: 4,
                stride: 4
            })
        );
        assert_eq!(
            ChannelMap::from_offsets(4, [1, 1]).validate(),
            Err(ConfigError::DuplicateChannel(1))
        );
        assert_eq!(
            ChannelMap::<0>::from_offsets(4, []).validate(),
            Err(ConfigError::NoChannels)
        );
    }
}
