// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Magnitude spectra and peak search.
//!
//! Every completed [`AudioFrame`] is transformed channel by channel, converted to magnitudes and
//! averaged into one combined spectrum. Only bins `0..N / 2` carry distinct information for a
//! real-valued input; the configured bands are validated against that half.

use core::ops::RangeInclusive;

use micromath::F32Ext;

use crate::audio::fft;
use crate::audio::AudioFrame;

/// A detected spectral peak.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Peak {
    pub bin: usize,
    pub magnitude: f32,
}

/// Find the strongest bin in `bins` whose magnitude exceeds `floor`.
///
/// The first bin wins on ties. A range that does not fit inside `spectrum` yields `None`.
pub fn find_peak(spectrum: &[f32], bins: RangeInclusive<usize>, floor: f32) -> Option<Peak> {
    let start = *bins.start();
    let window = spectrum.get(bins)?;

    let mut best: Option<Peak> = None;
    let mut max = floor;
    for (i, &magnitude) in window.iter().enumerate() {
        if magnitude > max {
            max = magnitude;
            best = Some(Peak {
                bin: start + i,
                magnitude,
            });
        }
    }
    best
}

/// `sqrt(re² + im²)` to full `f32` precision.
///
/// The `micromath` estimate is within about 6%, so three Newton steps bring it down to rounding
/// error. Peaks are gated against the noise floor, so the result must not overshoot. Exact zero
/// stays zero.
#[inline]
pub fn magnitude(re: f32, im: f32) -> f32 {
    let power = re * re + im * im;
    if power.is_nan() || power <= 0.0 {
        return 0.0;
    }
    if power == f32::INFINITY {
        return power;
    }

    let mut root = F32Ext::sqrt(power);
    if root <= 0.0 {
        // Subnormal power, below anything a sample frame can produce.
        return 0.0;
    }
    for _ in 0..3 {
        root = 0.5 * (root + power / root);
    }
    root
}

/// Centre frequency of `bin` for an `n`-point transform at `sample_rate_hz`.
pub fn bin_frequency_hz(bin: usize, n: usize, sample_rate_hz: u32) -> f32 {
    bin as f32 * sample_rate_hz as f32 / n as f32
}

/// Per-channel and combined magnitude spectra of the most recent frame.
pub struct SpectrumFrame<const CH: usize, const N: usize> {
    channels: [[f32; N]; CH],
    combined: [f32; N],
}

impl<const CH: usize, const N: usize> SpectrumFrame<CH, N> {
    pub const fn new() -> Self {
        Self {
            channels: [[0.0; N]; CH],
            combined: [0.0; N],
        }
    }

    #[inline]
    pub fn channel(&self, index: usize) -> &[f32; N] {
        &self.channels[index]
    }

    /// Element-wise mean across channels.
    #[inline]
    pub fn combined(&self) -> &[f32; N] {
        &self.combined
    }
}

impl<const CH: usize, const N: usize> Default for SpectrumFrame<CH, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs the per-channel FFT and magnitude computation.
pub struct SpectralAnalyzer<const CH: usize, const N: usize> {
    spectra: SpectrumFrame<CH, N>,
}

impl<const CH: usize, const N: usize> SpectralAnalyzer<CH, N> {
    const SUPPORTED_SIZE: () = assert!(
        fft::is_supported(N),
        "frame size must be a power of two between 16 and 4096"
    );

    /// An unsupported frame size `N` is rejected at compile time:
    ///
    /// ```compile_fail
    /// let analyzer = tonefollow::audio::SpectralAnalyzer::<1, 12>::new();
    /// ```
    pub const fn new() -> Self {
        let () = Self::SUPPORTED_SIZE;
        Self {
            spectra: SpectrumFrame::new(),
        }
    }

    #[inline]
    pub fn spectra(&self) -> &SpectrumFrame<CH, N> {
        &self.spectra
    }

    /// Transform `frame` in place and return the combined magnitude spectrum.
    pub fn analyze(&mut self, frame: &mut AudioFrame<CH, N>) -> &[f32; N] {
        for (input, output) in frame
            .channels_mut()
            .iter_mut()
            .zip(self.spectra.channels.iter_mut())
        {
            let transformed = fft::cfft_in_place(input);
            debug_assert!(transformed);
            for (mag, c) in output.iter_mut().zip(input.iter()) {
                *mag = magnitude(c.re, c.im);
            }
        }

        if CH == 1 {
            self.spectra.combined = self.spectra.channels[0];
        } else {
            let scale = 1.0 / CH as f32;
            for (bin, out) in self.spectra.combined.iter_mut().enumerate() {
                let sum: f32 = self.spectra.channels.iter().map(|ch| ch[bin]).sum();
                *out = sum * scale;
            }
        }

        &self.spectra.combined
    }
}

impl<const CH: usize, const N: usize> Default for SpectralAnalyzer<CH, N> {
    fn default() -> Self {
        Self::new()
    }
}
