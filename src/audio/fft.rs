// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! In-place complex FFT for the frame sizes the firmware can be built with.
//!
//! `microfft` exposes one function per transform length over fixed-size arrays. The frame size is
//! a const generic of the pipeline, so the matching length is selected here once per call. The
//! transform is forward and unscaled.

use microfft::Complex32;

/// Smallest supported transform length.
pub const MIN_SIZE: usize = 16;
/// Largest supported transform length.
pub const MAX_SIZE: usize = 4096;

/// True if `n` can be passed to [`cfft_in_place`].
pub const fn is_supported(n: usize) -> bool {
    n.is_power_of_two() && n >= MIN_SIZE && n <= MAX_SIZE
}

macro_rules! dispatch {
    ($buf:ident; $($n:literal => $f:ident),+ $(,)?) => {
        match $buf.len() {
            $(
                $n => match <&mut [Complex32; $n]>::try_from($buf) {
                    Ok(arr) => {
                        let _ = microfft::complex::$f(arr);
                        true
                    }
                    Err(_) => false,
                },
            )+
            _ => false,
        }
    };
}

/// Transform `buf` in place. Returns `false` (and leaves `buf` untouched) for unsupported lengths.
pub fn cfft_in_place(buf: &mut [Complex32]) -> bool {
    dispatch!(buf;
        16 => cfft_16,
        32 => cfft_32,
        64 => cfft_64,
        128 => cfft_128,
        256 => cfft_256,
        512 => cfft_512,
        1024 => cfft_1024,
        2048 => cfft_2048,
        4096 => cfft_4096,
    )
}
