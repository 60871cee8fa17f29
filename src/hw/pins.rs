// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin definitions for the STM32F777 robot board.

use stm32f7xx_hal::{
    gpio::{gpioa, gpiod, Alternate, Output, PushPull},
    pac,
    prelude::*,
};

/// All board pins used by the firmware. Construct this once at startup using:
///
/// ```ignore
/// let pins = BoardPins::new(dp.GPIOA, dp.GPIOD);
/// ```
pub struct BoardPins {
    pub leds: LedPins,
    pub usart1: Usart1Pins,
    pub wheels: WheelPins,
}

pub struct LedPins {
    pub red: gpiod::PD8<Output<PushPull>>,
    pub yellow: gpiod::PD9<Output<PushPull>>,
    pub green: gpiod::PD10<Output<PushPull>>,
}

/// Debug console and host link
pub struct Usart1Pins {
    pub tx: gpioa::PA9<Alternate<7>>,
    pub rx: gpioa::PA10<Alternate<7>>,
}

/// H-bridge inputs, TIM4 CH1..CH4
pub struct WheelPins {
    pub left_in1: gpiod::PD12<Alternate<2>>,
    pub left_in2: gpiod::PD13<Alternate<2>>,
    pub right_in1: gpiod::PD14<Alternate<2>>,
    pub right_in2: gpiod::PD15<Alternate<2>>,
}

impl BoardPins {
    /// Create all named pins from raw GPIO peripherals.
    pub fn new(gpioa: pac::GPIOA, gpiod: pac::GPIOD) -> Self {
        let gpioa = gpioa.split();
        let gpiod = gpiod.split();

        Self {
            leds: LedPins {
                red: gpiod.pd8.into_push_pull_output(),
                yellow: gpiod.pd9.into_push_pull_output(),
                green: gpiod.pd10.into_push_pull_output(),
            },

            usart1: Usart1Pins {
                tx: gpioa.pa9.into_alternate::<7>(),
                rx: gpioa.pa10.into_alternate::<7>(),
            },

            wheels: WheelPins {
                left_in1: gpiod.pd12.into_alternate::<2>(),
                left_in2: gpiod.pd13.into_alternate::<2>(),
                right_in1: gpiod.pd14.into_alternate::<2>(),
                right_in2: gpiod.pd15.into_alternate::<2>(),
            },
        }
    }
}
