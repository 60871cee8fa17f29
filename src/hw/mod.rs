// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! MCU-level wrappers for the STM32F777 robot board.

pub mod console;
pub mod led;
pub mod pins;
pub mod pwm;
pub mod usart;
pub mod wheels;

pub use led::Led;
pub use pins::BoardPins;
pub use pwm::Tim4Pwm;
pub use usart::{Usart, UsartRx};
pub use wheels::Wheels;
