// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Four-channel PWM on TIM4 via direct PAC register access.
//!
//! TIM4 CH1..CH4 come out on PD12..PD15 (AF2) and drive the IN1/IN2 inputs of the two wheel
//! H-bridges. All four channels share one period.

use stm32f7xx_hal::{pac, rcc::Clocks};

/// PWM output channel of TIM4.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Channel {
    C1,
    C2,
    C3,
    C4,
}

pub struct Tim4Pwm {
    tim: pac::TIM4,
    max_duty: u16,
}

impl Tim4Pwm {
    /// Configure TIM4 for edge-aligned PWM mode 1 at `freq_hz` on all four channels.
    ///
    /// The counter is clocked at 1 MHz, so the duty resolution is `1_000_000 / freq_hz` steps.
    pub fn new(tim4: pac::TIM4, clocks: &Clocks, freq_hz: u32) -> Self {
        let tim = tim4;

        // Clock gate on APB1
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim4en().set_bit());

        // Disable counter while configuring
        tim.cr1.modify(|_, w| w.cen().clear_bit());

        // 1 MHz tick
        let psc = (clocks.timclk1().raw() / 1_000_000).saturating_sub(1) as u16;
        tim.psc.write(|w| unsafe { w.bits(u32::from(psc)) });

        let period = (1_000_000 / freq_hz.max(1)).clamp(2, 0x1_0000);
        let max_duty = (period - 1) as u16;
        tim.arr.write(|w| unsafe { w.bits(u32::from(max_duty)) });

        // OCxM = PWM mode 1 (0b110), OCxPE = preload, for CH1/CH2 and CH3/CH4
        tim.ccmr1_output().write(|w| unsafe { w.bits(0x6868) });
        tim.ccmr2_output().write(|w| unsafe { w.bits(0x6868) });

        // Start with every output low
        tim.ccr1.write(|w| unsafe { w.bits(0) });
        tim.ccr2.write(|w| unsafe { w.bits(0) });
        tim.ccr3.write(|w| unsafe { w.bits(0) });
        tim.ccr4.write(|w| unsafe { w.bits(0) });

        // Active-high outputs on all four channels
        tim.ccer.write(|w| unsafe { w.bits(0x1111) });

        // Latch PSC/ARR/CCR, then run with auto-reload preload
        tim.egr.write(|w| w.ug().set_bit());
        tim.cr1.modify(|_, w| w.arpe().set_bit().cen().set_bit());

        Self { tim, max_duty }
    }

    #[inline]
    pub fn max_duty(&self) -> u16 {
        self.max_duty
    }

    /// Set the compare value of `ch`, saturated to [`Tim4Pwm::max_duty`].
    pub fn set_duty(&mut self, ch: Channel, duty: u16) {
        let duty = u32::from(duty.min(self.max_duty));
        match ch {
            Channel::C1 => self.tim.ccr1.write(|w| unsafe { w.bits(duty) }),
            Channel::C2 => self.tim.ccr2.write(|w| unsafe { w.bits(duty) }),
            Channel::C3 => self.tim.ccr3.write(|w| unsafe { w.bits(duty) }),
            Channel::C4 => self.tim.ccr4.write(|w| unsafe { w.bits(duty) }),
        }
    }
}
