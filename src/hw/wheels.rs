// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Two H-bridge wheel motors on a shared TIM4.
//!
//! Each bridge takes PWM on one input and holds the other low, the same drive scheme as a
//! DRV8873 in PWM mode: IN1 PWM / IN2 low runs forward, IN1 low / IN2 PWM runs backward, both low
//! coasts. Speeds arrive in steps/s and are scaled linearly onto the duty range.

use crate::hw::pwm::{Channel, Tim4Pwm};
use crate::motors::DifferentialDrive;

/// Left bridge on CH1/CH2, right bridge on CH3/CH4.
pub struct Wheels {
    pwm: Tim4Pwm,
    /// Speed that maps to full duty.
    full_scale: i16,
}

impl Wheels {
    pub fn new(pwm: Tim4Pwm, full_scale: i16) -> Self {
        let mut wheels = Self {
            pwm,
            full_scale: full_scale.max(1),
        };
        wheels.stop();
        wheels
    }

    fn duty_for(&self, speed: i16) -> u16 {
        let max = u32::from(self.pwm.max_duty());
        let mag = u32::from(speed.unsigned_abs()).min(self.full_scale as u32);
        (mag * max / self.full_scale as u32) as u16
    }

    fn drive(&mut self, fwd: Channel, rev: Channel, speed: i16) {
        let duty = self.duty_for(speed);
        if speed >= 0 {
            self.pwm.set_duty(rev, 0);
            self.pwm.set_duty(fwd, duty);
        } else {
            self.pwm.set_duty(fwd, 0);
            self.pwm.set_duty(rev, duty);
        }
    }
}

impl DifferentialDrive for Wheels {
    fn set_speeds(&mut self, left: i16, right: i16) {
        self.drive(Channel::C1, Channel::C2, left);
        self.drive(Channel::C3, Channel::C4, right);
    }
}
