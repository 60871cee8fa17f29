// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Differential-drive command type and actuator seam.

/// Left/right wheel speed request in steps per second, before saturation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WheelCommand {
    pub left: f32,
    pub right: f32,
}

impl WheelCommand {
    /// Both wheels stopped.
    pub const STOP: Self = Self::new(0.0, 0.0);

    pub const fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    /// Both wheels at the same speed.
    pub const fn straight(speed: f32) -> Self {
        Self::new(speed, speed)
    }

    /// Clamp both sides to `±limit` and truncate toward zero, as the wheel setters expect.
    pub fn to_steps(self, limit: i16) -> (i16, i16) {
        (saturate(self.left, limit), saturate(self.right, limit))
    }
}

fn saturate(speed: f32, limit: i16) -> i16 {
    let limit = f32::from(limit);
    if speed.is_nan() {
        return 0;
    }
    speed.clamp(-limit, limit) as i16
}

/// Two independent signed speed setters, one per side of a differential drive.
///
/// Implementations only receive values already saturated to the hardware limit.
pub trait DifferentialDrive {
    fn set_speeds(&mut self, left: i16, right: i16);

    #[inline]
    fn stop(&mut self) {
        self.set_speeds(0, 0);
    }
}

impl<D: DifferentialDrive + ?Sized> DifferentialDrive for &mut D {
    #[inline]
    fn set_speeds(&mut self, left: i16, right: i16) {
        (**self).set_speeds(left, right);
    }
}
