// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Discrete PID controller for once-per-frame control loops.
//!
//! Works in `no_std` and does not allocate memory. The loop period is fixed by the audio frame
//! rate, so the integral and derivative terms are plain per-step sums and differences.

/// PID controller with tunable gains and a symmetric anti-windup clamp on the integrator.
#[derive(Copy, Clone, Debug)]
pub struct Pid {
    /// Proportional gain
    kp: f32,
    /// Integral gain
    ki: f32,
    /// Derivative gain
    kd: f32,

    /// Integrator state (sum of errors)
    integral: f32,
    /// Error of the previous step (for derivative term)
    prev_error: f32,

    /// Integral anti-windup clamp, `|integral| <= int_limit`
    int_limit: f32,
}

impl Pid {
    /// Create a new PID controller.
    ///
    /// `kp`, `ki`, `kd` are the gain constants. The integrator is unbounded until
    /// [`with_integral_limit`](Self::with_integral_limit) is applied.
    pub const fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self {
            kp,
            ki,
            kd,

            integral: 0.0,
            prev_error: 0.0,

            int_limit: f32::INFINITY,
        }
    }

    /// Set the integral limit for anti-windup.
    pub const fn with_integral_limit(mut self, limit: f32) -> Self {
        self.int_limit = limit;
        self
    }

    /// Current integrator state.
    #[inline]
    pub fn integral(&self) -> f32 {
        self.integral
    }

    /// Error seen on the previous step.
    #[inline]
    pub fn previous_error(&self) -> f32 {
        self.prev_error
    }

    /// Clear the integrator only; derivative history is kept.
    #[inline]
    pub fn reset_integral(&mut self) {
        self.integral = 0.0;
    }

    /// Reset integrator + derivative history.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
    }

    /// Run one step on an already computed `error` and return the raw correction
    /// `kp * e + ki * I + kd * (e - e_prev)`.
    pub fn update(&mut self, error: f32) -> f32 {
        // ----- I term -----
        self.integral += error;

        // Anti-windup clamp
        if self.integral > self.int_limit {
            self.integral = self.int_limit;
        }
        if self.integral < -self.int_limit {
            self.integral = -self.int_limit;
        }

        // ----- D term -----
        let derivative = error - self.prev_error;
        self.prev_error = error;

        self.kp * error + self.ki * self.integral + self.kd * derivative
    }
}
