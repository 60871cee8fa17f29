// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Per-cycle pipeline driver.
//!
//! [`Pipeline::process`] is the single unit of work run for every capture batch, whether it comes
//! from the microphone callback or from the host link. Callers running it from more than one
//! context must serialise those calls. On the board only the host-link loop calls it, and the
//! receive interrupt just queues bytes.
//!
//! Typical usage pattern:
//!
//! ```no_run
//! # use tonefollow::audio::ChannelMap;
//! # use tonefollow::config::PipelineConfig;
//! # use tonefollow::motors::DifferentialDrive;
//! # use tonefollow::pipeline::{ControlSurface, Pipeline};
//! # struct Wheels;
//! # impl DifferentialDrive for Wheels { fn set_speeds(&mut self, _: i16, _: i16) {} }
//! # let (mut wheels, batch) = (Wheels, [0i16; 640]);
//! static SURFACE: ControlSurface = ControlSurface::new();
//!
//! let config = PipelineConfig::new(ChannelMap::FOUR_MICS);
//! let mut pipeline = Pipeline::<4, 1024>::new(config, &SURFACE).unwrap();
//!
//! SURFACE.set_audio_command(true);
//! // In the capture-complete callback:
//! pipeline.process(&batch, &mut wheels);
//! ```

use log::{trace, warn};

use crate::audio::{SampleAccumulator, SpectralAnalyzer, SpectrumFrame};
use crate::config::{ConfigError, PipelineConfig};
use crate::control::{CalibrationEvent, Calibrator, SteeringController};
use crate::motors::{DifferentialDrive, WheelCommand};
use crate::pipeline::ControlSurface;

/// Outcome of one analysed frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CycleReport {
    /// Sequence number published on the frame-ready signal.
    pub frame: u32,
    pub calibration: CalibrationEvent,
    /// Steering output before saturation.
    pub command: WheelCommand,
    /// Whether the command was written to the wheels.
    pub applied: bool,
}

/// Accumulator, analyser, calibrator and steering controller of one robot.
pub struct Pipeline<'a, const CH: usize, const N: usize> {
    config: PipelineConfig<CH>,
    surface: &'a ControlSurface,

    accumulator: SampleAccumulator<CH, N>,
    analyzer: SpectralAnalyzer<CH, N>,
    calibrator: Calibrator,
    steering: SteeringController,

    /// Command flag as seen on the previous frame, to stop the wheels once on disable.
    command_was_enabled: bool,
}

impl<'a, const CH: usize, const N: usize> Pipeline<'a, CH, N> {
    /// Validate `config` against the frame size `N` and build a pipeline bound to `surface`.
    pub fn new(config: PipelineConfig<CH>, surface: &'a ControlSurface) -> Result<Self, ConfigError> {
        if let Err(e) = config.validate(N) {
            warn!("pipeline configuration rejected: {}", e);
            return Err(e);
        }

        Ok(Self {
            config,
            surface,
            accumulator: SampleAccumulator::new(config.channels),
            analyzer: SpectralAnalyzer::new(),
            calibrator: Calibrator::new(config.calibration, config.min_value_threshold),
            steering: SteeringController::new(config.steering, config.min_value_threshold),
            command_was_enabled: false,
        })
    }

    /// Feed one capture batch; runs analysis and control when it completes a frame.
    ///
    /// Returns `None` while the frame is still filling up.
    pub fn process<D>(&mut self, samples: &[i16], drive: &mut D) -> Option<CycleReport>
    where
        D: DifferentialDrive + ?Sized,
    {
        let frame = self.accumulator.accumulate(samples)?;
        let spectrum = self.analyzer.analyze(frame);

        let flags = &self.surface.flags;
        let calibrating = flags.calibration_enabled();
        let command_enabled = flags.audio_command_enabled();

        let calibration = self.calibrator.step(calibrating, spectrum);
        if let CalibrationEvent::Committed { .. } = calibration {
            flags.set_calibration(false);
        }

        let command = self
            .steering
            .step(command_enabled, self.calibrator.target_bin(), spectrum);

        // After the command flag drops, one stop is sent and the wheels are left to others.
        let applied = command_enabled || self.command_was_enabled;
        if applied {
            let (left, right) = command.to_steps(self.config.max_wheel_speed);
            drive.set_speeds(left, right);
        }
        self.command_was_enabled = command_enabled;

        let frame = self.surface.frame_ready.publish();
        trace!(
            "frame {}: {:?}, wheels {:?}",
            frame,
            calibration,
            command
        );

        Some(CycleReport {
            frame,
            calibration,
            command,
            applied,
        })
    }

    #[inline]
    pub fn config(&self) -> &PipelineConfig<CH> {
        &self.config
    }

    #[inline]
    pub fn surface(&self) -> &'a ControlSurface {
        self.surface
    }

    /// Spectra of the most recently completed frame.
    #[inline]
    pub fn spectra(&self) -> &SpectrumFrame<CH, N> {
        self.analyzer.spectra()
    }

    /// Currently committed target bin.
    #[inline]
    pub fn target_bin(&self) -> usize {
        self.calibrator.target_bin()
    }

    /// Frames analysed so far.
    #[inline]
    pub fn frames(&self) -> u32 {
        self.surface.frame_ready.latest()
    }

    /// Accumulator write position in scalar slots.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.accumulator.cursor()
    }

    #[inline]
    pub fn calibrator(&self) -> &Calibrator {
        &self.calibrator
    }

    #[inline]
    pub fn steering(&self) -> &SteeringController {
        &self.steering
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::ChannelMap;
    use crate::config::CalibrationConfig;
    use std::vec::Vec;

    #[derive(Default)]
    struct Recorder {
        writes: Vec<(i16, i16)>,
    }

    impl DifferentialDrive for Recorder {
        fn set_speeds(&mut self, left: i16, right: i16) {
            self.writes.push((left, right));
        }
    }

    const N: usize = 64;

    fn silence(groups: usize) -> Vec<i16> {
        std::vec![0; groups * 4]
    }

    #[test]
    fn rejects_invalid_configuration() {
        let surface = ControlSurface::new();
        let config = PipelineConfig::new(ChannelMap::FOUR_MICS)
            .with_calibration(CalibrationConfig::new().with_band(8, 40));
        assert!(Pipeline::<4, N>::new(config, &surface).is_err());
    }

    #[test]
    fn runs_once_per_frame_and_publishes() {
        let surface = ControlSurface::new();
        let mut sub = surface.frame_ready.subscribe();
        let mut pipeline =
            Pipeline::<4, N>::new(PipelineConfig::new(ChannelMap::FOUR_MICS), &surface).unwrap();
        let mut wheels = Recorder::default();

        assert!(pipeline.process(&silence(40), &mut wheels).is_none());
        assert_eq!(sub.try_take(), None);

        let report = pipeline.process(&silence(40), &mut wheels).unwrap();
        assert_eq!(report.frame, 1);
        assert_eq!(sub.try_take(), Some(1));
        assert_eq!(pipeline.frames(), 1);
        assert_eq!(pipeline.cursor(), 0);
    }

    #[test]
    fn wheels_untouched_while_command_never_enabled() {
        let surface = ControlSurface::new();
        let mut pipeline =
            Pipeline::<4, N>::new(PipelineConfig::new(ChannelMap::FOUR_MICS), &surface).unwrap();
        let mut wheels = Recorder::default();

        for _ in 0..3 {
            let report = pipeline.process(&silence(N), &mut wheels).unwrap();
            assert!(!report.applied);
        }
        assert!(wheels.writes.is_empty());
    }

    #[test]
    fn silence_stops_while_enabled_and_once_after_disable() {
        let surface = ControlSurface::new();
        let mut pipeline =
            Pipeline::<4, N>::new(PipelineConfig::new(ChannelMap::FOUR_MICS), &surface).unwrap();
        let mut wheels = Recorder::default();

        surface.set_audio_command(true);
        pipeline.process(&silence(N), &mut wheels);
        pipeline.process(&silence(N), &mut wheels);
        surface.set_audio_command(false);
        pipeline.process(&silence(N), &mut wheels);
        pipeline.process(&silence(N), &mut wheels);

        assert_eq!(wheels.writes, [(0, 0), (0, 0), (0, 0)]);
    }

    #[test]
    fn calibration_flag_is_left_alone_without_tone() {
        let surface = ControlSurface::new();
        let mut pipeline =
            Pipeline::<4, N>::new(PipelineConfig::new(ChannelMap::FOUR_MICS), &surface).unwrap();
        let mut wheels = Recorder::default();

        surface.set_calibration(true);
        for _ in 0..5 {
            let report = pipeline.process(&silence(N), &mut wheels).unwrap();
            assert_eq!(report.calibration, CalibrationEvent::NoPeak);
        }
        assert!(surface.calibration_active());
        assert_eq!(pipeline.target_bin(), 15);
    }
}
