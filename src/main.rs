// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Robot firmware entry point.
//!
//! Sample batches arrive over the USART host link and are pushed through the pipeline exactly as
//! a microphone capture-complete callback would push them. The USART1 interrupt only moves
//! received bytes into [`HOST_RX`]; parsing, analysis and the wheels all run in the main loop,
//! which owns the pipeline outright. Every analysed frame is streamed back as a half spectrum.
//! Game flow is the minimal one: calibrate once on power-up, then follow.

#![no_main]
#![no_std]

use core::cell::RefCell;

use cortex_m::interrupt::{self as cm_interrupt, Mutex};
use cortex_m::peripheral::NVIC;
use cortex_m_rt::entry;
use log::{info, warn, LevelFilter};
use panic_halt as _;

use hal::{
    pac::{self, interrupt},
    prelude::*,
    serial::{Config, Serial},
};
use stm32f7xx_hal as hal;

use tonefollow::audio::ChannelMap;
use tonefollow::config::{PipelineConfig, FFT_SIZE, MAX_WHEEL_SPEED, MIC_STRIDE, SAMPLES_PER_CALLBACK};
use tonefollow::hw::{console, BoardPins, Led, Tim4Pwm, Usart, UsartRx, Wheels};
use tonefollow::motors::DifferentialDrive;
use tonefollow::pipeline::{ControlSurface, Pipeline};
use tonefollow::protocol::{send_f32s, ByteQueue, Parser, Received};

const CHANNELS: usize = 4;
/// Largest batch accepted from the host: one callback's worth of interleaved samples.
const HOST_BATCH: usize = SAMPLES_PER_CALLBACK * MIC_STRIDE;
/// Bins streamed per frame; the upper half mirrors the lower one.
const STREAM_BINS: usize = FFT_SIZE / 2;
/// Received bytes buffered while the loop is busy; a streamed spectrum takes about 22 ms.
const HOST_RX_CAPACITY: usize = 8192;
const WHEEL_PWM_HZ: u32 = 20_000;

#[derive(Copy, Clone, PartialEq, Eq)]
enum Phase {
    Calibrating,
    Following,
}

static SURFACE: ControlSurface = ControlSurface::new();
static HOST_RX: ByteQueue<HOST_RX_CAPACITY> = ByteQueue::new();
static HOST_UART: Mutex<RefCell<Option<UsartRx<pac::USART1>>>> = Mutex::new(RefCell::new(None));

#[interrupt]
fn USART1() {
    cm_interrupt::free(|cs| {
        if let Some(rx) = HOST_UART.borrow(cs).borrow_mut().as_mut() {
            while let Some(byte) = rx.read_byte() {
                HOST_RX.push(byte);
            }
            if rx.take_errors() > 0 {
                HOST_RX.mark_lost();
            }
        }
    });
}

/// Capture-complete entry point for one interleaved batch.
fn capture_complete<D: DifferentialDrive>(
    pipeline: &mut Pipeline<'static, CHANNELS, FFT_SIZE>,
    wheels: &mut D,
    samples: &[i16],
) {
    pipeline.process(samples, wheels);
}

#[entry]
fn main() -> ! {
    // Peripherals
    let Some(dp) = pac::Peripherals::take() else {
        panic!("peripherals already taken");
    };

    // Clocks
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze();

    let pins = BoardPins::new(dp.GPIOA, dp.GPIOD);

    // LED
    let mut led_red = Led::active_low(pins.leds.red);
    let mut led_yellow = Led::active_low(pins.leds.yellow);
    let mut led_green = Led::active_low(pins.leds.green);

    // USART1 (DBG + host link)
    let usart_cfg = Config {
        baud_rate: 921_600.bps(),
        ..Default::default()
    };
    let serial = Serial::new(
        dp.USART1,
        (pins.usart1.tx, pins.usart1.rx),
        &clocks,
        usart_cfg,
    );
    let (tx, rx) = Usart::new(serial);
    console::init(tx, LevelFilter::Info);

    // Wheels on TIM4; the pins only need to be in AF2.
    let _wheel_pins = pins.wheels;
    let mut wheels = Wheels::new(Tim4Pwm::new(dp.TIM4, &clocks, WHEEL_PWM_HZ), MAX_WHEEL_SPEED);

    let config = PipelineConfig::new(ChannelMap::FOUR_MICS);
    let mut pipeline = match Pipeline::new(config, &SURFACE) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            led_red.on();
            panic!("invalid pipeline configuration: {}", e);
        }
    };

    // Host link receive interrupt. RXNEIE also raises the interrupt on overrun.
    cm_interrupt::free(|cs| {
        HOST_UART.borrow(cs).replace(Some(rx));
    });
    unsafe {
        (*pac::USART1::ptr()).cr1.modify(|_, w| w.rxneie().set_bit());
        NVIC::unmask(pac::Interrupt::USART1);
    }

    let mut parser = Parser::<HOST_BATCH>::new();
    let mut frames = SURFACE.frame_ready.subscribe();

    let mut phase = Phase::Calibrating;
    SURFACE.set_calibration(true);
    led_yellow.on();
    info!("calibrating, hold the tone");

    loop {
        while let Some(received) = HOST_RX.pop() {
            match received {
                Received::Byte(byte) => {
                    if let Some(batch) = parser.push(byte) {
                        capture_complete(&mut pipeline, &mut wheels, batch);
                    }
                }
                Received::Gap(lost) => {
                    warn!("host link gap ({} lost), resyncing", lost);
                    parser.reset();
                }
            }
        }

        if frames.try_take().is_none() {
            continue;
        }

        let spectrum = &pipeline.spectra().combined()[..STREAM_BINS];
        console::with_tx(|tx| send_f32s(tx, spectrum));

        if phase == Phase::Calibrating && !SURFACE.calibration_active() {
            phase = Phase::Following;
            SURFACE.set_audio_command(true);
            led_yellow.off();
            led_green.on();
            info!("calibrated, following");
        }
        if phase == Phase::Following {
            led_green.toggle();
        }
    }
}
