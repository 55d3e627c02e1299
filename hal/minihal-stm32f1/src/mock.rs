//! Recording SDK used by the driver tests

use core::cell::Cell;

use heapless::Vec;

use crate::port::Port;
use crate::sdk::{GpioInit, GpioSdk, HalStatus, Tim, TimBaseConfig, TimSdk};

/// One recorded SDK call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    GpioClock(Port),
    GpioInit(Port, u8, GpioInit),
    GpioWrite(Port, u8, bool),
    TimClock(Tim),
    TimIrq(Tim, u8),
    TimBaseInit(Tim, TimBaseConfig),
    TimStartIt(Tim),
    TimStopIt(Tim),
    TimClearFlag(Tim),
}

/// Mock SDK
///
/// Records every mutating call, loops GPIO outputs back to inputs and
/// answers timer calls with configurable statuses.
pub struct MockSdk {
    pub calls: Vec<Call, 64>,
    pub reads: Cell<u32>,
    pub lines: [u16; 5],
    pub clock_hz: u32,
    pub init_status: HalStatus,
    pub start_status: HalStatus,
}

impl MockSdk {
    pub fn new() -> Self {
        Self::with_clock(1_000_000)
    }

    pub fn with_clock(clock_hz: u32) -> Self {
        Self {
            calls: Vec::new(),
            reads: Cell::new(0),
            lines: [0; 5],
            clock_hz,
            init_status: HalStatus::Ok,
            start_status: HalStatus::Ok,
        }
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    fn record(&mut self, call: Call) {
        self.calls.push(call).expect("mock call log full");
    }
}

impl GpioSdk for MockSdk {
    fn enable_clock(&mut self, port: Port) {
        self.record(Call::GpioClock(port));
    }

    fn init(&mut self, port: Port, pin: u8, init: &GpioInit) {
        self.record(Call::GpioInit(port, pin, *init));
    }

    fn read_pin(&self, port: Port, pin: u8) -> bool {
        self.reads.set(self.reads.get() + 1);
        self.lines[port.index()] & (1 << pin) != 0
    }

    fn write_pin(&mut self, port: Port, pin: u8, high: bool) {
        self.record(Call::GpioWrite(port, pin, high));
        let line = &mut self.lines[port.index()];
        if high {
            *line |= 1 << pin;
        } else {
            *line &= !(1 << pin);
        }
    }
}

impl TimSdk for MockSdk {
    fn clock_freq(&self) -> u32 {
        self.clock_hz
    }

    fn enable_clock(&mut self, tim: Tim) {
        self.record(Call::TimClock(tim));
    }

    fn enable_irq(&mut self, tim: Tim, priority: u8) {
        self.record(Call::TimIrq(tim, priority));
    }

    fn base_init(&mut self, tim: Tim, config: &TimBaseConfig) -> HalStatus {
        self.record(Call::TimBaseInit(tim, *config));
        self.init_status
    }

    fn base_start_it(&mut self, tim: Tim) -> HalStatus {
        self.record(Call::TimStartIt(tim));
        self.start_status
    }

    fn base_stop_it(&mut self, tim: Tim) -> HalStatus {
        self.record(Call::TimStopIt(tim));
        HalStatus::Ok
    }

    fn clear_update_flag(&mut self, tim: Tim) {
        self.record(Call::TimClearFlag(tim));
    }
}
