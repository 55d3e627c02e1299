//! Recording SDK used by the driver tests

use core::cell::Cell;

use heapless::Vec;

use crate::port::{GpioBase, Port, PortBase, GPIO_BASES};
use crate::sdk::{GpioPinConfig, PortPinConfig, PortSdk, Tpm, TpmConfig, TpmSdk};

/// One recorded SDK call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    PortClock(Port),
    GpioPinInit(GpioBase, u8, GpioPinConfig),
    PortPinConfig(PortBase, u8, PortPinConfig),
    GpioWrite(GpioBase, u8, bool),
    TpmClock(Tpm),
    TpmInit(Tpm, TpmConfig),
    TpmOverflowInterrupt(Tpm),
    TpmIrq(Tpm, u8),
    TpmStop(Tpm),
    TpmClearCounter(Tpm),
    TpmSetPeriod(Tpm, u16),
    TpmStart(Tpm),
    TpmClearFlag(Tpm),
}

/// Mock SDK
///
/// Records every mutating call and loops GPIO outputs back to inputs.
pub struct MockSdk {
    pub calls: Vec<Call, 64>,
    pub reads: Cell<u32>,
    pub lines: [u32; 5],
    pub clock_hz: u32,
}

impl MockSdk {
    pub fn new() -> Self {
        Self::with_clock(8_000_000)
    }

    pub fn with_clock(clock_hz: u32) -> Self {
        Self {
            calls: Vec::new(),
            reads: Cell::new(0),
            lines: [0; 5],
            clock_hz,
        }
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    fn record(&mut self, call: Call) {
        self.calls.push(call).expect("mock call log full");
    }

    fn line_index(gpio: GpioBase) -> usize {
        GPIO_BASES
            .iter()
            .position(|&base| base == gpio.0)
            .expect("unknown GPIO base")
    }
}

impl PortSdk for MockSdk {
    fn enable_clock(&mut self, port: Port) {
        self.record(Call::PortClock(port));
    }

    fn gpio_pin_init(&mut self, gpio: GpioBase, pin: u8, config: &GpioPinConfig) {
        self.record(Call::GpioPinInit(gpio, pin, *config));
    }

    fn port_set_pin_config(&mut self, port: PortBase, pin: u8, config: &PortPinConfig) {
        self.record(Call::PortPinConfig(port, pin, *config));
    }

    fn gpio_read_pin(&self, gpio: GpioBase, pin: u8) -> bool {
        self.reads.set(self.reads.get() + 1);
        self.lines[Self::line_index(gpio)] & (1 << pin) != 0
    }

    fn gpio_write_pin(&mut self, gpio: GpioBase, pin: u8, high: bool) {
        self.record(Call::GpioWrite(gpio, pin, high));
        let line = &mut self.lines[Self::line_index(gpio)];
        if high {
            *line |= 1 << pin;
        } else {
            *line &= !(1 << pin);
        }
    }
}

impl TpmSdk for MockSdk {
    fn clock_freq(&self) -> u32 {
        self.clock_hz
    }

    fn enable_clock(&mut self, tpm: Tpm) {
        self.record(Call::TpmClock(tpm));
    }

    fn init(&mut self, tpm: Tpm, config: &TpmConfig) {
        self.record(Call::TpmInit(tpm, *config));
    }

    fn enable_overflow_interrupt(&mut self, tpm: Tpm) {
        self.record(Call::TpmOverflowInterrupt(tpm));
    }

    fn enable_irq(&mut self, tpm: Tpm, priority: u8) {
        self.record(Call::TpmIrq(tpm, priority));
    }

    fn stop(&mut self, tpm: Tpm) {
        self.record(Call::TpmStop(tpm));
    }

    fn clear_counter(&mut self, tpm: Tpm) {
        self.record(Call::TpmClearCounter(tpm));
    }

    fn set_period(&mut self, tpm: Tpm, modulo: u16) {
        self.record(Call::TpmSetPeriod(tpm, modulo));
    }

    fn start(&mut self, tpm: Tpm) {
        self.record(Call::TpmStart(tpm));
    }

    fn clear_overflow_flag(&mut self, tpm: Tpm) {
        self.record(Call::TpmClearFlag(tpm));
    }
}
