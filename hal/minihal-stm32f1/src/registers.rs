//! PAC-backed implementation of the STM32F103 SDK traits

use cortex_m::peripheral::NVIC;
use minihal::Pull;

use crate::pac::{self, gpioa, tim2};
use crate::port::Port;
use crate::sdk::{GpioInit, GpioMode, GpioSdk, HalStatus, Tim, TimBaseConfig, TimSdk};

/// GPIOA..GPIOE share one register layout
fn gpio_block(port: Port) -> &'static gpioa::RegisterBlock {
    let ptr = match port {
        Port::A => pac::GPIOA::ptr(),
        Port::B => pac::GPIOB::ptr(),
        Port::C => pac::GPIOC::ptr(),
        Port::D => pac::GPIOD::ptr(),
        Port::E => pac::GPIOE::ptr(),
    };
    // SAFETY: PAC pointers are valid for the whole program.
    unsafe { &*ptr }
}

/// TIM3 and TIM4 share the TIM2 register layout
fn tim_block(tim: Tim) -> &'static tim2::RegisterBlock {
    let ptr = match tim {
        Tim::Tim3 => pac::TIM3::ptr(),
        Tim::Tim4 => pac::TIM4::ptr(),
    };
    // SAFETY: PAC pointers are valid for the whole program.
    unsafe { &*ptr }
}

fn rcc() -> &'static pac::rcc::RegisterBlock {
    // SAFETY: the drivers only set their own enable bits.
    unsafe { &*pac::RCC::ptr() }
}

/// Register backend on the `stm32f1` PAC
///
/// `timer_clock_hz` is the APB1 timer clock reported by
/// [`board::init`](crate::board::init).
#[derive(Debug)]
pub struct Stm32Registers {
    timer_clock_hz: u32,
}

impl Stm32Registers {
    /// Create the backend
    ///
    /// Holds no register state, so the GPIO and timer drivers may each own one.
    pub const fn new(timer_clock_hz: u32) -> Self {
        Self { timer_clock_hz }
    }
}

impl GpioSdk for Stm32Registers {
    fn enable_clock(&mut self, port: Port) {
        rcc().apb2enr().modify(|_, w| match port {
            Port::A => w.iopaen().set_bit(),
            Port::B => w.iopben().set_bit(),
            Port::C => w.iopcen().set_bit(),
            Port::D => w.iopden().set_bit(),
            Port::E => w.iopeen().set_bit(),
        });
    }

    fn init(&mut self, port: Port, pin: u8, init: &GpioInit) {
        let gpio = gpio_block(port);

        if init.mode == GpioMode::Input {
            // ODR picks the pull direction
            match init.pull {
                Pull::Up => {
                    gpio.bsrr().write(|w| unsafe { w.bits(1 << pin) });
                }
                Pull::Down => {
                    gpio.brr().write(|w| unsafe { w.bits(1 << pin) });
                }
                Pull::None => {}
            }
        }

        let nibble = init.config_nibble();
        let shift = (pin as u32 % 8) * 4;
        let update = |bits: u32| (bits & !(0xF << shift)) | nibble << shift;
        // SAFETY: only the pin's CNF/MODE nibble changes.
        if pin < 8 {
            gpio.crl().modify(|r, w| unsafe { w.bits(update(r.bits())) });
        } else {
            gpio.crh().modify(|r, w| unsafe { w.bits(update(r.bits())) });
        }
    }

    fn read_pin(&self, port: Port, pin: u8) -> bool {
        gpio_block(port).idr().read().bits() & (1 << pin) != 0
    }

    fn write_pin(&mut self, port: Port, pin: u8, high: bool) {
        let bit = if high { 1 << pin } else { 1 << (pin as u32 + 16) };
        // SAFETY: BSRR writes are atomic per bit.
        gpio_block(port).bsrr().write(|w| unsafe { w.bits(bit) });
    }
}

impl TimSdk for Stm32Registers {
    fn clock_freq(&self) -> u32 {
        self.timer_clock_hz
    }

    fn enable_clock(&mut self, tim: Tim) {
        rcc().apb1enr().modify(|_, w| match tim {
            Tim::Tim3 => w.tim3en().set_bit(),
            Tim::Tim4 => w.tim4en().set_bit(),
        });
    }

    fn enable_irq(&mut self, tim: Tim, priority: u8) {
        let irq = tim.interrupt();
        // SAFETY: called during init before the line is live; the priority
        // write touches only this line's byte.
        unsafe {
            let mut core = cortex_m::Peripherals::steal();
            core.NVIC.set_priority(irq, priority << (8 - pac::NVIC_PRIO_BITS));
            NVIC::unpend(irq);
            NVIC::unmask(irq);
        }
    }

    fn base_init(&mut self, tim: Tim, config: &TimBaseConfig) -> HalStatus {
        let regs = tim_block(tim);
        if regs.cr1().read().cen().bit_is_set() {
            return HalStatus::Busy;
        }

        regs.cr1().write(|w| w.arpe().bit(config.auto_reload_preload));
        // SAFETY: PSC and ARR take any 16-bit value.
        regs.psc().write(|w| unsafe { w.bits(config.prescaler as u32) });
        regs.arr().write(|w| unsafe { w.bits(config.period as u32) });
        // Load PSC/ARR shadows and clear the counter, then drop the update
        // flag this raises
        regs.egr().write(|w| w.ug().set_bit());
        clear_uif(regs);

        HalStatus::Ok
    }

    fn base_start_it(&mut self, tim: Tim) -> HalStatus {
        let regs = tim_block(tim);
        if regs.cr1().read().cen().bit_is_set() {
            return HalStatus::Busy;
        }

        regs.dier().modify(|_, w| w.uie().set_bit());
        regs.cr1().modify(|_, w| w.cen().set_bit());
        HalStatus::Ok
    }

    fn base_stop_it(&mut self, tim: Tim) -> HalStatus {
        let regs = tim_block(tim);
        regs.dier().modify(|_, w| w.uie().clear_bit());
        regs.cr1().modify(|_, w| w.cen().clear_bit());
        HalStatus::Ok
    }

    fn clear_update_flag(&mut self, tim: Tim) {
        clear_uif(tim_block(tim));
    }
}

/// Clear UIF; SR bits are rc_w0, so writing 1 leaves the other flags alone
fn clear_uif(regs: &tim2::RegisterBlock) {
    // SAFETY: every SR bit except UIF is written as 1 (no effect).
    regs.sr().write(|w| unsafe { w.bits(0xFFFF & !1) });
}
