//! STM32F103 clock discovery
//!
//! The firmware runs on the reset clock tree (HSI, no prescaling). A
//! bootloader may have left the PLL or bus prescalers running, so [`init`]
//! switches back to HSI when needed and then decodes RCC_CFGR, which keeps
//! the timer periods checked by the firmware build valid.

use crate::pac;

/// Internal RC oscillator
pub const HSI_HZ: u32 = 8_000_000;

/// Crystal on the usual STM32F103 boards
pub const HSE_HZ: u32 = 8_000_000;

/// Clock tree selection as read back from RCC_CFGR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClockConfig {
    /// SWS: 0 HSI, 1 HSE, 2 PLL
    pub sws: u8,
    /// HPRE: AHB prescaler code
    pub hpre: u8,
    /// PPRE1: APB1 prescaler code
    pub ppre1: u8,
    /// PLLSRC: PLL fed from HSE instead of HSI/2
    pub pll_from_hse: bool,
    /// PLLXTPRE: HSE halved before the PLL
    pub hse_halved: bool,
    /// PLLMUL: multiplier code, factor is code + 2
    pub pllmul: u8,
}

impl ClockConfig {
    /// Read the running configuration
    pub fn read(rcc: &pac::rcc::RegisterBlock) -> Self {
        let cfgr = rcc.cfgr().read();
        Self {
            sws: cfgr.sws().bits(),
            hpre: cfgr.hpre().bits(),
            ppre1: cfgr.ppre1().bits(),
            pll_from_hse: cfgr.pllsrc().bit_is_set(),
            hse_halved: cfgr.pllxtpre().bit_is_set(),
            pllmul: cfgr.pllmul().bits(),
        }
    }

    /// HSI drives SYSCLK with AHB and APB1 undivided
    pub fn is_reset_tree(&self) -> bool {
        self.sws == 0 && self.hpre < 0b1000 && self.ppre1 < 0b100
    }

    fn pll_hz(&self) -> u32 {
        let input = match (self.pll_from_hse, self.hse_halved) {
            (false, _) => HSI_HZ / 2,
            (true, true) => HSE_HZ / 2,
            (true, false) => HSE_HZ,
        };
        input * (self.pllmul as u32 + 2).min(16)
    }
}

/// Clock frequencies of the running clock tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Clocks {
    pub sysclk_hz: u32,
    pub pclk1_hz: u32,
    /// Clock feeding TIM2..TIM5
    pub timer_hz: u32,
}

impl Clocks {
    /// Derive the frequencies from a clock tree selection
    pub fn from_config(config: &ClockConfig) -> Self {
        let sysclk_hz = match config.sws {
            0b01 => HSE_HZ,
            0b10 => config.pll_hz(),
            _ => HSI_HZ,
        };

        let ahb_div = match config.hpre {
            0b1000..=0b1011 => 2 << (config.hpre - 0b1000),
            0b1100..=0b1111 => 64 << (config.hpre - 0b1100),
            _ => 1,
        };
        let hclk_hz = sysclk_hz / ahb_div;

        let apb1_div = match config.ppre1 {
            0b100..=0b111 => 2 << (config.ppre1 - 0b100),
            _ => 1,
        };
        let pclk1_hz = hclk_hz / apb1_div;

        // Timers run at twice PCLK1 whenever APB1 is divided
        let timer_hz = if apb1_div == 1 { pclk1_hz } else { pclk1_hz * 2 };

        Self {
            sysclk_hz,
            pclk1_hz,
            timer_hz,
        }
    }
}

/// Put SYSCLK back on HSI with AHB and APB1 undivided
fn fall_back_to_hsi(rcc: &pac::rcc::RegisterBlock) {
    rcc.cr().modify(|_, w| w.hsion().set_bit());
    while rcc.cr().read().hsirdy().bit_is_clear() {}

    // SAFETY: 0 selects HSI and /1 for all three fields.
    rcc.cfgr()
        .modify(|_, w| unsafe { w.sw().bits(0).hpre().bits(0).ppre1().bits(0) });
    while rcc.cfgr().read().sws().bits() != 0 {}
}

/// Bring the clock tree to its reset state and report it
pub fn init() -> Clocks {
    // SAFETY: called once during start-up, before any driver uses RCC.
    let rcc = unsafe { &*pac::RCC::ptr() };

    if !ClockConfig::read(rcc).is_reset_tree() {
        #[cfg(feature = "defmt")]
        defmt::warn!("clock tree left configured, switching back to HSI");
        fall_back_to_hsi(rcc);
    }
    let clocks = Clocks::from_config(&ClockConfig::read(rcc));

    #[cfg(feature = "defmt")]
    defmt::info!(
        "STM32F103 clocks: SYSCLK {=u32} Hz, timers {=u32} Hz",
        clocks.sysclk_hz,
        clocks.timer_hz
    );

    clocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_value_is_plain_hsi() {
        let clocks = Clocks::from_config(&ClockConfig::default());
        assert_eq!(clocks.sysclk_hz, 8_000_000);
        assert_eq!(clocks.pclk1_hz, 8_000_000);
        assert_eq!(clocks.timer_hz, 8_000_000);
    }

    #[test]
    fn test_reset_tree_detection() {
        assert!(ClockConfig::default().is_reset_tree());

        let pll = ClockConfig {
            sws: 0b10,
            ..ClockConfig::default()
        };
        let ahb_divided = ClockConfig {
            hpre: 0b1000,
            ..ClockConfig::default()
        };
        let apb1_divided = ClockConfig {
            ppre1: 0b100,
            ..ClockConfig::default()
        };
        assert!(!pll.is_reset_tree());
        assert!(!ahb_divided.is_reset_tree());
        assert!(!apb1_divided.is_reset_tree());

        // A running PLL that does not drive SYSCLK is left alone
        let idle_pll = ClockConfig {
            pll_from_hse: true,
            pllmul: 0b0111,
            ..ClockConfig::default()
        };
        assert!(idle_pll.is_reset_tree());
        assert_eq!(Clocks::from_config(&idle_pll).timer_hz, HSI_HZ);
    }

    #[test]
    fn test_72mhz_pll_with_apb1_halved() {
        let config = ClockConfig {
            sws: 0b10,
            ppre1: 0b100,
            pll_from_hse: true,
            pllmul: 0b0111,
            ..ClockConfig::default()
        };
        let clocks = Clocks::from_config(&config);

        assert_eq!(clocks.sysclk_hz, 72_000_000);
        assert_eq!(clocks.pclk1_hz, 36_000_000);
        assert_eq!(clocks.timer_hz, 72_000_000);
    }

    #[test]
    fn test_hsi_pll_and_ahb_prescaler() {
        // HSI/2 x16, AHB /4
        let config = ClockConfig {
            sws: 0b10,
            hpre: 0b1001,
            pllmul: 0b1111,
            ..ClockConfig::default()
        };
        let clocks = Clocks::from_config(&config);

        assert_eq!(clocks.sysclk_hz, 64_000_000);
        assert_eq!(clocks.pclk1_hz, 16_000_000);
        assert_eq!(clocks.timer_hz, 16_000_000);
    }

    #[test]
    fn test_halved_hse_feeds_pll() {
        let config = ClockConfig {
            sws: 0b10,
            pll_from_hse: true,
            hse_halved: true,
            pllmul: 0b0100,
            ..ClockConfig::default()
        };
        assert_eq!(Clocks::from_config(&config).sysclk_hz, 24_000_000);
    }

    #[test]
    fn test_deep_prescalers() {
        // HSE, AHB /512, APB1 /16
        let config = ClockConfig {
            sws: 0b01,
            hpre: 0b1111,
            ppre1: 0b111,
            ..ClockConfig::default()
        };
        let clocks = Clocks::from_config(&config);

        assert_eq!(clocks.pclk1_hz, 8_000_000 / 512 / 16);
        assert_eq!(clocks.timer_hz, clocks.pclk1_hz * 2);
    }
}
