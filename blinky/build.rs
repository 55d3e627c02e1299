//! Build script for blinky
//!
//! - Checks exactly one target feature is enabled
//! - Places the target's memory.x and device.x on the linker search path
//! - Validates blinky.toml and turns it into constants (`config.rs`)

use std::env;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

#[path = "build/frame.rs"]
mod frame;

/// Longest blink period list the firmware stores
const MAX_PERIODS: usize = 8;

/// Per-target limits used while validating the config
struct Target {
    /// Section name in blinky.toml
    name: &'static str,
    max_pin: i64,
    /// Exclusive upper bound of a timer period at the reset clock
    max_period_ms: i64,
    memory_x: &'static [u8],
    /// Interrupt defaults, unless the target's PAC ships its own
    device_x: Option<&'static [u8]>,
}

static TARGETS: [(&str, Target); 2] = [
    (
        "CARGO_FEATURE_KL25",
        Target {
            name: "kl25",
            max_pin: 31,
            // 8 MHz OSCERCLK / 128 into 16 bits
            max_period_ms: 1048,
            memory_x: include_bytes!("memory-kl25.x"),
            device_x: Some(include_bytes!("device-kl25.x")),
        },
    ),
    (
        "CARGO_FEATURE_STM32F103",
        Target {
            name: "stm32f103",
            max_pin: 15,
            // 8 MHz HSI / 1024 into 16 bits; board init falls back to HSI
            max_period_ms: 8388,
            memory_x: include_bytes!("memory-stm32f103.x"),
            device_x: None,
        },
    ),
];

fn main() {
    let target = select_target();
    setup_linker(target);
    let config = validate_config(target);
    generate_config(&config);
}

/// Pick the target from the enabled cargo feature
fn select_target() -> &'static Target {
    let mut selected: Option<&'static Target> = None;

    for (var, target) in &TARGETS {
        if env::var_os(var).is_some() {
            if let Some(previous) = selected {
                fail(
                    "Multiple target features enabled",
                    &[format!(
                        "Both '{}' and '{}' are enabled, pick one",
                        previous.name, target.name
                    )],
                );
            }
            selected = Some(target);
        }
    }

    match selected {
        Some(target) => target,
        None => fail(
            "No target feature enabled",
            &["Build with --features kl25 or --features stm32f103".to_string()],
        ),
    }
}

/// Set up linker search paths for memory.x and device.x
fn setup_linker(target: &Target) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(target.memory_x).unwrap();
    if let Some(device_x) = target.device_x {
        let mut f = File::create(out_dir.join("device.x")).unwrap();
        f.write_all(device_x).unwrap();
    }

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory-kl25.x");
    println!("cargo:rerun-if-changed=memory-stm32f103.x");
    println!("cargo:rerun-if-changed=device-kl25.x");
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=build/frame.rs");
}

/// Pin wiring taken from `[<target>.led]` / `[<target>.button]`
struct PinConfig {
    port: u8,
    pin: u8,
    active_low: bool,
    pull: &'static str,
}

/// Validated configuration
struct Config {
    led: PinConfig,
    button: PinConfig,
    periods_ms: Vec<u32>,
    sample_ms: u32,
    debounce_samples: u8,
}

/// Validate blinky.toml at compile time
fn validate_config(target: &Target) -> Config {
    println!("cargo:rerun-if-changed=blinky.toml");

    let config_path = Path::new("blinky.toml");
    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read blinky.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in blinky.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();

    let periods_ms = validate_periods(&config, target, &mut errors);
    let (sample_ms, debounce_samples) = validate_button_timing(&config, target, &mut errors);
    let led = validate_pin(&config, target, "led", &mut errors);
    let button = validate_pin(&config, target, "button", &mut errors);

    if !errors.is_empty() {
        fail("Invalid configuration in blinky.toml", &errors);
    }

    println!(
        "cargo:warning=blinky.toml validated successfully ({})",
        target.name
    );

    Config {
        led,
        button,
        periods_ms,
        sample_ms,
        debounce_samples,
    }
}

fn validate_periods(config: &toml::Value, target: &Target, errors: &mut Vec<String>) -> Vec<u32> {
    let periods = match config.get("blink").and_then(|b| b.get("periods_ms")) {
        Some(toml::Value::Array(periods)) => periods,
        Some(_) => {
            errors.push("[blink] periods_ms must be an array".to_string());
            return Vec::new();
        }
        None => {
            errors.push("[blink] missing 'periods_ms'".to_string());
            return Vec::new();
        }
    };

    if periods.is_empty() {
        errors.push("[blink] periods_ms cannot be empty".to_string());
    }
    if periods.len() > MAX_PERIODS {
        errors.push(format!(
            "[blink] periods_ms holds at most {} entries",
            MAX_PERIODS
        ));
    }

    let mut valid = Vec::new();
    for (i, period) in periods.iter().enumerate() {
        match period {
            toml::Value::Integer(ms) if *ms > 0 && *ms < target.max_period_ms => {
                valid.push(*ms as u32)
            }
            toml::Value::Integer(_) => errors.push(format!(
                "[blink] periods_ms[{}] must be 1-{} on {}",
                i,
                target.max_period_ms - 1,
                target.name
            )),
            _ => errors.push(format!("[blink] periods_ms[{}] must be an integer", i)),
        }
    }
    valid
}

fn validate_button_timing(
    config: &toml::Value,
    target: &Target,
    errors: &mut Vec<String>,
) -> (u32, u8) {
    let button = config.get("button");

    let sample_ms = match button.and_then(|b| b.get("sample_ms")) {
        Some(toml::Value::Integer(ms)) if *ms > 0 && *ms < target.max_period_ms => *ms as u32,
        Some(_) => {
            errors.push(format!(
                "[button] sample_ms must be 1-{} on {}",
                target.max_period_ms - 1,
                target.name
            ));
            0
        }
        None => {
            errors.push("[button] missing 'sample_ms'".to_string());
            0
        }
    };

    let debounce_samples = match button.and_then(|b| b.get("debounce_samples")) {
        Some(toml::Value::Integer(n)) if (1..=32).contains(n) => *n as u8,
        Some(_) => {
            errors.push("[button] debounce_samples must be 1-32".to_string());
            0
        }
        None => {
            errors.push("[button] missing 'debounce_samples'".to_string());
            0
        }
    };

    (sample_ms, debounce_samples)
}

fn validate_pin(
    config: &toml::Value,
    target: &Target,
    role: &str,
    errors: &mut Vec<String>,
) -> PinConfig {
    let section = format!("[{}.{}]", target.name, role);
    let mut pin_config = PinConfig {
        port: 0,
        pin: 0,
        active_low: false,
        pull: "None",
    };

    let table = match config.get(target.name).and_then(|t| t.get(role)) {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push(format!("{} must be a table", section));
            return pin_config;
        }
        None => {
            errors.push(format!("Missing {} section", section));
            return pin_config;
        }
    };

    match table.get("port") {
        Some(toml::Value::String(port)) => match port.as_str() {
            "A" | "B" | "C" | "D" | "E" => pin_config.port = port.as_bytes()[0] - b'A',
            _ => errors.push(format!("{} port must be 'A'-'E'", section)),
        },
        _ => errors.push(format!("{} missing 'port'", section)),
    }

    match table.get("pin") {
        Some(toml::Value::Integer(pin)) if (0..=target.max_pin).contains(pin) => {
            pin_config.pin = *pin as u8
        }
        Some(_) => errors.push(format!("{} pin must be 0-{}", section, target.max_pin)),
        None => errors.push(format!("{} missing 'pin'", section)),
    }

    match table.get("active_low") {
        Some(toml::Value::Boolean(active_low)) => pin_config.active_low = *active_low,
        Some(_) => errors.push(format!("{} active_low must be true or false", section)),
        None => errors.push(format!("{} missing 'active_low'", section)),
    }

    if let Some(pull) = table.get("pull") {
        match pull.as_str() {
            Some("none") => pin_config.pull = "None",
            Some("up") => pin_config.pull = "Up",
            Some("down") => pin_config.pull = "Down",
            _ => errors.push(format!("{} pull must be 'none', 'up', or 'down'", section)),
        }
    }

    pin_config
}

/// Write the validated config as Rust constants
fn generate_config(config: &Config) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mut code = String::from("// Generated from blinky.toml by build.rs\n\n");

    for (prefix, pin) in [("LED", &config.led), ("BUTTON", &config.button)] {
        writeln!(code, "pub const {}_PORT: u8 = {};", prefix, pin.port).unwrap();
        writeln!(code, "pub const {}_PIN: u8 = {};", prefix, pin.pin).unwrap();
        writeln!(code, "pub const {}_ACTIVE_LOW: bool = {};", prefix, pin.active_low).unwrap();
    }
    writeln!(
        code,
        "pub const BUTTON_PULL: minihal::Pull = minihal::Pull::{};",
        config.button.pull
    )
    .unwrap();
    writeln!(code, "pub const SAMPLE_PERIOD_MS: u32 = {};", config.sample_ms).unwrap();
    writeln!(code, "pub const DEBOUNCE_SAMPLES: u8 = {};", config.debounce_samples).unwrap();
    writeln!(code, "pub const MAX_PERIODS: usize = {};", MAX_PERIODS).unwrap();
    writeln!(
        code,
        "pub const BLINK_PERIODS_MS: &[u32] = &{:?};",
        config.periods_ms
    )
    .unwrap();

    fs::write(out_dir.join("config.rs"), code).unwrap();
}

/// Abort the build with a framed error message
fn fail(title: &str, lines: &[String]) -> ! {
    panic!("{}", frame::framed(title, lines));
}
