//! Board configuration generated from blinky.toml

include!(concat!(env!("OUT_DIR"), "/config.rs"));
