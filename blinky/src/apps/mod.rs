//! Applications

pub mod button;
pub mod led;
