//! Kernel stub
//!
//! Stands in for a scheduler: there are no tasks, only interrupt-driven
//! timer callbacks, so the kernel just idles the core.

/// Hand the core over to the kernel
///
/// Runs `idle` and sleeps until the next interrupt, forever.
pub fn kernel_start(idle: fn()) -> ! {
    #[cfg(feature = "defmt")]
    defmt::info!("kernel started");

    loop {
        idle();
        cortex_m::asm::wfi();
    }
}
