//! Signal handling for the main loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag::register;

/// Shared flag raised by SIGTERM or SIGINT.
///
/// The main loop polls it on a 50ms heartbeat, so a quiescent session still
/// notices the signal without an event arriving on the bus.
#[derive(Debug, Clone)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Registers the termination handlers.
///
/// Fails only if the OS refuses the handler; the caller treats that as a
/// startup error.
pub fn register_shutdown() -> std::io::Result<ShutdownFlag> {
    let flag = Arc::new(AtomicBool::new(false));
    // The handler only performs an atomic store, which is async-signal-safe.
    register(SIGTERM, Arc::clone(&flag))?;
    register(SIGINT, Arc::clone(&flag))?;
    Ok(ShutdownFlag(flag))
}
