//! Interrupt handling
//!
//! SIGINT and SIGTERM only raise a flag. The analyzer polls it between
//! timestamps and stops pulling from the source, so the windows and buckets
//! collected so far are still reported.

use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::os::raw::c_int;
use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_interrupt(_signum: c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Install the interrupt handler for SIGINT and SIGTERM
pub fn install_interrupt_handler() -> nix::Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(on_interrupt),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    for sig in [Signal::SIGINT, Signal::SIGTERM] {
        // SAFETY: the handler only stores to an atomic, which is async-signal-safe.
        unsafe { signal::sigaction(sig, &action)? };
    }
    Ok(())
}

/// Flag raised by the installed handler
pub fn interrupt_flag() -> &'static AtomicBool {
    &INTERRUPTED
}
