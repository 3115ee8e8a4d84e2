//! Ctrl-C handling.
//!
//! On a serial link the first interrupt lets the current command finish so
//! the port is closed cleanly; a second one exits at once. The web channel
//! holds nothing that needs releasing and may be stuck on a request without
//! a timeout, so it exits on the first interrupt.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::control::TransportKind;

/// Exit status used when the process is stopped by an interrupt (128 + SIGINT).
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// What the interrupt handler should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptAction {
    /// Finish the command in flight, then stop and close the channel.
    StopAfterCurrent,
    /// Leave immediately with [`INTERRUPTED_EXIT_CODE`].
    ExitNow,
}

/// Record an interrupt in `flag` and decide how to react to it.
pub fn on_interrupt(flag: &AtomicBool, transport: TransportKind) -> InterruptAction {
    let repeated = flag.swap(true, Ordering::SeqCst);
    if repeated || transport == TransportKind::Web {
        InterruptAction::ExitNow
    } else {
        InterruptAction::StopAfterCurrent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_stops_gracefully_then_exits_on_second_interrupt() {
        let flag = AtomicBool::new(false);
        assert_eq!(on_interrupt(&flag, TransportKind::Serial), InterruptAction::StopAfterCurrent);
        assert!(flag.load(Ordering::SeqCst));
        assert_eq!(on_interrupt(&flag, TransportKind::Serial), InterruptAction::ExitNow);
    }

    #[test]
    fn web_exits_on_first_interrupt() {
        let flag = AtomicBool::new(false);
        assert_eq!(on_interrupt(&flag, TransportKind::Web), InterruptAction::ExitNow);
        assert!(flag.load(Ordering::SeqCst));
    }
}
