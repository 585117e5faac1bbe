//! Interrupt and mode-toggle signal handling.
//!
//! The shell ignores SIGINT so only foreground children die from Ctrl-C.
//! SIGTSTP never stops anything: the shell's handler only raises a flag, and
//! every child ignores it. The loop turns that flag into a mode flip.

use anyhow::{Context, Result};
use log::debug;
use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};
use signal_hook::SigId;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub const INTERRUPT: Signal = Signal::SIGINT;
pub const TOGGLE: Signal = Signal::SIGTSTP;
pub const BROKEN_PIPE: Signal = Signal::SIGPIPE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    JobControl,
    ForegroundOnly,
}

impl Mode {
    pub fn banner(&self) -> &'static str {
        match self {
            Mode::ForegroundOnly => "entering foreground-only mode",
            Mode::JobControl => "exiting foreground-only mode",
        }
    }
}

pub struct ModeController {
    mode: Mode,
    pending: Arc<AtomicBool>,
    handler: Option<SigId>,
}

impl ModeController {
    /// A controller with no handler attached; the flag can still be raised
    /// through [`ModeController::pending_flag`].
    pub fn new() -> Self {
        Self {
            mode: Mode::JobControl,
            pending: Arc::new(AtomicBool::new(false)),
            handler: None,
        }
    }

    /// Routes the toggle signal to the pending flag. The handler does nothing else.
    pub fn install_toggle_handler(&mut self) -> Result<()> {
        if self.handler.is_none() {
            let id = signal_hook::flag::register(TOGGLE as i32, Arc::clone(&self.pending))
                .context("Failed to install SIGTSTP handler")?;
            self.handler = Some(id);
        }
        Ok(())
    }

    pub fn pending_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.pending)
    }

    #[cfg(test)]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn foreground_only(&self) -> bool {
        self.mode == Mode::ForegroundOnly
    }

    /// Clears the pending flag and flips the mode once, however many signals
    /// arrived since the last call. Returns the new mode if a flip happened.
    pub fn consume_toggle(&mut self) -> Option<Mode> {
        if !self.pending.swap(false, Ordering::SeqCst) {
            return None;
        }
        self.mode = match self.mode {
            Mode::JobControl => Mode::ForegroundOnly,
            Mode::ForegroundOnly => Mode::JobControl,
        };
        debug!("mode toggled to {:?}", self.mode);
        Some(self.mode)
    }
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ModeController {
    fn drop(&mut self) {
        if let Some(id) = self.handler.take() {
            signal_hook::low_level::unregister(id);
        }
    }
}

/// Makes the calling process immune to the interrupt signal. Children inherit this.
pub fn ignore_interrupt() -> Result<()> {
    let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());
    unsafe { sigaction(INTERRUPT, &ignore) }.context("Failed to ignore SIGINT")?;
    Ok(())
}

/// Dispositions for a freshly forked child, before exec.
///
/// SIGPIPE goes back to default because the Rust runtime ignores it in the
/// shell and an ignored disposition survives exec. Only calls sigaction, so
/// it is safe between fork and exec.
pub fn reset_for_child(foreground: bool) -> nix::Result<()> {
    let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());
    let default = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty());
    unsafe { sigaction(TOGGLE, &ignore) }?;
    unsafe { sigaction(BROKEN_PIPE, &default) }?;
    if foreground {
        unsafe { sigaction(INTERRUPT, &default) }?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::raise;
    use serial_test::serial;

    #[test]
    fn test_no_flip_without_signal() {
        let mut ctl = ModeController::new();
        assert_eq!(ctl.consume_toggle(), None);
        assert_eq!(ctl.mode(), Mode::JobControl);
        assert!(!ctl.foreground_only());
    }

    #[test]
    fn test_flag_alternates_mode() {
        let mut ctl = ModeController::new();
        let flag = ctl.pending_flag();

        flag.store(true, Ordering::SeqCst);
        assert_eq!(ctl.consume_toggle(), Some(Mode::ForegroundOnly));
        assert!(ctl.foreground_only());

        flag.store(true, Ordering::SeqCst);
        assert_eq!(ctl.consume_toggle(), Some(Mode::JobControl));
        assert!(!ctl.foreground_only());
    }

    #[test]
    #[serial]
    fn test_repeated_signals_coalesce() {
        let mut ctl = ModeController::new();
        ctl.install_toggle_handler().unwrap();

        raise(TOGGLE).unwrap();
        raise(TOGGLE).unwrap();

        assert_eq!(ctl.consume_toggle(), Some(Mode::ForegroundOnly));
        assert_eq!(ctl.consume_toggle(), None);
        assert_eq!(ctl.mode(), Mode::ForegroundOnly);
    }

    #[test]
    fn test_banners() {
        assert_eq!(Mode::ForegroundOnly.banner(), "entering foreground-only mode");
        assert_eq!(Mode::JobControl.banner(), "exiting foreground-only mode");
    }
}
