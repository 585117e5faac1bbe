use crate::shell::ast::ExitState;
use log::{debug, warn};
use nix::errno::Errno;
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::Pid;
use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JobError {
    #[error("too many background jobs (limit is {capacity})")]
    CapacityExceeded { capacity: usize },
    #[error("background pid {0} is already tracked")]
    AlreadyTracked(Pid),
}

/// Background processes spawned by this shell and not yet reaped.
#[derive(Debug, Default)]
pub struct JobRegistry {
    pids: Vec<Pid>,
    capacity: Option<usize>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            pids: Vec::with_capacity(capacity),
            capacity: Some(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.pids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pids.is_empty()
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.pids.contains(&pid)
    }

    /// Fails when one more registration would exceed the limit.
    pub fn ensure_room(&self) -> Result<(), JobError> {
        match self.capacity {
            Some(capacity) if self.pids.len() >= capacity => {
                Err(JobError::CapacityExceeded { capacity })
            }
            _ => Ok(()),
        }
    }

    pub fn register(&mut self, pid: Pid) -> Result<(), JobError> {
        self.ensure_room()?;
        if self.contains(pid) {
            return Err(JobError::AlreadyTracked(pid));
        }
        debug!("tracking background pid {}", pid);
        self.pids.push(pid);
        Ok(())
    }

    /// Polls every tracked pid without blocking, reports and forgets the
    /// finished ones. Returns the status of the last one that finished.
    pub fn reap_all(&mut self, out: &mut dyn Write) -> io::Result<Option<ExitState>> {
        let mut last = None;
        let mut i = 0;
        while i < self.pids.len() {
            let pid = self.pids[i];
            match try_wait(pid) {
                Ok(Some(state)) => {
                    writeln!(out, "background pid {} is done: {}", pid, state)?;
                    out.flush()?;
                    debug!("reaped background pid {} ({})", pid, state);
                    self.pids.swap_remove(i);
                    last = Some(state);
                }
                Ok(None) => i += 1,
                Err(Errno::ECHILD) => {
                    warn!("background pid {} is not a child of this shell; dropping it", pid);
                    self.pids.swap_remove(i);
                }
                Err(e) => {
                    warn!("waitpid({}) failed: {}", pid, e);
                    i += 1;
                }
            }
        }
        Ok(last)
    }
}

/// Non-blocking wait. `Ok(None)` while the process is still running.
pub fn try_wait(pid: Pid) -> Result<Option<ExitState>, Errno> {
    loop {
        match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::Exited(_, code)) => return Ok(Some(ExitState::Exited(code))),
            Ok(WaitStatus::Signaled(_, sig, _)) => return Ok(Some(ExitState::Signaled(sig as i32))),
            Ok(_) => return Ok(None),
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Blocks until `pid` terminates.
pub fn wait_for(pid: Pid) -> Result<ExitState, Errno> {
    loop {
        match waitpid(pid, None) {
            Ok(WaitStatus::Exited(_, code)) => return Ok(ExitState::Exited(code)),
            Ok(WaitStatus::Signaled(_, sig, _)) => return Ok(ExitState::Signaled(sig as i32)),
            Ok(_) | Err(Errno::EINTR) => continue,
            Err(e) => return Err(e),
        }
    }
}
