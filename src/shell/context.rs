use crate::shell::ast::ExitState;
use crate::shell::jobs::JobRegistry;
use crate::shell::signals::ModeController;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;

pub const DEFAULT_NULL_DEVICE: &str = "/dev/null";

/// Everything one interactive session owns. Only the loop touches it; the
/// signal handler sees nothing but the controller's pending flag.
pub struct ShellContext {
    pub cwd: PathBuf,
    /// Passed verbatim to every child; entries need not be UTF-8.
    pub env: HashMap<OsString, OsString>,
    pub last_status: ExitState,
    pub jobs: JobRegistry,
    pub mode: ModeController,
    pub null_device: PathBuf,
}

impl ShellContext {
    pub fn new() -> Self {
        let env: HashMap<OsString, OsString> = std::env::vars_os().collect();
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            cwd,
            env,
            last_status: ExitState::default(),
            jobs: JobRegistry::new(),
            mode: ModeController::new(),
            null_device: PathBuf::from(DEFAULT_NULL_DEVICE),
        }
    }

    pub fn with_job_limit(mut self, limit: Option<usize>) -> Self {
        self.jobs = match limit {
            Some(cap) => JobRegistry::with_capacity_limit(cap),
            None => JobRegistry::new(),
        };
        self
    }

    pub fn with_null_device(mut self, path: impl Into<PathBuf>) -> Self {
        self.null_device = path.into();
        self
    }

    pub fn with_env_overrides(mut self, overrides: &HashMap<String, String>) -> Self {
        for (key, val) in overrides {
            self.env.insert(OsString::from(key), OsString::from(val));
        }
        self
    }

    pub fn foreground_only(&self) -> bool {
        self.mode.foreground_only()
    }
}

impl Default for ShellContext {
    fn default() -> Self {
        Self::new()
    }
}
