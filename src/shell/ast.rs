use std::fmt;

/// One parsed input line: `program args... [< in] [> out] [&]`.
///
/// Owned as a unit and consumed by dispatch; nothing borrows into the line
/// buffer it came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandLine {
    argv: Vec<String>,
    input: Option<String>,
    output: Option<String>,
    background: bool,
}

impl CommandLine {
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_input(mut self, path: impl Into<String>) -> Self {
        self.input = Some(path.into());
        self
    }

    pub fn with_output(mut self, path: impl Into<String>) -> Self {
        self.output = Some(path.into());
        self
    }

    pub fn in_background(mut self) -> Self {
        self.background = true;
        self
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    pub fn input(&self) -> Option<&str> {
        self.input.as_deref()
    }

    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    pub fn background(&self) -> bool {
        self.background
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.argv.is_empty()
    }
}

/// How a finished process ended. Also the shell's "last status".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitState {
    Exited(i32),
    Signaled(i32),
}

impl ExitState {
    /// The number `status` reports: the exit code, or the signal number.
    pub fn code(&self) -> i32 {
        match self {
            ExitState::Exited(n) | ExitState::Signaled(n) => *n,
        }
    }
}

impl Default for ExitState {
    fn default() -> Self {
        ExitState::Exited(0)
    }
}

impl fmt::Display for ExitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitState::Exited(code) => write!(f, "exit value {}", code),
            ExitState::Signaled(sig) => write!(f, "terminated by signal {}", sig),
        }
    }
}
