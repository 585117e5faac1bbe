pub mod builtins;
pub mod system;

use crate::shell::context::ShellContext;
use anyhow::Result;
use std::io::Write;

/// What the loop does after a command returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit(i32),
}

pub trait Executable {
    fn execute(&self, args: &[String], ctx: &mut ShellContext, out: &mut dyn Write) -> Result<Flow>;
}
