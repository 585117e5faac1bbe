// Status command

use crate::shell::commands::{Executable, Flow};
use crate::shell::context::ShellContext;
use anyhow::Result;
use std::io::Write;

/// Prints `exit value <n>`, where `n` is the signal number when the last
/// command was killed.
pub struct StatusCommand;
impl Executable for StatusCommand {
    fn execute(&self, _args: &[String], ctx: &mut ShellContext, out: &mut dyn Write) -> Result<Flow> {
        writeln!(out, "exit value {}", ctx.last_status.code())?;
        out.flush()?;
        Ok(Flow::Continue)
    }
}
