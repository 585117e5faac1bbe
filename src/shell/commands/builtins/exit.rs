// Exit command

use crate::shell::commands::{Executable, Flow};
use crate::shell::context::ShellContext;
use anyhow::Result;
use log::debug;
use std::io::Write;

/// Leaves the shell with status 0. Arguments are ignored and background jobs
/// are left running.
pub struct ExitCommand;
impl Executable for ExitCommand {
    fn execute(&self, _args: &[String], ctx: &mut ShellContext, out: &mut dyn Write) -> Result<Flow> {
        if !ctx.jobs.is_empty() {
            debug!("exiting with {} background job(s) still tracked", ctx.jobs.len());
        }
        out.flush()?;
        Ok(Flow::Exit(0))
    }
}
