pub mod ast;
pub mod commands;
pub mod context;
pub mod jobs;
pub mod parser;
pub mod signals;

use anyhow::{Context, Result};
use colored::*;
use commands::builtins::{BuiltinTable, register_all_builtins};
use commands::system::{Launched, launch};
use commands::Flow;
use context::ShellContext;
use std::io::{self, BufRead, Write};


pub const DEFAULT_PROMPT: &str = ": ";

/// The prompt loop. Reads one line per iteration from `input` and writes
/// everything the user is meant to see (prompt, job reports, banners) to `out`.
pub struct Shell<R, W> {
    input: R,
    out: W,
    ctx: ShellContext,
    builtins: BuiltinTable,
    prompt: String,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(ctx: ShellContext, input: R, out: W) -> Self {
        Self {
            input,
            out,
            ctx,
            builtins: register_all_builtins(),
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn context(&self) -> &ShellContext {
        &self.ctx
    }

    #[cfg(test)]
    pub fn context_mut(&mut self) -> &mut ShellContext {
        &mut self.ctx
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Runs until `exit` or end of input and returns the shell's exit code.
    pub fn run(&mut self) -> Result<i32> {
        loop {
            if let Flow::Exit(code) = self.step()? {
                return Ok(code);
            }
        }
    }

    /// One iteration: reap, report a pending mode flip, prompt, read, dispatch.
    pub fn step(&mut self) -> Result<Flow> {
        self.reap_background()?;
        self.apply_pending_toggle()?;

        write!(self.out, "{}", self.prompt)?;
        self.out.flush()?;

        let mut buf = Vec::new();
        let read = self
            .input
            .read_until(b'\n', &mut buf)
            .context("Failed to read command line")?;
        if read == 0 {
            log::debug!("end of input");
            return Ok(Flow::Exit(0));
        }
        let line = String::from_utf8_lossy(&buf);
        self.run_command_line(&line)
    }

    pub fn reap_background(&mut self) -> Result<()> {
        if let Some(state) = self.ctx.jobs.reap_all(&mut self.out)? {
            self.ctx.last_status = state;
        }
        Ok(())
    }

    pub fn apply_pending_toggle(&mut self) -> Result<()> {
        if let Some(mode) = self.ctx.mode.consume_toggle() {
            writeln!(self.out, "{}", mode.banner())?;
            self.out.flush()?;
        }
        Ok(())
    }

    /// Dispatches a single line. Failures are reported on stderr and the
    /// session carries on; only a broken output stream is returned as an error.
    pub fn run_command_line(&mut self, line: &str) -> Result<Flow> {
        if parser::is_blank_or_comment(line) {
            return Ok(Flow::Continue);
        }

        let cmd = match parser::parse_command_line(line) {
            Ok(cmd) => cmd,
            Err(e) => {
                report(&anyhow::Error::new(e));
                return Ok(Flow::Continue);
            }
        };
        let Some(program) = cmd.program() else {
            return Ok(Flow::Continue);
        };

        if let Some(builtin) = self.builtins.get(program) {
            return match builtin.execute(cmd.argv(), &mut self.ctx, &mut self.out) {
                Ok(flow) => Ok(flow),
                Err(e) => {
                    recover(e)?;
                    Ok(Flow::Continue)
                }
            };
        }

        match launch(&cmd, &mut self.ctx, &mut self.out) {
            Ok(Launched::Foreground(state)) => self.ctx.last_status = state,
            Ok(Launched::Background(_)) => {}
            Err(e) => recover(e)?,
        }
        Ok(Flow::Continue)
    }
}

fn recover(err: anyhow::Error) -> Result<()> {
    if err.downcast_ref::<io::Error>().is_some() {
        return Err(err.context("Failed to write to standard output"));
    }
    report(&err);
    Ok(())
}

fn report(err: &anyhow::Error) {
    eprintln!("{} {:#}", "smallsh:".red().bold(), err);
}
