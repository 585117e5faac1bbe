// System command: fork, redirect, exec
use crate::shell::ast::{CommandLine, ExitState};
use crate::shell::context::ShellContext;
use crate::shell::jobs;
use crate::shell::signals;
use anyhow::{Context, Result, bail};
use log::debug;
use nix::fcntl::{OFlag, open};
use nix::sys::stat::Mode;
use nix::errno::Errno;
use nix::unistd::{ForkResult, Pid, chdir, close, dup2, fork};
use std::ffi::{CString, c_char};
use std::io::Write;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::RawFd;
use std::path::Path;

const STDIN_FD: RawFd = 0;
const STDOUT_FD: RawFd = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launched {
    Foreground(ExitState),
    Background(Pid),
}

/// Runs one external command. The `&` flag only takes effect outside
/// foreground-only mode; a foreground command is waited for before returning,
/// a background one is registered before returning.
pub fn launch(cmd: &CommandLine, ctx: &mut ShellContext, out: &mut dyn Write) -> Result<Launched> {
    let background = cmd.background() && !ctx.foreground_only();
    if background {
        ctx.jobs.ensure_room()?;
    }

    // Everything the child needs is built here; after fork it only makes syscalls.
    let plan = ChildPlan::prepare(cmd, ctx, background)?;

    let pid = match unsafe { fork() }.context("Failed to fork")? {
        ForkResult::Child => plan.run(),
        ForkResult::Parent { child } => child,
    };
    debug!("forked pid {} for {:?} (background: {})", pid, cmd.argv(), background);

    if background {
        writeln!(out, "background pid is {}", pid)?;
        out.flush()?;
        ctx.jobs.register(pid)?;
        // it may already be gone
        if let Some(state) = ctx.jobs.reap_all(out)? {
            ctx.last_status = state;
        }
        return Ok(Launched::Background(pid));
    }

    let state = jobs::wait_for(pid).with_context(|| format!("Failed to wait for pid {}", pid))?;
    if let ExitState::Signaled(_) = state {
        writeln!(out, "{}", state)?;
        out.flush()?;
    }
    Ok(Launched::Foreground(state))
}

struct Redirect {
    path: CString,
    flags: OFlag,
    mode: Mode,
    target: RawFd,
    failure: Vec<u8>,
}

impl Redirect {
    fn output(path: &Path) -> Result<Self> {
        Ok(Self {
            path: path_to_cstring(path)?,
            flags: OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
            mode: Mode::from_bits_truncate(0o640),
            target: STDOUT_FD,
            failure: format!("cannot open {} for output\n", path.display()).into_bytes(),
        })
    }

    fn input(path: &Path) -> Result<Self> {
        Ok(Self {
            path: path_to_cstring(path)?,
            flags: OFlag::O_RDONLY,
            mode: Mode::empty(),
            target: STDIN_FD,
            failure: format!("cannot open {} for input\n", path.display()).into_bytes(),
        })
    }

    fn apply(&self) -> nix::Result<()> {
        let fd = open(self.path.as_c_str(), self.flags, self.mode)?;
        if fd != self.target {
            dup2(fd, self.target)?;
            close(fd)?;
        }
        Ok(())
    }
}

struct ChildPlan {
    argv: Vec<CString>,
    // Owns the strings behind `env_ptrs`.
    _env: Vec<CString>,
    // NULL-terminated views into `argv` and `_env`; the CString buffers never move.
    argv_ptrs: Vec<*const c_char>,
    env_ptrs: Vec<*const c_char>,
    cwd: CString,
    foreground: bool,
    output: Option<Redirect>,
    input: Option<Redirect>,
    exec_failure: Vec<u8>,
    chdir_failure: Vec<u8>,
}

impl ChildPlan {
    fn prepare(cmd: &CommandLine, ctx: &ShellContext, background: bool) -> Result<Self> {
        let Some(program) = cmd.program() else {
            bail!("no program to run");
        };

        let argv = cmd
            .argv()
            .iter()
            .map(|arg| CString::new(arg.as_str()))
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("{}: argument contains a NUL byte", program))?;

        let mut env = Vec::with_capacity(ctx.env.len());
        for (key, val) in &ctx.env {
            let mut entry = Vec::with_capacity(key.len() + val.len() + 1);
            entry.extend_from_slice(key.as_bytes());
            entry.push(b'=');
            entry.extend_from_slice(val.as_bytes());
            let entry = CString::new(entry).with_context(|| {
                format!("environment variable {} contains a NUL byte", key.to_string_lossy())
            })?;
            env.push(entry);
        }

        let output = match cmd.output() {
            Some(path) => Some(Redirect::output(Path::new(path))?),
            None if background => Some(Redirect::output(&ctx.null_device)?),
            None => None,
        };
        let input = match cmd.input() {
            Some(path) => Some(Redirect::input(Path::new(path))?),
            None if background => Some(Redirect::input(&ctx.null_device)?),
            None => None,
        };

        let argv_ptrs = null_terminated(&argv);
        let env_ptrs = null_terminated(&env);

        Ok(Self {
            argv,
            _env: env,
            argv_ptrs,
            env_ptrs,
            cwd: path_to_cstring(&ctx.cwd)?,
            foreground: !background,
            output,
            input,
            exec_failure: format!("{}: ", program).into_bytes(),
            chdir_failure: format!("cannot change directory to {}\n", ctx.cwd.display()).into_bytes(),
        })
    }

    /// Child side of the fork. Never returns.
    fn run(&self) -> ! {
        if signals::reset_for_child(self.foreground).is_err() {
            die(b"cannot reset signal dispositions\n");
        }
        if chdir(self.cwd.as_c_str()).is_err() {
            die(&self.chdir_failure);
        }
        for redirect in [&self.output, &self.input].into_iter().flatten() {
            if redirect.apply().is_err() {
                die(&redirect.failure);
            }
        }

        // SAFETY: every pointer targets a CString owned by `self`, and both
        // arrays end in NULL. Nothing is allocated between fork and exec.
        unsafe {
            libc::execvpe(self.argv[0].as_ptr(), self.argv_ptrs.as_ptr(), self.env_ptrs.as_ptr());
        }
        let err = Errno::last();
        write_stderr(&self.exec_failure);
        write_stderr(err.desc().as_bytes());
        die(b"\n");
    }
}

fn null_terminated(strings: &[CString]) -> Vec<*const c_char> {
    strings
        .iter()
        .map(|s| s.as_ptr())
        .chain(std::iter::once(std::ptr::null()))
        .collect()
}

fn path_to_cstring(path: &Path) -> Result<CString> {
    CString::new(path.as_os_str().as_bytes())
        .with_context(|| format!("path contains a NUL byte: {}", path.display()))
}

fn write_stderr(bytes: &[u8]) {
    // SAFETY: write(2) is async-signal-safe and the buffer outlives the call.
    unsafe {
        libc::write(libc::STDERR_FILENO, bytes.as_ptr().cast(), bytes.len());
    }
}

fn die(message: &[u8]) -> ! {
    write_stderr(message);
    // SAFETY: _exit skips atexit handlers and stdio flushing inherited from the parent.
    unsafe { libc::_exit(1) }
}
