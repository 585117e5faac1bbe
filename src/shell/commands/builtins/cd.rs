// Cd command

use crate::shell::commands::{Executable, Flow};
use crate::shell::context::ShellContext;
use anyhow::{Result, bail};
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

/// Joins `path` onto the session cwd and folds `.` and `..` lexically, so a
/// symlinked directory stays in the logical path the user typed.
fn resolve_path(ctx: &ShellContext, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        ctx.cwd.join(path)
    };

    let mut resolved = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other.as_os_str()),
        }
    }
    resolved
}

/// Changes the session's working directory; children start there.
pub struct CdCommand;
impl Executable for CdCommand {
    fn execute(&self, args: &[String], ctx: &mut ShellContext, _out: &mut dyn Write) -> Result<Flow> {
        // args[0] is "cd". args[1] is path.
        let target = match args.get(1) {
            Some(path) => PathBuf::from(path),
            None => match ctx.env.get(&OsString::from("HOME")) {
                Some(home) => PathBuf::from(home),
                None => bail!("cd: HOME not set"),
            },
        };

        let new_path = resolve_path(ctx, &target);
        match fs::metadata(&new_path) {
            Ok(meta) if meta.is_dir() => {
                ctx.env.insert(OsString::from("PWD"), new_path.clone().into_os_string());
                ctx.cwd = new_path;
                Ok(Flow::Continue)
            }
            Ok(_) => bail!("cd: {}: Not a directory", target.display()),
            Err(e) => bail!("cd: {}: {}", target.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn run_cd(ctx: &mut ShellContext, args: &[&str]) -> Result<Flow> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        CdCommand.execute(&args, ctx, &mut Vec::new())
    }

    fn pwd(ctx: &ShellContext) -> Option<PathBuf> {
        ctx.env.get(&OsString::from("PWD")).map(PathBuf::from)
    }

    #[test]
    fn test_cd_without_argument_goes_home() {
        let home = tempdir().unwrap();
        let home_path = home.path().canonicalize().unwrap();
        let mut ctx = ShellContext::new();
        ctx.env.insert(OsString::from("HOME"), home_path.clone().into_os_string());

        run_cd(&mut ctx, &["cd"]).unwrap();
        assert_eq!(ctx.cwd, home_path);
        assert_eq!(pwd(&ctx), Some(ctx.cwd.clone()));
    }

    #[test]
    fn test_cd_relative_path() {
        let root = tempdir().unwrap();
        std::fs::create_dir(root.path().join("sub")).unwrap();
        let mut ctx = ShellContext::new();
        ctx.cwd = root.path().canonicalize().unwrap();

        run_cd(&mut ctx, &["cd", "sub"]).unwrap();
        assert_eq!(ctx.cwd, root.path().canonicalize().unwrap().join("sub"));

        run_cd(&mut ctx, &["cd", "./.."]).unwrap();
        assert_eq!(ctx.cwd, root.path().canonicalize().unwrap());
    }

    #[test]
    fn test_cd_keeps_symlinked_path() {
        let root = tempdir().unwrap();
        let root_path = root.path().canonicalize().unwrap();
        std::fs::create_dir(root_path.join("real")).unwrap();
        std::os::unix::fs::symlink(root_path.join("real"), root_path.join("link")).unwrap();

        let mut ctx = ShellContext::new();
        ctx.cwd = root_path.clone();
        ctx.env.insert(OsString::from("HOME"), root_path.join("link").into_os_string());

        run_cd(&mut ctx, &["cd"]).unwrap();
        assert_eq!(ctx.cwd, root_path.join("link"));
        assert_eq!(pwd(&ctx), Some(root_path.join("link")));

        run_cd(&mut ctx, &["cd", ".."]).unwrap();
        assert_eq!(ctx.cwd, root_path);
    }

    #[test]
    fn test_cd_failure_is_reported_and_keeps_cwd() {
        let root = tempdir().unwrap();
        std::fs::write(root.path().join("file"), "x").unwrap();
        let mut ctx = ShellContext::new();
        ctx.cwd = root.path().canonicalize().unwrap();
        let before = ctx.cwd.clone();

        let err = run_cd(&mut ctx, &["cd", "missing"]).unwrap_err();
        assert!(err.to_string().starts_with("cd: missing:"));
        let err = run_cd(&mut ctx, &["cd", "file"]).unwrap_err();
        assert_eq!(err.to_string(), "cd: file: Not a directory");
        assert_eq!(ctx.cwd, before);
    }

    #[test]
    fn test_cd_without_home() {
        let mut ctx = ShellContext::new();
        ctx.env.remove(&OsString::from("HOME"));
        let err = run_cd(&mut ctx, &["cd"]).unwrap_err();
        assert_eq!(err.to_string(), "cd: HOME not set");
    }
}
