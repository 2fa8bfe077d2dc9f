use crate::command::ExitCode;
use crate::parser::ParsedCommand;
use crate::session::Session;
use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::{Component, Path, PathBuf};
use std::process::{Child, ExitStatus};

/// Completion state of a spawned program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildState {
    Running,
    Exited(ExitCode),
    Signaled(i32),
}

impl From<ExitStatus> for ChildState {
    fn from(status: ExitStatus) -> Self {
        match (status.code(), status.signal()) {
            (Some(code), _) => ChildState::Exited(code),
            (None, Some(signal)) => ChildState::Signaled(signal),
            // wait() only reports terminated children, so this is unreachable in practice.
            (None, None) => ChildState::Exited(-1),
        }
    }
}

/// One external program started by the launcher.
pub struct ChildProcess {
    child: Child,
}

impl ChildProcess {
    /// Process id assigned at spawn time.
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Blocks until the program terminates.
    ///
    /// A failure here means the interpreter no longer knows what its child is
    /// doing, so callers treat it as fatal.
    pub fn wait(mut self) -> Result<ChildState> {
        let pid = self.child.id();
        let status = self
            .child
            .wait()
            .with_context(|| format!("waitfg: waitpid error for process {}", pid))?;
        Ok(status.into())
    }

    /// Checks for termination without blocking.
    pub fn poll(&mut self) -> Result<ChildState> {
        Ok(match self.child.try_wait()? {
            Some(status) => status.into(),
            None => ChildState::Running,
        })
    }
}

/// What happens to children started with a trailing `&`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackgroundPolicy {
    /// Never wait on them again.
    #[default]
    Detach,
    /// Keep them and reap finished ones whenever [`ProcessLauncher::reap`] runs.
    Reap,
}

/// Result of launching a non-builtin command line.
pub enum Launch {
    /// Nothing executable goes by that name.
    NotFound,
    /// A running foreground program; the caller owns the wait.
    Foreground(ChildProcess),
    /// A background program, identified by the pid it got at spawn time.
    Background(u32),
}

/// Starts external programs for the evaluator.
pub struct ProcessLauncher {
    policy: BackgroundPolicy,
    detached: Vec<ChildProcess>,
}

impl ProcessLauncher {
    pub fn new(policy: BackgroundPolicy) -> Self {
        Self {
            policy,
            detached: Vec::new(),
        }
    }

    /// Resolves and spawns `cmd` inside the session's working directory.
    ///
    /// Programs that cannot be found or executed yield [`Launch::NotFound`];
    /// any other spawn failure is returned as an error.
    pub fn launch(&mut self, cmd: &ParsedCommand, session: &Session) -> Result<Launch> {
        let Some(program) = find_command_path(
            session.search_path.as_deref(),
            &session.current_dir,
            Path::new(cmd.name()),
        ) else {
            return Ok(Launch::NotFound);
        };
        log::debug!("launching {} as {}", cmd.name(), program.display());

        let spawned = std::process::Command::new(&program)
            .arg0(cmd.name())
            .args(cmd.args())
            .current_dir(&session.current_dir)
            .spawn();
        let child = match spawned {
            Ok(child) => ChildProcess { child },
            Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied) => {
                log::debug!("spawning {} failed: {}", program.display(), e);
                return Ok(Launch::NotFound);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to spawn {}", program.display()));
            }
        };

        if !cmd.background {
            return Ok(Launch::Foreground(child));
        }

        let pid = child.id();
        if self.policy == BackgroundPolicy::Reap {
            self.detached.push(child);
        }
        Ok(Launch::Background(pid))
    }

    /// Collects finished background children; returns how many were reaped.
    pub fn reap(&mut self) -> usize {
        let before = self.detached.len();
        self.detached.retain_mut(|child| match child.poll() {
            Ok(ChildState::Running) => true,
            Ok(state) => {
                log::debug!("reaped background process {}: {:?}", child.id(), state);
                false
            }
            Err(e) => {
                log::warn!("polling background process {} failed: {:#}", child.id(), e);
                false
            }
        });
        before - self.detached.len()
    }

    /// Background children still being tracked.
    pub fn tracked(&self) -> usize {
        self.detached.len()
    }
}

impl Default for ProcessLauncher {
    fn default() -> Self {
        Self::new(BackgroundPolicy::default())
    }
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// Only regular files with an execute bit set count as matches.
///
/// - Absolute path: returns it if it is an executable file.
/// - Single path component (no separators): search each directory in `search_paths`
///   (PATH) and return the first match. Empty PATH entries mean `cwd`.
/// - Anything else (`./foo`, `bin/sh`): resolved against `cwd`.
/// - Empty path: returns `None`.
pub fn find_command_path(search_paths: Option<&OsStr>, cwd: &Path, path: &Path) -> Option<PathBuf> {
    if path.as_os_str().is_empty() {
        return None;
    }
    if path.is_absolute() {
        return find_by_path(path);
    }

    let mut components = path.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) => find_in_path(search_paths?, cwd, name),
        _ => find_by_path(&cwd.join(path)),
    }
}

fn find_in_path(search_paths: &OsStr, cwd: &Path, cmd: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(search_paths).find_map(|dir| {
        let dir = if dir.as_os_str().is_empty() { cwd.to_path_buf() } else { dir };
        find_by_path(&dir.join(cmd))
    })
}

fn find_by_path(path: &Path) -> Option<PathBuf> {
    let metadata = path.metadata().ok()?;
    let executable = metadata.is_file() && metadata.permissions().mode() & 0o111 != 0;
    executable.then(|| path.to_path_buf())
}
