use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::interpreter::Factory;
use crate::session::Session;
use anyhow::{Context, Result, anyhow};
use argh::{EarlyExit, FromArgs};
use std::fs;
use std::io::Write;

/// Text printed by the `help` builtin.
pub const HELP_TEXT: &str = "\
-------------------------------------
SHELLEX HELP
Built-in commands supported:
> cd [dir]
> pid
> ppid
> help
> exit
Append & to run a program in the background.
For everything else, please refer to man :)
-------------------------------------";

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "pid" or "cd".
    fn name() -> &'static str;

    /// How many leading arguments reach the parser; the rest are ignored.
    const MAX_ARGS: usize = 0;

    /// Executes the command against the session, writing output to `stdout`.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(self, stdout: &mut dyn Write, session: &mut Session) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(self: Box<Self>, stdout: &mut dyn Write, session: &mut Session) -> Result<ExitCode> {
        match <T as BuiltinCommand>::execute(*self, stdout, session) {
            Ok(x) => Ok(x),
            Err(e) => {
                writeln!(stdout, "{:#}", e)?;
                Ok(1)
            }
        }
    }
}

struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(self: Box<Self>, stdout: &mut dyn Write, _session: &mut Session) -> Result<ExitCode> {
        writeln!(stdout, "{}", self.output.trim_end())?;
        Ok(if self.is_error { 1 } else { 0 })
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(&self, name: &str, args: &[&str]) -> Option<Box<dyn ExecutableCommand>> {
        if name == T::name() {
            // Kept arguments follow `--` so argh never reads them as `help` or flags.
            let kept = &args[..args.len().min(T::MAX_ARGS)];
            let mut argv = Vec::with_capacity(kept.len() + 1);
            if !kept.is_empty() {
                argv.push("--");
                argv.extend_from_slice(kept);
            }
            Some(match T::from_args(&[name], &argv) {
                Ok(cmd) => Box::new(cmd),
                Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                    output,
                    is_error: status.is_err(),
                }),
            })
        } else {
            None
        }
    }
}

/// The builtins every interpreter starts with.
pub(crate) fn default_builtins() -> Vec<Box<dyn CommandFactory>> {
    vec![
        Box::new(Factory::<Help>::default()),
        Box::new(Factory::<Pid>::default()),
        Box::new(Factory::<Ppid>::default()),
        Box::new(Factory::<Cd>::default()),
        Box::new(Factory::<Exit>::default()),
    ]
}

#[derive(FromArgs)]
/// Print the list of builtin commands.
pub struct Help {}

impl BuiltinCommand for Help {
    fn name() -> &'static str {
        "help"
    }

    fn execute(self, stdout: &mut dyn Write, _session: &mut Session) -> Result<ExitCode> {
        writeln!(stdout, "{}", HELP_TEXT)?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Print the process id of the shell.
pub struct Pid {}

impl BuiltinCommand for Pid {
    fn name() -> &'static str {
        "pid"
    }

    fn execute(self, stdout: &mut dyn Write, _session: &mut Session) -> Result<ExitCode> {
        writeln!(stdout, "{}", std::process::id())?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Print the parent process id of the shell.
pub struct Ppid {}

impl BuiltinCommand for Ppid {
    fn name() -> &'static str {
        "ppid"
    }

    fn execute(self, stdout: &mut dyn Write, _session: &mut Session) -> Result<ExitCode> {
        writeln!(stdout, "{}", std::os::unix::process::parent_id())?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Change the working directory of the shell.
/// Without a target, print the current working directory instead.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    const MAX_ARGS: usize = 1;

    fn execute(self, stdout: &mut dyn Write, session: &mut Session) -> Result<ExitCode> {
        let Some(target) = self.target else {
            writeln!(stdout, "{}", session.current_dir.display())?;
            return Ok(0);
        };

        // `join` keeps absolute targets as they are.
        let new_dir = session.current_dir.join(&target);
        let canonical = fs::canonicalize(&new_dir).with_context(|| format!("cd: {}", target))?;
        if !canonical.is_dir() {
            return Err(anyhow!("cd: {}: Not a directory", target));
        }

        log::debug!("cd: {} -> {}", session.current_dir.display(), canonical.display());
        session.current_dir = canonical;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Exit the shell process.
pub struct Exit {}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(self, _stdout: &mut dyn Write, session: &mut Session) -> Result<ExitCode> {
        session.should_exit = true;
        Ok(0)
    }
}
