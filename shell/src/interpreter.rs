use crate::builtin::default_builtins;
use crate::command::{CommandFactory, ExitCode};
use crate::external::{BackgroundPolicy, ChildState, Launch, ProcessLauncher};
use crate::io_adapters::LineSource;
use crate::parser::{self, ParsedCommand};
use crate::session::Session;
use crate::signals::SignalManager;
use anyhow::Result;
use std::io::Write;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports builtins defined in this crate.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// What evaluating a single line amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// Nothing to run.
    Blank,
    /// A builtin ran with this exit code.
    Builtin(ExitCode),
    /// A foreground program ran to completion.
    Foreground(ChildState),
    /// A program was started in the background with this pid.
    Background(u32),
    /// No program by that name.
    NotFound,
    /// The program exists but could not be started.
    SpawnFailed,
}

/// A minimal shell-like interpreter that can execute built-in and external commands.
///
/// The interpreter owns a [`Session`], the list of builtin [`CommandFactory`]
/// objects that are queried by name, and the launcher used for everything else.
///
/// Example
/// ```
/// use shellex::{Evaluation, Interpreter};
/// let mut sh = Interpreter::default();
/// let mut out = Vec::new();
/// assert_eq!(sh.eval("   \n", &mut out).unwrap(), Evaluation::Blank);
/// assert_eq!(sh.eval("exit\n", &mut out).unwrap(), Evaluation::Builtin(0));
/// assert!(sh.session().should_exit);
/// ```
pub struct Interpreter {
    session: Session,
    commands: Vec<Box<dyn CommandFactory>>,
    launcher: ProcessLauncher,
    signals: Option<SignalManager>,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of builtin factories.
    pub fn new(commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            session: Session::new(),
            commands,
            launcher: ProcessLauncher::default(),
            signals: None,
        }
    }

    /// Replace the session, e.g. to start in a different directory.
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    /// Attach an installed SIGINT handler whose deliveries get drained between lines.
    pub fn with_signals(mut self, signals: SignalManager) -> Self {
        self.signals = Some(signals);
        self
    }

    pub fn with_background_policy(mut self, policy: BackgroundPolicy) -> Self {
        self.launcher = ProcessLauncher::new(policy);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Evaluate one raw line, writing everything the interpreter prints to `out`.
    ///
    /// Only failures of `out` itself and of a foreground wait are returned as
    /// errors; the latter leaves the interpreter unable to continue.
    pub fn eval(&mut self, raw: &str, out: &mut dyn Write) -> Result<Evaluation> {
        let Some(cmd) = parser::parse_line(raw) else {
            return Ok(Evaluation::Blank);
        };

        let args: Vec<&str> = cmd.args().iter().map(String::as_str).collect();
        for factory in &self.commands {
            if let Some(builtin) = factory.try_create(cmd.name(), &args) {
                log::debug!("running builtin {}", cmd.name());
                let code = builtin.execute(out, &mut self.session)?;
                return Ok(Evaluation::Builtin(code));
            }
        }

        self.launch(&cmd, raw, out)
    }

    fn launch(&mut self, cmd: &ParsedCommand, raw: &str, out: &mut dyn Write) -> Result<Evaluation> {
        // Children write to the same stdout.
        out.flush()?;

        let launched = match self.launcher.launch(cmd, &self.session) {
            Ok(launched) => launched,
            Err(e) => {
                log::warn!("{:#}", e);
                writeln!(out, "{}: {:#}", cmd.name(), e)?;
                return Ok(Evaluation::SpawnFailed);
            }
        };

        match launched {
            Launch::NotFound => {
                writeln!(out, "{}: Command not found.", cmd.name())?;
                Ok(Evaluation::NotFound)
            }
            Launch::Foreground(child) => {
                let pid = child.id();
                let state = child.wait()?;
                log::debug!("foreground process {} finished: {:?}", pid, state);
                Ok(Evaluation::Foreground(state))
            }
            Launch::Background(pid) => {
                writeln!(out, "{} {}", pid, parser::strip_terminator(raw))?;
                Ok(Evaluation::Background(pid))
            }
        }
    }

    /// Read-Eval-Print Loop.
    ///
    /// Runs until `source` is exhausted or the `exit` builtin is evaluated.
    pub fn run(&mut self, source: &mut dyn LineSource, prompt: &str, out: &mut dyn Write) -> Result<()> {
        while !self.session.should_exit {
            self.drain_interrupts();
            self.launcher.reap();

            let Some(line) = source.next_line(prompt)? else {
                log::debug!("end of input");
                break;
            };
            self.eval(&line, out)?;
            out.flush()?;
        }
        Ok(())
    }

    fn drain_interrupts(&self) {
        if let Some(signals) = &self.signals {
            let delivered = signals.take_interrupts();
            if delivered > 0 {
                log::debug!("{} interrupt(s) delivered while idle or waiting", delivered);
            }
        }
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the default builtins:
    /// `help`, `pid`, `ppid`, `cd` and `exit`.
    fn default() -> Self {
        Self::new(default_builtins())
    }
}
