//! A tiny line-oriented command interpreter.
//!
//! Each input line is split on whitespace into arguments. The first argument
//! names either one of a handful of builtins (`help`, `pid`, `ppid`, `cd`,
//! `exit`) or an external program that is started through a `PATH` search.
//! A trailing `&` runs the program in the background instead of waiting for it.
//!
//! The main entry point is [`Interpreter`]. Lines come from a [`LineSource`];
//! [`SignalManager`] keeps Ctrl-C from killing the interpreter itself.

mod builtin;
pub mod command;
mod external;
mod interpreter;
mod io_adapters;
pub mod parser;
pub mod session;
mod signals;

pub use builtin::HELP_TEXT;
pub use external::{BackgroundPolicy, ChildState};
pub use interpreter::{Evaluation, Interpreter};
pub use io_adapters::{LineSource, ReaderSource, ReadlineSource};
pub use signals::SignalManager;
