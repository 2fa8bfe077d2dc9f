use std::env as stdenv;
use std::ffi::OsString;
use std::path::PathBuf;

/// Interpreter state that outlives a single command line.
///
/// The session contains:
/// - `current_dir`: the working directory builtins report and children start in.
/// - `search_path`: the `PATH` list used to resolve bare program names.
/// - `should_exit`: set by the `exit` builtin; the read loop stops once it is true.
///
/// Only `cd` and `exit` mutate it, always on the evaluator's thread.
#[derive(Debug, Clone)]
pub struct Session {
    /// The working directory of the interpreter.
    pub current_dir: PathBuf,
    /// Directories searched for programs named without a path separator.
    pub search_path: Option<OsString>,
    /// When set to true, the read loop exits after the current line.
    pub should_exit: bool,
}

impl Session {
    /// Capture the current process state into a new session.
    ///
    /// `current_dir` comes from `std::env::current_dir()` and `search_path` from
    /// the `PATH` variable of the process.
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            current_dir,
            search_path: stdenv::var_os("PATH"),
            should_exit: false,
        }
    }

    /// Session rooted at `dir` with an explicit search path.
    pub fn with_dir(dir: impl Into<PathBuf>, search_path: Option<OsString>) -> Self {
        Self {
            current_dir: dir.into(),
            search_path,
            should_exit: false,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_reads_from_process_env() {
        let session = Session::new();
        assert_eq!(session.search_path, stdenv::var_os("PATH"));
        assert_eq!(session.current_dir, stdenv::current_dir().unwrap());
        assert!(!session.should_exit);
    }

    #[test]
    fn test_session_with_dir() {
        let session = Session::with_dir("/tmp", None);
        assert_eq!(session.current_dir, PathBuf::from("/tmp"));
        assert!(session.search_path.is_none());
    }
}
