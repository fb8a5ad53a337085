use std::env as stdenv;
use std::io;
use std::path::{Path, PathBuf};

/// Process-level state the interpreter keeps between lines.
///
/// - `current_dir`: the working directory children inherit.
/// - `should_exit`: set by the `exit` built-in so the REPL stops prompting.
#[derive(Debug, Clone)]
pub struct Environment {
    pub current_dir: PathBuf,
    pub should_exit: bool,
}

impl Environment {
    /// Capture the current working directory of the process.
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            current_dir,
            should_exit: false,
        }
    }

    /// Change the working directory of the whole process.
    ///
    /// `target` goes to the OS as-is; relative paths resolve against the
    /// process's current directory.
    pub fn change_dir(&mut self, target: impl AsRef<Path>) -> io::Result<()> {
        stdenv::set_current_dir(target)?;
        self.current_dir = stdenv::current_dir()?;
        Ok(())
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
