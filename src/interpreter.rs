use crate::builtin;
use crate::command::ExitCode;
use crate::config::ShellConfig;
use crate::env::Environment;
use crate::executor::Executor;
use crate::lexer::WHITESPACE;
use crate::parser;
use anyhow::Context;
use log::{debug, info, warn};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, BufRead, IsTerminal, Write};

/// What happened to one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// `exit` was typed; no more lines should be read.
    Exit,
    /// A built-in ran in the shell process with this status.
    Builtin(ExitCode),
    /// Nothing but whitespace. Nothing ran.
    Blank,
    /// The line did not parse. A diagnostic was printed and nothing ran.
    Rejected,
    /// The line ran in a child process, which exited with this status.
    Completed(ExitCode),
}

/// A minimal shell: built-ins first, otherwise parse and fork.
///
/// Example
/// ```no_run
/// use forksh::{Interpreter, LineOutcome, ShellConfig};
/// let mut sh = Interpreter::new(ShellConfig::default());
/// let outcome = sh.run_line(b"echo hello world").unwrap();
/// assert_eq!(outcome, LineOutcome::Completed(0));
/// ```
pub struct Interpreter {
    config: ShellConfig,
    env: Environment,
    executor: Executor,
}

impl Interpreter {
    pub fn new(config: ShellConfig) -> Self {
        let executor = Executor::new(config.search_dir.as_bytes());
        Self {
            config,
            env: Environment::new(),
            executor,
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Run one line and report what happened.
    ///
    /// Errors are reserved for the shell itself being unable to go on, such
    /// as a failed `fork`. Problems with the line are reported on stderr and
    /// show up in the returned [`LineOutcome`]. The line is raw bytes and
    /// need not be UTF-8.
    pub fn run_line(&mut self, line: &[u8]) -> anyhow::Result<LineOutcome> {
        if let Some(code) = builtin::dispatch(line, &mut self.env) {
            if self.env.should_exit {
                return Ok(LineOutcome::Exit);
            }
            return Ok(LineOutcome::Builtin(code));
        }

        if line.iter().all(|b| WHITESPACE.contains(b)) {
            return Ok(LineOutcome::Blank);
        }

        let cmd = match parser::parse(line, self.config.max_args) {
            Ok(cmd) => cmd,
            Err(err) => {
                info!("rejected {:?}: {err}", String::from_utf8_lossy(line));
                eprintln!("syntax error: {err}");
                return Ok(LineOutcome::Rejected);
            }
        };
        debug!("parsed {:?} into {cmd:?}", String::from_utf8_lossy(line));

        // Anything still buffered would otherwise be written twice.
        std::io::stdout().flush().context("flushing stdout before fork")?;

        let pid = self.executor.launch(&cmd).context("can't start command")?;
        let code = self.executor.wait(pid).context("can't wait for command")?;
        debug!("line finished with status {code}");
        Ok(LineOutcome::Completed(code))
    }

    /// Read-eval-print loop on standard input.
    ///
    /// A terminal gets the line editor and a prompt. Anything else is read
    /// as raw lines with [`Interpreter::run_lines`]. Returns once `exit` is
    /// typed or input ends. Read failures are errors.
    pub fn repl(&mut self) -> anyhow::Result<()> {
        if io::stdin().is_terminal() {
            self.repl_terminal()
        } else {
            self.run_lines(io::stdin().lock())
        }
    }

    fn repl_terminal(&mut self) -> anyhow::Result<()> {
        let mut rl = DefaultEditor::new()?;

        loop {
            match rl.readline(&self.config.prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        rl.add_history_entry(line.as_str())?;
                    }
                    if self.run_line(line.as_bytes())? == LineOutcome::Exit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                // The editor only decodes UTF-8. Such a line is dropped, not fatal.
                Err(ReadlineError::Io(err)) if err.kind() == io::ErrorKind::InvalidData => {
                    warn!("dropped undecodable input line: {err}");
                    eprintln!("syntax error: line is not valid UTF-8");
                }
                Err(err) => return Err(err).context("can't read input"),
            }
        }

        Ok(())
    }

    /// Run every `\n`-terminated line of `input` until `exit` or end of input.
    ///
    /// Lines are passed on as bytes, without the separator.
    pub fn run_lines(&mut self, mut input: impl BufRead) -> anyhow::Result<()> {
        let mut line = Vec::new();
        loop {
            line.clear();
            if input.read_until(b'\n', &mut line).context("can't read input")? == 0 {
                break;
            }
            if line.last() == Some(&b'\n') {
                line.pop();
            }
            if self.run_line(&line)? == LineOutcome::Exit {
                break;
            }
        }
        Ok(())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(ShellConfig::default())
    }
}
