//! Realizes a finalized [`Command`] tree as a tree of processes.
//!
//! Every node except `Exec` forks, and the process that runs a node never
//! returns to its caller: it either becomes another program through `execv`
//! or exits. [`Executor::run`] is the only place that exits.

use crate::command::{Command, CommandTree, ExitCode, RedirectMode};
use crate::external::{exit_code, resolve_program};
use log::{debug, trace};
use nix::errno::Errno;
use nix::fcntl::{OFlag, open};
use nix::sys::stat::Mode;
use nix::sys::wait::waitpid;
use nix::unistd::{ForkResult, Pid, close, dup2, execv, fork, pipe};
use std::ffi::CString;
use std::os::fd::{AsRawFd, RawFd};
use thiserror::Error;

const STDIN_FILENO: RawFd = 0;
const STDOUT_FILENO: RawFd = 1;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("empty command")]
    EmptyCommand,

    #[error("exec {program} failed: {source}")]
    Exec { program: String, source: Errno },

    #[error("open {file} failed: {source}")]
    Open { file: String, source: Errno },

    #[error("fork failed: {0}")]
    Fork(Errno),

    #[error("pipe failed: {0}")]
    Pipe(Errno),

    #[error("dup2 failed: {0}")]
    Dup(Errno),

    #[error("wait for {pid} failed: {source}")]
    Wait { pid: Pid, source: Errno },
}

impl ExecError {
    /// Whether the error deserves a line on stderr before the process exits.
    fn is_reported(&self) -> bool {
        !matches!(self, ExecError::EmptyCommand)
    }
}

/// Walks a [`Command`] tree, forking and exec'ing as it goes.
#[derive(Debug, Clone)]
pub struct Executor {
    search_dir: Vec<u8>,
}

impl Executor {
    /// `search_dir` is prepended verbatim to every program name.
    pub fn new(search_dir: impl Into<Vec<u8>>) -> Self {
        Self {
            search_dir: search_dir.into(),
        }
    }

    /// Run `cmd` as the whole remaining life of the current process.
    pub fn run(&self, cmd: &Command) -> ! {
        let code = match self.step(cmd) {
            Ok(()) => 0,
            Err(err) => {
                if err.is_reported() {
                    eprintln!("{err}");
                }
                debug!("process {} giving up: {err}", std::process::id());
                1
            }
        };
        std::process::exit(code)
    }

    /// Fork a child that runs `cmd` and exits. Returns the child's pid.
    pub fn launch(&self, cmd: &Command) -> Result<Pid, ExecError> {
        self.spawn(cmd, || Ok(()))
    }

    /// Block until `pid` exits and return its exit code.
    pub fn wait(&self, pid: Pid) -> Result<ExitCode, ExecError> {
        loop {
            match waitpid(pid, None) {
                Ok(status) => {
                    trace!("reaped {pid}: {status:?}");
                    return Ok(exit_code(status));
                }
                Err(Errno::EINTR) => continue,
                Err(source) => return Err(ExecError::Wait { pid, source }),
            }
        }
    }

    /// Interpret one node in the current process.
    ///
    /// `Ok(())` means the node finished and the process may exit successfully.
    /// An `Exec` node never produces `Ok`: it either replaces the process or
    /// fails.
    fn step(&self, cmd: &Command) -> Result<(), ExecError> {
        match cmd {
            CommandTree::Exec { argv } => Err(self.exec(argv)),

            CommandTree::Redirect {
                target,
                file,
                mode,
                stream,
            } => {
                let fd = open_redirect(file, *mode)?;
                trace!("redirect {:?} -> {:?} ({mode:?})", stream, file);
                rebind(fd, stream.fd())?;
                self.step(target)
            }

            CommandTree::Pipe { left, right } => {
                let (read_end, write_end) = pipe().map_err(ExecError::Pipe)?;
                let (r, w) = (read_end.as_raw_fd(), write_end.as_raw_fd());

                // Either end may already be fd 0 or 1 if the shell started
                // with a standard stream closed.
                let writer = self.spawn(left, || {
                    let _ = close(r);
                    rebind(w, STDOUT_FILENO)
                })?;
                let reader = self.spawn(right, || {
                    let _ = close(w);
                    rebind(r, STDIN_FILENO)
                })?;

                // The reader only sees end-of-file once every write end is gone.
                drop(read_end);
                drop(write_end);

                self.wait(writer)?;
                self.wait(reader)?;
                Ok(())
            }

            CommandTree::Sequence { left, right } => {
                let pid = self.launch(left)?;
                self.wait(pid)?;
                self.step(right)
            }

            CommandTree::Background { inner } => {
                let pid = self.launch(inner)?;
                debug!("left {pid} running in the background");
                Ok(())
            }
        }
    }

    /// Replace the process image. Only returns on failure.
    fn exec(&self, argv: &[CString]) -> ExecError {
        let Some(name) = argv.first() else {
            return ExecError::EmptyCommand;
        };
        let path = resolve_program(&self.search_dir, name);
        debug!("exec {:?} {:?}", path, argv);
        match execv(&path, argv) {
            Ok(never) => match never {},
            Err(source) => ExecError::Exec {
                program: name.to_string_lossy().into_owned(),
                source,
            },
        }
    }

    /// Fork; the child runs `setup` and then `cmd`, and never returns.
    fn spawn(
        &self,
        cmd: &Command,
        setup: impl FnOnce() -> Result<(), ExecError>,
    ) -> Result<Pid, ExecError> {
        // SAFETY: the child only runs `setup`, `run` and their error printing
        // before `execv` or `exit`. Callers must fork from a single-threaded
        // process, or accept that a lock held by another thread (the
        // allocator's, stderr's) may never be released in the child.
        match unsafe { fork() }.map_err(ExecError::Fork)? {
            ForkResult::Child => {
                if let Err(err) = setup() {
                    eprintln!("{err}");
                    std::process::exit(1);
                }
                self.run(cmd)
            }
            ForkResult::Parent { child } => {
                debug!("forked {child}");
                Ok(child)
            }
        }
    }
}

fn open_redirect(file: &CString, mode: RedirectMode) -> Result<RawFd, ExecError> {
    let flags = match mode {
        RedirectMode::Read => OFlag::O_RDONLY,
        RedirectMode::Truncate => OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
        RedirectMode::Append => OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_APPEND,
    };
    let perms = Mode::from_bits_truncate(0o666);
    open(file.as_c_str(), flags, perms).map_err(|source| ExecError::Open {
        file: file.to_string_lossy().into_owned(),
        source,
    })
}

/// Make `target` refer to what `fd` refers to, then drop `fd`.
fn rebind(fd: RawFd, target: RawFd) -> Result<(), ExecError> {
    if fd != target {
        dup2(fd, target).map_err(ExecError::Dup)?;
        let _ = close(fd);
    }
    Ok(())
}
