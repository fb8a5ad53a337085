use crate::lexer::Span;
use std::ffi::CString;
use std::os::fd::RawFd;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
pub type ExitCode = i32;

/// Tree produced by the parser. Words are still spans into the input line.
pub type ParsedCommand = CommandTree<Span>;

/// Finalized tree handed to the executor. Every word is an owned C string.
pub type Command = CommandTree<CString>;

/// How a redirection opens its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectMode {
    /// `<`: the file must exist.
    Read,
    /// `>`: create the file or truncate it.
    Truncate,
    /// `>>`: create the file or append to it.
    Append,
}

impl RedirectMode {
    /// The standard stream this mode rebinds.
    pub fn stream(self) -> Stream {
        match self {
            RedirectMode::Read => Stream::Stdin,
            RedirectMode::Truncate | RedirectMode::Append => Stream::Stdout,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdin,
    Stdout,
}

impl Stream {
    pub fn fd(self) -> RawFd {
        match self {
            Stream::Stdin => 0,
            Stream::Stdout => 1,
        }
    }
}

/// A command line as a tree of process-level operations.
///
/// `W` is the word representation: [`Span`] right after parsing, [`CString`]
/// once the tree has been finalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandTree<W> {
    /// One program invocation. `argv[0]` names the program.
    Exec { argv: Vec<W> },

    /// Rebind `stream` to `file` before running `target`.
    Redirect {
        target: Box<CommandTree<W>>,
        file: W,
        mode: RedirectMode,
        stream: Stream,
    },

    /// `left`'s stdout feeds `right`'s stdin.
    Pipe {
        left: Box<CommandTree<W>>,
        right: Box<CommandTree<W>>,
    },

    /// `left` runs to completion, then `right` runs.
    Sequence {
        left: Box<CommandTree<W>>,
        right: Box<CommandTree<W>>,
    },

    /// `inner` runs without anyone waiting for it.
    Background { inner: Box<CommandTree<W>> },
}

impl<W> CommandTree<W> {
    pub fn exec(argv: Vec<W>) -> Self {
        CommandTree::Exec { argv }
    }

    pub fn redirect(target: Self, file: W, mode: RedirectMode) -> Self {
        CommandTree::Redirect {
            target: Box::new(target),
            file,
            mode,
            stream: mode.stream(),
        }
    }

    pub fn pipe(left: Self, right: Self) -> Self {
        CommandTree::Pipe {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn sequence(left: Self, right: Self) -> Self {
        CommandTree::Sequence {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn background(inner: Self) -> Self {
        CommandTree::Background {
            inner: Box::new(inner),
        }
    }

    /// Rebuild the tree with every word converted by `f`.
    ///
    /// Children are visited before the node's own words, left before right,
    /// and the first error aborts the walk.
    pub fn try_map_words<U, E>(
        self,
        f: &mut impl FnMut(W) -> Result<U, E>,
    ) -> Result<CommandTree<U>, E> {
        Ok(match self {
            CommandTree::Exec { argv } => CommandTree::Exec {
                argv: argv.into_iter().map(&mut *f).collect::<Result<_, _>>()?,
            },
            CommandTree::Redirect {
                target,
                file,
                mode,
                stream,
            } => {
                let target = Box::new(target.try_map_words(f)?);
                CommandTree::Redirect {
                    target,
                    file: f(file)?,
                    mode,
                    stream,
                }
            }
            CommandTree::Pipe { left, right } => CommandTree::Pipe {
                left: Box::new(left.try_map_words(f)?),
                right: Box::new(right.try_map_words(f)?),
            },
            CommandTree::Sequence { left, right } => CommandTree::Sequence {
                left: Box::new(left.try_map_words(f)?),
                right: Box::new(right.try_map_words(f)?),
            },
            CommandTree::Background { inner } => CommandTree::Background {
                inner: Box::new(inner.try_map_words(f)?),
            },
        })
    }
}
