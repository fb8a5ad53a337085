//! A minimal fork-and-exec shell.
//!
//! A line goes through four stages:
//!
//! - [`lexer`] splits raw bytes into tokens that are only spans of the line,
//! - [`parser`] builds a [`CommandTree`] of spans by recursive descent,
//! - [`finalize`] copies every span into an owned C string,
//! - [`executor`] turns the tree into forked processes, pipes and redirected
//!   descriptors.
//!
//! [`Interpreter`] ties them together with the `exit` and `cd` built-ins and a
//! `rustyline` prompt.

mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod executor;
mod external;
pub mod finalize;
mod interpreter;
pub mod lexer;
pub mod logging;
pub mod parser;

pub use command::{Command, CommandTree, ExitCode, RedirectMode, Stream};
pub use config::ShellConfig;
pub use executor::{ExecError, Executor};
pub use interpreter::{Interpreter, LineOutcome};
pub use parser::{MAXARGS, ParseError, parse};
