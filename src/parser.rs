//! Recursive-descent parser for the command language.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! line      := pipeline ('&')* (';' line)?
//! pipeline  := exec ('|' pipeline)?
//! exec      := '(' line ')' redir*  |  (word | redir)+
//! redir     := ('<' | '>' | '>>') word
//! ```
//!
//! The parser only records spans. [`parse`] runs the finalizer afterwards so
//! callers get a tree of owned C strings.

use crate::command::{Command, CommandTree, ParsedCommand, RedirectMode};
use crate::finalize::finalize;
use crate::lexer::{Lexer, Span, Token, TokenKind};
use thiserror::Error;

/// Maximum number of arguments (program name included) a single command may have.
pub const MAXARGS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("missing file for redirection at byte {offset}")]
    MissingRedirectTarget { offset: usize },

    #[error("unexpected {found} at byte {offset}")]
    UnexpectedToken { found: TokenKind, offset: usize },

    #[error("missing command at byte {offset}")]
    MissingCommand { offset: usize },

    #[error("missing `)` for group opened at byte {open}")]
    UnclosedGroup { open: usize },

    #[error("too many args (limit is {max})")]
    TooManyArgs { max: usize },

    #[error("leftovers at byte {offset}: {rest}")]
    Leftovers { offset: usize, rest: String },

    #[error("NUL byte inside word at byte {offset}")]
    InteriorNul { offset: usize },
}

/// Parser state: the token source plus the one token of lookahead.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    max_args: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a [u8], max_args: usize) -> Self {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            max_args,
        }
    }

    /// Parse the whole input. Anything left over after the top-level `line`
    /// is an error.
    pub fn parse(mut self) -> Result<ParsedCommand, ParseError> {
        let cmd = self.parse_line()?;
        if self.current.kind != TokenKind::End {
            let offset = self.current.span.start;
            let rest = String::from_utf8_lossy(&self.lexer.input()[offset..]).into_owned();
            return Err(ParseError::Leftovers { offset, rest });
        }
        Ok(cmd)
    }

    fn bump(&mut self) -> Token {
        std::mem::replace(&mut self.current, self.lexer.next_token())
    }

    fn peek(&self) -> TokenKind {
        self.current.kind
    }

    fn parse_line(&mut self) -> Result<ParsedCommand, ParseError> {
        let mut cmd = self.parse_pipeline()?;

        while self.peek() == TokenKind::Amp {
            self.bump();
            cmd = CommandTree::background(cmd);
        }

        if self.peek() == TokenKind::Semi {
            self.bump();
            // `a ;` at the very end is just `a`: an empty trailing command
            // would only fork a child that exits 1, so it is dropped here.
            if self.peek() == TokenKind::End {
                return Ok(cmd);
            }
            cmd = CommandTree::sequence(cmd, self.parse_line()?);
        }

        Ok(cmd)
    }

    /// Right-associative: `a | b | c` is `a | (b | c)`.
    fn parse_pipeline(&mut self) -> Result<ParsedCommand, ParseError> {
        let cmd = self.parse_exec()?;
        if self.peek() == TokenKind::Pipe {
            self.bump();
            return Ok(CommandTree::pipe(cmd, self.parse_pipeline()?));
        }
        Ok(cmd)
    }

    fn parse_exec(&mut self) -> Result<ParsedCommand, ParseError> {
        if self.peek() == TokenKind::LParen {
            return self.parse_block();
        }

        let start = self.current.span.start;
        let mut argv = Vec::new();
        let mut redirs = Vec::new();

        loop {
            match self.peek() {
                TokenKind::Word => {
                    if argv.len() == self.max_args {
                        return Err(ParseError::TooManyArgs { max: self.max_args });
                    }
                    argv.push(self.bump().span);
                }
                kind if kind.is_redirection() => redirs.push(self.parse_redir()?),
                TokenKind::Pipe
                | TokenKind::RParen
                | TokenKind::Amp
                | TokenKind::Semi
                | TokenKind::End => break,
                found => {
                    return Err(ParseError::UnexpectedToken {
                        found,
                        offset: self.current.span.start,
                    });
                }
            }
        }

        if argv.is_empty() {
            return Err(ParseError::MissingCommand { offset: start });
        }

        Ok(wrap_redirs(CommandTree::exec(argv), redirs))
    }

    fn parse_block(&mut self) -> Result<ParsedCommand, ParseError> {
        let open = self.bump().span.start;
        let inner = self.parse_line()?;
        if self.peek() != TokenKind::RParen {
            return Err(ParseError::UnclosedGroup { open });
        }
        self.bump();

        let mut redirs = Vec::new();
        while self.peek().is_redirection() {
            redirs.push(self.parse_redir()?);
        }
        Ok(wrap_redirs(inner, redirs))
    }

    fn parse_redir(&mut self) -> Result<(Span, RedirectMode), ParseError> {
        let op = self.bump();
        let mode = match op.kind {
            TokenKind::Less => RedirectMode::Read,
            TokenKind::Great => RedirectMode::Truncate,
            TokenKind::Append => RedirectMode::Append,
            found => {
                return Err(ParseError::UnexpectedToken {
                    found,
                    offset: op.span.start,
                });
            }
        };
        if self.peek() != TokenKind::Word {
            return Err(ParseError::MissingRedirectTarget {
                offset: self.current.span.start,
            });
        }
        Ok((self.bump().span, mode))
    }
}

/// Each redirection wraps everything before it, so the last one written ends
/// up outermost.
fn wrap_redirs(cmd: ParsedCommand, redirs: Vec<(Span, RedirectMode)>) -> ParsedCommand {
    redirs
        .into_iter()
        .fold(cmd, |inner, (file, mode)| CommandTree::redirect(inner, file, mode))
}

/// Parse `line` into a span tree without finalizing it.
pub fn parse_spans(line: &[u8], max_args: usize) -> Result<ParsedCommand, ParseError> {
    Parser::new(line, max_args).parse()
}

/// Parse and finalize one command line. The input need not be UTF-8.
pub fn parse(line: &[u8], max_args: usize) -> Result<Command, ParseError> {
    let tree = parse_spans(line, max_args)?;
    finalize(tree, line)
}
