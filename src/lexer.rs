//! Lexical analysis for the shell's command language.
//!
//! The lexer never copies input. Every [`Token`] is a kind plus a byte
//! [`Span`] into the line being parsed, and tokens are pulled one at a time
//! by the parser through [`Lexer::next_token`].

use std::fmt;

pub(crate) const WHITESPACE: &[u8] = b" \t\r\n\x0b";
const SYMBOLS: &[u8] = b"<|>&;()";

/// Half-open byte range `[start, end)` into the input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The bytes this span covers in `input`.
    pub fn slice<'a>(&self, input: &'a [u8]) -> &'a [u8] {
        &input[self.start..self.end]
    }
}

/// Classification of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A run of bytes that are neither whitespace nor symbols.
    Word,
    /// Input redirection, `<`.
    Less,
    /// Truncating output redirection, `>`.
    Great,
    /// Appending output redirection, `>>`.
    Append,
    /// The pipe operator, `|`.
    Pipe,
    /// Sequencing, `;`.
    Semi,
    /// Background suffix, `&`.
    Amp,
    /// Group start, `(`.
    LParen,
    /// Group end, `)`.
    RParen,
    /// End of input. Its span is always empty.
    End,
}

impl TokenKind {
    pub fn is_redirection(self) -> bool {
        matches!(self, TokenKind::Less | TokenKind::Great | TokenKind::Append)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Word => "word",
            TokenKind::Less => "`<`",
            TokenKind::Great => "`>`",
            TokenKind::Append => "`>>`",
            TokenKind::Pipe => "`|`",
            TokenKind::Semi => "`;`",
            TokenKind::Amp => "`&`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::End => "end of input",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Pull-based tokenizer over one input line.
///
/// The only state is the cursor; once it reaches the end, every further call
/// yields [`TokenKind::End`].
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    pub fn input(&self) -> &'a [u8] {
        self.input
    }

    /// Current cursor position, i.e. the end of the last token returned.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn next_token(&mut self) -> Token {
        while self.peek_byte().is_some_and(|b| WHITESPACE.contains(&b)) {
            self.pos += 1;
        }

        let start = self.pos;
        let kind = match self.peek_byte() {
            None => TokenKind::End,
            Some(b'>') => {
                self.pos += 1;
                if self.peek_byte() == Some(b'>') {
                    self.pos += 1;
                    TokenKind::Append
                } else {
                    TokenKind::Great
                }
            }
            Some(b) if SYMBOLS.contains(&b) => {
                self.pos += 1;
                match b {
                    b'<' => TokenKind::Less,
                    b'|' => TokenKind::Pipe,
                    b'&' => TokenKind::Amp,
                    b';' => TokenKind::Semi,
                    b'(' => TokenKind::LParen,
                    b')' => TokenKind::RParen,
                    _ => unreachable!("symbol table and match arms disagree"),
                }
            }
            Some(_) => {
                while self
                    .peek_byte()
                    .is_some_and(|b| !WHITESPACE.contains(&b) && !SYMBOLS.contains(&b))
                {
                    self.pos += 1;
                }
                TokenKind::Word
            }
        };

        Token {
            kind,
            span: Span::new(start, self.pos),
        }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    /// Yields tokens up to, but not including, [`TokenKind::End`].
    fn next(&mut self) -> Option<Token> {
        let token = self.next_token();
        (token.kind != TokenKind::End).then_some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(line: &str) -> Vec<TokenKind> {
        Lexer::new(line.as_bytes()).map(|t| t.kind).collect()
    }

    fn words(line: &str) -> Vec<&str> {
        let input = line.as_bytes();
        Lexer::new(input)
            .map(|t| std::str::from_utf8(t.span.slice(input)).unwrap())
            .collect()
    }

    #[test]
    fn test_splits_words_on_whitespace() {
        assert_eq!(words("ls  -la\t/tmp\n"), vec!["ls", "-la", "/tmp"]);
    }

    #[test]
    fn test_recognizes_every_symbol() {
        use TokenKind::*;
        assert_eq!(
            kinds("< > >> | ; & ( )"),
            vec![Less, Great, Append, Pipe, Semi, Amp, LParen, RParen]
        );
    }

    #[test]
    fn test_symbols_need_no_surrounding_space() {
        use TokenKind::*;
        assert_eq!(kinds("a>b|c&"), vec![Word, Great, Word, Pipe, Word, Amp]);
        assert_eq!(words("a>>b"), vec!["a", ">>", "b"]);
    }

    #[test]
    fn test_triple_angle_is_append_then_great() {
        use TokenKind::*;
        assert_eq!(kinds(">>>"), vec![Append, Great]);
    }

    #[test]
    fn test_end_token_has_empty_span_at_end() {
        let mut lexer = Lexer::new(b"echo  \r\n\x0b");
        assert_eq!(lexer.next_token().kind, TokenKind::Word);
        let end = lexer.next_token();
        assert_eq!(end.kind, TokenKind::End);
        assert!(end.span.is_empty());
        assert_eq!(end.span.start, 9);
        // stays at end
        assert_eq!(lexer.next_token().kind, TokenKind::End);
    }

    #[test]
    fn test_empty_input_is_immediately_end() {
        let mut lexer = Lexer::new(b"");
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::End);
        assert_eq!(token.span, Span::new(0, 0));
    }

    #[test]
    fn test_word_spans_point_into_input() {
        let mut lexer = Lexer::new(b"  cat file");
        assert_eq!(lexer.next_token().span, Span::new(2, 5));
        assert_eq!(lexer.next_token().span, Span::new(6, 10));
        assert_eq!(lexer.position(), 10);
    }

    #[test]
    fn test_non_utf8_bytes_are_word_bytes() {
        let input = b"cat \xff\xfe";
        let tokens: Vec<Token> = Lexer::new(input).collect();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].span.slice(input), b"\xff\xfe");
    }
}
