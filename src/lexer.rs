use crate::token::Token;
use std::error::Error;
use std::fmt;
use std::iter::Peekable;
use std::mem;
use std::str::Chars;

use log::debug;
use phf::phf_map;

#[derive(Debug)]
pub struct LexerError {
    message: String,
}

impl LexerError {
    pub fn new(message: impl Into<String>) -> LexerError {
        LexerError {
            message: message.into(),
        }
    }
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for LexerError {}

static EOF_TOKEN: Token = Token::Eof;

/// Streaming tokenizer over a source string. Block structure is made explicit
/// through synthetic `Newline`/`Indent`/`Dedent` tokens; indentation is fixed
/// at two spaces per level.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    current: Option<Token>,
    // Active indentation width in spaces, always a multiple of 2.
    indent: usize,
    // Dedents still owed after a multi-level dedent, released one per advance().
    pending_dedents: usize,
    at_line_start: bool,
    // Set when a line opened at the current indentation width; suppresses
    // dedent synthesis for the first token of that line.
    in_block: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Result<Lexer<'a>, LexerError> {
        let mut lexer = Lexer {
            chars: source.chars().peekable(),
            current: None,
            indent: 0,
            pending_dedents: 0,
            at_line_start: true,
            in_block: false,
        };
        while lexer.chars.peek() == Some(&'\n') {
            lexer.chars.next();
        }
        lexer.parse_token()?;
        debug!("lexer ready, first token: {:?}", lexer.current());
        Ok(lexer)
    }

    /// The most recently produced token.
    pub fn current(&self) -> &Token {
        self.current.as_ref().unwrap_or(&EOF_TOKEN)
    }

    /// Produces the next token and returns it. Once `Eof` has been produced,
    /// every further call keeps returning `Eof`.
    pub fn advance(&mut self) -> Result<&Token, LexerError> {
        self.parse_token()?;
        Ok(self.current())
    }

    pub fn expect_id(&self) -> Result<&str, LexerError> {
        match self.current() {
            Token::Id(name) => Ok(name),
            _ => Err(LexerError::new("token type error")),
        }
    }

    pub fn expect_number(&self) -> Result<i64, LexerError> {
        match self.current() {
            Token::Number(value) => Ok(*value),
            _ => Err(LexerError::new("token type error")),
        }
    }

    pub fn expect_string(&self) -> Result<&str, LexerError> {
        match self.current() {
            Token::String(value) => Ok(value),
            _ => Err(LexerError::new("token type error")),
        }
    }

    /// Checks that the current token matches `expected`, variant and payload.
    pub fn expect_token(&self, expected: &Token) -> Result<(), LexerError> {
        self.expect_exact(expected, "token value error")
    }

    pub fn expect_next_id(&mut self) -> Result<&str, LexerError> {
        self.parse_token()?;
        self.expect_id()
    }

    pub fn expect_next_number(&mut self) -> Result<i64, LexerError> {
        self.parse_token()?;
        self.expect_number()
    }

    pub fn expect_next_token(&mut self, expected: &Token) -> Result<(), LexerError> {
        self.parse_token()?;
        self.expect_exact(expected, "next token value error")
    }

    fn expect_exact(&self, expected: &Token, value_error: &str) -> Result<(), LexerError> {
        if mem::discriminant(self.current()) != mem::discriminant(expected) {
            return Err(LexerError::new("token type error"));
        }
        if self.current() != expected {
            return Err(LexerError::new(value_error));
        }
        Ok(())
    }

    // Layout handling that runs before ordinary token recognition. Returns
    // false when it produced a token itself (Eof, Newline at end of input, or
    // a queued Dedent).
    fn check_layout(&mut self) -> bool {
        if matches!(self.current, Some(Token::Eof)) {
            return false;
        }
        if self.chars.peek().is_none() {
            if self.indent > 0 {
                self.indent -= 2;
                self.current = Some(Token::Dedent);
            } else if !matches!(self.current, Some(Token::Newline) | Some(Token::Dedent)) {
                self.current = Some(Token::Newline);
            } else {
                self.current = Some(Token::Eof);
            }
            return false;
        }
        if self.pending_dedents > 0 {
            self.pending_dedents -= 1;
            self.indent -= 2;
            self.current = Some(Token::Dedent);
            return false;
        }
        true
    }

    fn parse_token(&mut self) -> Result<(), LexerError> {
        loop {
            if !self.check_layout() {
                return Ok(());
            }
            let ch = match self.chars.peek() {
                Some(&c) => c,
                None => continue,
            };

            if ch == '#' {
                self.chars.next();
                for c in self.chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
                self.current = Some(Token::Newline);
                let absorb = self.at_line_start;
                self.at_line_start = true;
                if absorb {
                    continue;
                }
                return Ok(());
            }

            // Collapse runs of newlines into a single Newline token.
            if ch == '\n' && matches!(self.current, Some(Token::Newline)) {
                self.chars.next();
                self.at_line_start = true;
                continue;
            }

            // A non-space character at column 0 of a line while still inside
            // a block: leave it in the stream and release one Dedent.
            if self.at_line_start && self.indent > 0 && ch != ' ' && !self.in_block {
                self.current = Some(Token::Dedent);
                self.indent -= 2;
                return Ok(());
            }
            self.in_block = false;

            match ch {
                '\n' => {
                    self.chars.next();
                    self.current = Some(Token::Newline);
                    self.at_line_start = true;
                    return Ok(());
                }
                '\'' | '"' => {
                    self.chars.next();
                    self.parse_string(ch)?;
                }
                '0'..='9' => self.parse_number()?,
                'a'..='z' | 'A'..='Z' | '_' => self.parse_identifier(),
                ' ' => {
                    if !matches!(self.current, Some(Token::Newline)) {
                        // Space between tokens, not indentation.
                        self.chars.next();
                        continue;
                    }
                    if !self.parse_indent()? {
                        continue;
                    }
                }
                _ => {
                    self.chars.next();
                    self.parse_symbol(ch)?;
                }
            }
            self.at_line_start = false;
            return Ok(());
        }
    }

    // Measures the leading spaces of a fresh logical line. Returns true when
    // an Indent or Dedent token was produced, false when the line stays at
    // the current width and scanning should continue.
    fn parse_indent(&mut self) -> Result<bool, LexerError> {
        let mut spaces = 0usize;
        while self.chars.peek() == Some(&' ') {
            self.chars.next();
            spaces += 1;
        }
        if spaces == self.indent {
            self.in_block = true;
            return Ok(false);
        }
        if spaces == self.indent + 2 {
            self.indent += 2;
            self.current = Some(Token::Indent);
            return Ok(true);
        }
        if spaces < self.indent && (self.indent - spaces) % 2 == 0 {
            let difference = self.indent - spaces;
            self.current = Some(Token::Dedent);
            self.indent -= 2;
            self.pending_dedents += difference / 2 - 1;
            return Ok(true);
        }
        Err(LexerError::new(format!(
            "invalid indentation: {} spaces after a block of {}",
            spaces, self.indent
        )))
    }

    fn parse_string(&mut self, quote: char) -> Result<(), LexerError> {
        let mut value = String::new();
        loop {
            let ch = self
                .chars
                .next()
                .ok_or_else(|| LexerError::new("unterminated string literal"))?;
            if ch == quote {
                break;
            }
            if ch == '\\' {
                let escaped = self
                    .chars
                    .next()
                    .ok_or_else(|| LexerError::new("unterminated string literal"))?;
                match escaped {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    '"' => value.push('"'),
                    '\'' => value.push('\''),
                    '\\' => value.push('\\'),
                    other => value.push(other),
                }
            } else {
                value.push(ch);
            }
        }
        self.current = Some(Token::String(value));
        Ok(())
    }

    fn parse_number(&mut self) -> Result<(), LexerError> {
        let mut digits = String::new();
        while let Some(&c) = self.chars.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            digits.push(c);
            self.chars.next();
        }
        let value = digits
            .parse::<i64>()
            .map_err(|_| LexerError::new("number literal out of range"))?;
        self.current = Some(Token::Number(value));
        Ok(())
    }

    fn parse_identifier(&mut self) {
        let mut lexeme = String::new();
        while let Some(&c) = self.chars.peek() {
            if !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            lexeme.push(c);
            self.chars.next();
        }
        self.current = Some(match KEYWORDS.get(lexeme.as_str()) {
            Some(token) => token.clone(),
            None => Token::Id(lexeme),
        });
    }

    // `ch` has already been consumed.
    fn parse_symbol(&mut self, ch: char) -> Result<(), LexerError> {
        let token = match ch {
            '=' | '>' | '<' => {
                if self.chars.peek() == Some(&'=') {
                    self.chars.next();
                    match ch {
                        '=' => Token::Eq,
                        '>' => Token::GreaterOrEq,
                        _ => Token::LessOrEq,
                    }
                } else {
                    Token::Char(ch)
                }
            }
            '!' => {
                if self.chars.peek() == Some(&'=') {
                    self.chars.next();
                    Token::NotEq
                } else {
                    return Err(LexerError::new("unexpected character '!'"));
                }
            }
            other => Token::Char(other),
        };
        self.current = Some(token);
        Ok(())
    }
}

static KEYWORDS: phf::Map<&'static str, Token> = phf_map! {
    "class" => Token::Class,
    "return" => Token::Return,
    "if" => Token::If,
    "else" => Token::Else,
    "def" => Token::Def,
    "print" => Token::Print,
    "and" => Token::And,
    "or" => Token::Or,
    "not" => Token::Not,
    "None" => Token::None,
    "True" => Token::True,
    "False" => Token::False,
};
