pub mod token;

use crate::scanner::token::{Token, TokenType};
use std::collections::HashMap;
use thiserror::Error;

/// A lex error corrupts the character stream, so it aborts the whole scan.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("[line {line}] Error: Unterminated string.")]
    UnterminatedString { line: usize },
    #[error("[line {line}] Error: Unexpected character '{ch}'.")]
    UnexpectedCharacter { ch: char, line: usize },
}

impl LexError {
    pub fn line(&self) -> usize {
        match self {
            LexError::UnterminatedString { line } => *line,
            LexError::UnexpectedCharacter { line, .. } => *line,
        }
    }

    /// The message without the line prefix, for hosts that render their own
    /// location information.
    pub fn message(&self) -> String {
        match self {
            LexError::UnterminatedString { .. } => "Unterminated string.".to_string(),
            LexError::UnexpectedCharacter { ch, .. } => format!("Unexpected character '{ch}'."),
        }
    }
}

pub struct Scanner {
    source: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
    keywords: HashMap<String, TokenType>,
}

impl Scanner {
    pub fn new(source: impl Into<String>, keywords: &HashMap<String, TokenType>) -> Self {
        Scanner {
            source: source.into().chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            keywords: keywords.clone(),
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    pub fn scan_tokens(mut self) -> Result<Vec<Token>, LexError> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token()?;
        }

        self.tokens.push(Token::new(TokenType::Eof, "", self.line));
        Ok(self.tokens)
    }

    fn scan_token(&mut self) -> Result<(), LexError> {
        let c = self.advance();
        match c {
            '(' => self.add_token(TokenType::LeftParen),
            ')' => self.add_token(TokenType::RightParen),
            '{' => self.add_token(TokenType::LeftBrace),
            '}' => self.add_token(TokenType::RightBrace),
            ',' => self.add_token(TokenType::Comma),
            '.' => self.add_token(TokenType::Dot),
            '-' => self.add_token(TokenType::Minus),
            '+' => self.add_token(TokenType::Plus),
            ';' => self.add_token(TokenType::Semicolon),
            '*' => self.add_token(TokenType::Star),

            // One or two character tokens
            '!' => {
                let token_type = if self.match_char('=') {
                    TokenType::NotEqual
                } else {
                    TokenType::Bang
                };
                self.add_token(token_type);
            }

            '=' => {
                let token_type = if self.match_char('=') {
                    TokenType::Equal
                } else {
                    TokenType::Assign
                };
                self.add_token(token_type);
            }

            '>' => {
                let token_type = if self.match_char('=') {
                    TokenType::GreaterEqual
                } else {
                    TokenType::Greater
                };
                self.add_token(token_type);
            }

            '<' => {
                let token_type = if self.match_char('=') {
                    TokenType::LessEqual
                } else {
                    TokenType::Less
                };
                self.add_token(token_type);
            }

            '/' => {
                // Handle comments or division
                if self.match_char('/') {
                    // Comment goes until end of line
                    while self.peek() != Some('\n') && !self.is_at_end() {
                        self.advance();
                    }
                } else {
                    self.add_token(TokenType::Slash);
                }
            }

            // Whitespace (not newlines)
            ' ' | '\r' | '\t' => {}

            '\n' => self.line += 1,

            // strings
            '"' => self.handle_string()?,

            // numbers
            c if c.is_ascii_digit() => self.handle_number(),

            // identifiers
            c if c.is_ascii_alphabetic() || c == '_' => self.handle_identifier(),

            _ => {
                return Err(LexError::UnexpectedCharacter {
                    ch: c,
                    line: self.line,
                })
            }
        }

        Ok(())
    }

    fn advance(&mut self) -> char {
        let ch = self.current_char().expect("Unexpected EOF");
        self.current += 1;
        ch
    }

    fn current_char(&self) -> Option<char> {
        self.source.get(self.current).copied()
    }

    fn peek(&self) -> Option<char> {
        self.current_char()
    }

    fn peek_next(&self) -> Option<char> {
        self.source.get(self.current + 1).copied()
    }

    fn match_char(&mut self, expected: char) -> bool {
        match self.current_char() {
            Some(ch) if ch == expected => {
                self.current += 1;
                true
            }
            _ => false,
        }
    }

    fn handle_string(&mut self) -> Result<(), LexError> {
        while self.peek() != Some('"') && !self.is_at_end() {
            if self.peek() == Some('\n') {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            return Err(LexError::UnterminatedString { line: self.line });
        }

        // consume the closing quote
        self.advance();

        // the string value is the raw text between the quotes, no escape
        // processing: a backslash-n stays a backslash followed by an 'n'
        let value = self.source[self.start + 1..self.current - 1]
            .iter()
            .collect::<String>();
        self.add_token(TokenType::String(value));
        Ok(())
    }

    fn handle_number(&mut self) {
        // First character is already consumed and is a digit

        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        // A '.' only belongs to the number when a digit follows; a trailing
        // dot is left unconsumed so "123." scans as NUMBER then DOT
        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.advance(); // consume '.'

            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let text: String = self.source[self.start..self.current].iter().collect();
        let value = text.parse::<f64>().expect("digit runs parse as f64");
        self.add_token(TokenType::Number(value));
    }

    fn handle_identifier(&mut self) {
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }

        let text: String = self.source[self.start..self.current].iter().collect();

        // Keywords are an exact, case-sensitive match; anything else is an
        // identifier
        let token_type = self
            .keywords
            .get(&text)
            .cloned()
            .unwrap_or(TokenType::Identifier);

        self.add_token(token_type);
    }

    fn add_token(&mut self, t: TokenType) {
        let text = self.source[self.start..self.current]
            .iter()
            .collect::<String>();
        self.tokens.push(Token::new(t, text, self.line));
    }
}
