#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    pub line: usize,
}

impl Token {
    pub fn new(token_type: TokenType, lexeme: impl Into<String>, line: usize) -> Self {
        Token {
            token_type,
            lexeme: lexeme.into(),
            line,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenType {
    // Single-character tokens
    LeftParen,  // (
    RightParen, // )
    LeftBrace,  // {
    RightBrace, // }
    Comma,      // ,
    Dot,        // .
    Minus,      // -
    Plus,       // +
    Semicolon,  // ;
    Slash,      // /
    Star,       // *

    // One or two character tokens
    Bang,         // !
    NotEqual,     // !=
    Assign,       // =
    Equal,        // ==
    Greater,      // >
    GreaterEqual, // >=
    Less,         // <
    LessEqual,    // <=

    // Literals
    Identifier,     // variable names, function names
    String(String), // "hello world", value excludes the quotes
    Number(f64),    // 123, 45.67

    // Keywords
    And,    // and
    Class,  // class
    Else,   // else
    False,  // false
    Fun,    // fun
    For,    // for
    If,     // if
    Nil,    // nil
    Or,     // or
    Print,  // print
    Return, // return
    Super,  // super
    This,   // this
    True,   // true
    Var,    // var
    While,  // while

    // Control
    Eof, // end of file
}
