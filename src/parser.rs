pub mod ast;

use crate::parser::ast::{Expr, ExprKind, FunctionDecl, Program, Stmt, StmtKind};
use crate::scanner::token::{Token, TokenType};
use std::fmt;

// parameter and argument lists beyond this are reported but still collected
const MAX_ARITY: usize = 255;

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.token.token_type == TokenType::Eof {
            write!(f, "[line {}] Error at end: {}", self.token.line, self.message)
        } else {
            write!(
                f,
                "[line {}] Error at '{}': {}",
                self.token.line, self.token.lexeme, self.message
            )
        }
    }
}

impl std::error::Error for ParseError {}

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    errors: Vec<ParseError>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            errors: Vec::new(),
        }
    }

    // utility methods
    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::Eof
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn check(&self, token_type: TokenType) -> bool {
        if self.is_at_end() {
            return false;
        }
        self.peek().token_type == token_type
    }

    fn match_any(&mut self, types: &[TokenType]) -> bool {
        for t in types {
            if self.check(t.clone()) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn error_expected(&self, expected: &str) -> ParseError {
        let current = self.peek();
        let context = if self.current > 0 {
            format!(" after '{}'", self.previous().lexeme)
        } else {
            String::new()
        };
        ParseError {
            token: current.clone(),
            message: format!(
                "Expected {}{}, got {:?}",
                expected, context, current.token_type
            ),
        }
    }

    fn consume(&mut self, token_type: TokenType, expected: &str) -> Result<&Token, ParseError> {
        if self.check(token_type) {
            Ok(self.advance())
        } else {
            Err(self.error_expected(expected))
        }
    }

    // Non-fatal diagnostic at the current token; parsing continues.
    fn report(&mut self, message: impl Into<String>) {
        let error = ParseError {
            token: self.peek().clone(),
            message: message.into(),
        };
        self.errors.push(error);
    }

    /// Parses the whole token sequence. Declarations that fail to parse are
    /// dropped from the program; every diagnostic collected along the way is
    /// returned alongside it, so one call surfaces all independent errors.
    pub fn parse(mut self) -> (Program, Vec<ParseError>) {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        (Program { statements }, self.errors)
    }

    fn synchronize(&mut self) {
        self.advance(); // Skip the token that caused the error

        while !self.is_at_end() {
            // A semicolon ends a statement, so we're at a fresh start
            if self.previous().token_type == TokenType::Semicolon {
                return;
            }

            // A keyword that begins a declaration is a safe place to resume
            match self.peek().token_type {
                TokenType::Class
                | TokenType::Fun
                | TokenType::Var
                | TokenType::For
                | TokenType::If
                | TokenType::While
                | TokenType::Print
                | TokenType::Return => return,
                _ => {}
            }

            self.advance(); // Keep skipping
        }
    }

    // Errors never escape past this level: a failed declaration is recorded,
    // the parser re-synchronizes, and the declaration is dropped.
    fn declaration(&mut self) -> Option<Stmt> {
        let result = if self.check(TokenType::Class) {
            self.class_decl()
        } else if self.check(TokenType::Fun) {
            self.fun_decl()
        } else if self.check(TokenType::Var) {
            self.var_decl()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(e) => {
                self.errors.push(e);
                self.synchronize();
                None
            }
        }
    }

    fn class_decl(&mut self) -> Result<Stmt, ParseError> {
        let line = self.peek().line;
        self.advance(); // consume class

        let name = self.consume(TokenType::Identifier, "class name")?.clone();

        let superclass = if self.check(TokenType::Less) {
            self.advance();
            let parent = self
                .consume(TokenType::Identifier, "superclass name")?
                .clone();
            let parent_line = parent.line;
            Some(Expr {
                kind: ExprKind::Variable { name: parent },
                line: parent_line,
            })
        } else {
            None
        };

        self.consume(TokenType::LeftBrace, "'{' before class body")?;

        let mut methods = Vec::new();
        while !self.check(TokenType::RightBrace) && !self.is_at_end() {
            methods.push(self.function("method")?);
        }

        self.consume(TokenType::RightBrace, "'}' after class body")?;

        Ok(Stmt {
            kind: StmtKind::Class {
                name,
                superclass,
                methods,
            },
            line,
        })
    }

    fn fun_decl(&mut self) -> Result<Stmt, ParseError> {
        let line = self.peek().line;
        self.advance(); // consume fun
        let function = self.function("function")?;

        Ok(Stmt {
            kind: StmtKind::Function(function),
            line,
        })
    }

    // Shared by free functions and class methods
    fn function(&mut self, kind: &str) -> Result<FunctionDecl, ParseError> {
        let line = self.peek().line;
        let name = self
            .consume(TokenType::Identifier, &format!("{kind} name"))?
            .clone();

        self.consume(TokenType::LeftParen, &format!("'(' after {kind} name"))?;
        let mut params = Vec::new();
        if !self.check(TokenType::RightParen) {
            loop {
                if params.len() >= MAX_ARITY {
                    self.report(format!("Can't have more than {MAX_ARITY} parameters"));
                }
                params.push(self.consume(TokenType::Identifier, "parameter name")?.clone());

                if !self.check(TokenType::Comma) {
                    break;
                }
                self.advance();
            }
        }
        self.consume(TokenType::RightParen, "')' after parameters")?;

        self.consume(TokenType::LeftBrace, &format!("'{{' before {kind} body"))?;
        let body = self.block_statements()?;

        Ok(FunctionDecl {
            name,
            params,
            body,
            line,
        })
    }

    fn var_decl(&mut self) -> Result<Stmt, ParseError> {
        let line = self.peek().line;
        self.advance(); // consume var

        let name = self.consume(TokenType::Identifier, "variable name")?.clone();

        let initializer = if self.check(TokenType::Assign) {
            self.advance();
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenType::Semicolon, "';' after variable declaration")?;

        Ok(Stmt {
            kind: StmtKind::Var { name, initializer },
            line,
        })
    }

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        if self.check(TokenType::For) {
            self.for_stmt()
        } else if self.check(TokenType::If) {
            self.if_stmt()
        } else if self.check(TokenType::Print) {
            self.print_stmt()
        } else if self.check(TokenType::Return) {
            self.return_stmt()
        } else if self.check(TokenType::While) {
            self.while_stmt()
        } else if self.check(TokenType::LeftBrace) {
            self.block()
        } else {
            self.expr_stmt()
        }
    }

    // "for" has no AST node of its own: it desugars into the initializer
    // followed by a while loop whose body appends the increment.
    fn for_stmt(&mut self) -> Result<Stmt, ParseError> {
        let line = self.peek().line;
        self.advance(); // consume for
        self.consume(TokenType::LeftParen, "'(' after 'for'")?;

        let initializer = if self.check(TokenType::Semicolon) {
            self.advance();
            None
        } else if self.check(TokenType::Var) {
            Some(self.var_decl()?)
        } else {
            Some(self.expr_stmt()?)
        };

        let condition = if !self.check(TokenType::Semicolon) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenType::Semicolon, "';' after loop condition")?;

        let increment = if !self.check(TokenType::RightParen) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenType::RightParen, "')' after for clauses")?;

        let mut body = self.statement()?;

        if let Some(increment) = increment {
            let body_line = body.line;
            let increment_line = increment.line;
            body = Stmt {
                kind: StmtKind::Block(vec![
                    body,
                    Stmt {
                        kind: StmtKind::Expression(increment),
                        line: increment_line,
                    },
                ]),
                line: body_line,
            };
        }

        // An omitted condition loops forever
        let condition = condition.unwrap_or(Expr {
            kind: ExprKind::Bool(true),
            line,
        });
        body = Stmt {
            kind: StmtKind::While {
                condition,
                body: Box::new(body),
            },
            line,
        };

        if let Some(initializer) = initializer {
            body = Stmt {
                kind: StmtKind::Block(vec![initializer, body]),
                line,
            };
        }

        Ok(body)
    }

    fn if_stmt(&mut self) -> Result<Stmt, ParseError> {
        let line = self.peek().line;
        self.advance(); // consume if
        self.consume(TokenType::LeftParen, "'(' after 'if'")?;
        let condition = self.expression()?;
        self.consume(TokenType::RightParen, "')' after if condition")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.check(TokenType::Else) {
            self.advance();
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt {
            kind: StmtKind::If {
                condition,
                then_branch,
                else_branch,
            },
            line,
        })
    }

    fn print_stmt(&mut self) -> Result<Stmt, ParseError> {
        let line = self.peek().line;
        self.advance(); // consume print
        let value = self.expression()?;
        self.consume(TokenType::Semicolon, "';' after value")?;

        Ok(Stmt {
            kind: StmtKind::Print(value),
            line,
        })
    }

    fn return_stmt(&mut self) -> Result<Stmt, ParseError> {
        let line = self.peek().line;
        let keyword = self.advance().clone(); // consume return

        let value = if !self.check(TokenType::Semicolon) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenType::Semicolon, "';' after return value")?;

        Ok(Stmt {
            kind: StmtKind::Return { keyword, value },
            line,
        })
    }

    fn while_stmt(&mut self) -> Result<Stmt, ParseError> {
        let line = self.peek().line;
        self.advance(); // consume while
        self.consume(TokenType::LeftParen, "'(' after 'while'")?;
        let condition = self.expression()?;
        self.consume(TokenType::RightParen, "')' after condition")?;
        let body = Box::new(self.statement()?);

        Ok(Stmt {
            kind: StmtKind::While { condition, body },
            line,
        })
    }

    fn block(&mut self) -> Result<Stmt, ParseError> {
        let line = self.peek().line;
        self.advance(); // consume {
        let statements = self.block_statements()?;

        Ok(Stmt {
            kind: StmtKind::Block(statements),
            line,
        })
    }

    // Body of a brace-delimited block; the '{' is already consumed.
    fn block_statements(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut statements = Vec::new();

        while !self.check(TokenType::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.consume(TokenType::RightBrace, "'}' after block")?;
        Ok(statements)
    }

    fn expr_stmt(&mut self) -> Result<Stmt, ParseError> {
        let line = self.peek().line;
        let expr = self.expression()?;
        self.consume(TokenType::Semicolon, "';' after expression")?;

        Ok(Stmt {
            kind: StmtKind::Expression(expr),
            line,
        })
    }

    fn expression(&mut self) -> Result<Expr, ParseError> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr, ParseError> {
        let expr = self.logic_or()?;

        if self.check(TokenType::Assign) {
            let equals = self.peek().clone();
            self.advance();
            let value = Box::new(self.assignment()?); // right-associative

            let line = expr.line;
            return Ok(match expr.kind {
                ExprKind::Variable { name } => Expr {
                    kind: ExprKind::Assign { name, value },
                    line,
                },
                ExprKind::Get { object, name } => Expr {
                    kind: ExprKind::Set {
                        object,
                        name,
                        value,
                    },
                    line,
                },
                other => {
                    // report the bad target but keep the parsed expression
                    self.errors.push(ParseError {
                        token: equals,
                        message: "Invalid assignment target".to_string(),
                    });
                    Expr { kind: other, line }
                }
            });
        }

        Ok(expr)
    }

    fn logic_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.logic_and()?;

        while self.check(TokenType::Or) {
            let operator = self.advance().clone();
            let line = left.line;
            let right = self.logic_and()?;
            left = Expr {
                kind: ExprKind::Logical {
                    left: Box::new(left),
                    operator,
                    right: Box::new(right),
                },
                line,
            };
        }

        Ok(left)
    }

    fn logic_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.equality()?;

        while self.check(TokenType::And) {
            let operator = self.advance().clone();
            let line = left.line;
            let right = self.equality()?;
            left = Expr {
                kind: ExprKind::Logical {
                    left: Box::new(left),
                    operator,
                    right: Box::new(right),
                },
                line,
            };
        }

        Ok(left)
    }

    fn equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.comparison()?;

        while self.match_any(&[TokenType::Equal, TokenType::NotEqual]) {
            let operator = self.previous().clone();
            let line = left.line;
            let right = self.comparison()?;
            left = Expr {
                kind: ExprKind::Binary {
                    left: Box::new(left),
                    operator,
                    right: Box::new(right),
                },
                line,
            };
        }

        Ok(left)
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.term()?;

        while self.match_any(&[
            TokenType::Less,
            TokenType::LessEqual,
            TokenType::Greater,
            TokenType::GreaterEqual,
        ]) {
            let operator = self.previous().clone();
            let line = left.line;
            let right = self.term()?;
            left = Expr {
                kind: ExprKind::Binary {
                    left: Box::new(left),
                    operator,
                    right: Box::new(right),
                },
                line,
            };
        }

        Ok(left)
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.factor()?;

        while self.match_any(&[TokenType::Plus, TokenType::Minus]) {
            let operator = self.previous().clone();
            let line = left.line;
            let right = self.factor()?;
            left = Expr {
                kind: ExprKind::Binary {
                    left: Box::new(left),
                    operator,
                    right: Box::new(right),
                },
                line,
            };
        }

        Ok(left)
    }

    fn factor(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.unary()?;

        while self.match_any(&[TokenType::Star, TokenType::Slash]) {
            let operator = self.previous().clone();
            let line = left.line;
            let right = self.unary()?;
            left = Expr {
                kind: ExprKind::Binary {
                    left: Box::new(left),
                    operator,
                    right: Box::new(right),
                },
                line,
            };
        }

        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.match_any(&[TokenType::Bang, TokenType::Minus]) {
            let operator = self.previous().clone();
            let line = operator.line;
            let operand = self.unary()?; // recursive for chained unary: !!x
            Ok(Expr {
                kind: ExprKind::Unary {
                    operator,
                    operand: Box::new(operand),
                },
                line,
            })
        } else {
            self.call()
        }
    }

    fn call(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;

        loop {
            if self.check(TokenType::LeftParen) {
                self.advance();
                expr = self.finish_call(expr)?;
            } else if self.check(TokenType::Dot) {
                self.advance();
                let name = self
                    .consume(TokenType::Identifier, "property name after '.'")?
                    .clone();
                let line = expr.line;

                expr = Expr {
                    kind: ExprKind::Get {
                        object: Box::new(expr),
                        name,
                    },
                    line,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> Result<Expr, ParseError> {
        let mut arguments = Vec::new();

        if !self.check(TokenType::RightParen) {
            loop {
                if arguments.len() >= MAX_ARITY {
                    self.report(format!("Can't have more than {MAX_ARITY} arguments"));
                }
                arguments.push(self.expression()?);

                if !self.check(TokenType::Comma) {
                    break;
                }
                self.advance();
            }
        }

        let paren = self
            .consume(TokenType::RightParen, "')' after arguments")?
            .clone();
        let line = callee.line;

        Ok(Expr {
            kind: ExprKind::Call {
                callee: Box::new(callee),
                paren,
                arguments,
            },
            line,
        })
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek().clone();
        let line = token.line;

        match &token.token_type {
            TokenType::Number(n) => {
                let value = *n;
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Number(value),
                    line,
                })
            }
            TokenType::String(s) => {
                let value = s.clone();
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Str(value),
                    line,
                })
            }
            TokenType::True => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Bool(true),
                    line,
                })
            }
            TokenType::False => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Bool(false),
                    line,
                })
            }
            TokenType::Nil => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Nil,
                    line,
                })
            }
            TokenType::Identifier => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Variable { name: token },
                    line,
                })
            }
            TokenType::This => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::This { keyword: token },
                    line,
                })
            }
            TokenType::Super => {
                self.advance();
                self.consume(TokenType::Dot, "'.' after 'super'")?;
                let method = self
                    .consume(TokenType::Identifier, "superclass method name")?
                    .clone();
                Ok(Expr {
                    kind: ExprKind::Super {
                        keyword: token,
                        method,
                    },
                    line,
                })
            }
            TokenType::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume(TokenType::RightParen, "')' after expression")?;
                Ok(Expr {
                    kind: ExprKind::Grouping(Box::new(expr)),
                    line,
                })
            }
            _ => Err(self.error_expected("expression")),
        }
    }
}
