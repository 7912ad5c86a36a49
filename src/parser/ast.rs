use crate::scanner::token::Token;

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Expression(Expr),
    Print(Expr),
    Var {
        name: Token,
        initializer: Option<Expr>,
    },
    Block(Vec<Stmt>),
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    Function(FunctionDecl),
    Return {
        keyword: Token,
        value: Option<Expr>,
    },
    Class {
        name: Token,
        // always a Variable expression when present, kept as an Expr so a
        // resolver can treat it like any other variable reference
        superclass: Option<Expr>,
        methods: Vec<FunctionDecl>,
    },
}

/// Shared by free functions and class methods, which use the same grammar.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    // Primary Expressions
    Number(f64),
    Str(String),
    Bool(bool),
    Nil,
    Grouping(Box<Expr>),
    Variable {
        name: Token,
    },
    This {
        keyword: Token,
    },
    Super {
        keyword: Token,
        method: Token,
    },

    // Operator Expressions
    Assign {
        name: Token,
        value: Box<Expr>,
    },
    Unary {
        operator: Token,
        operand: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    // Kept apart from Binary: the evaluator short-circuits these
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    // Calls and properties
    Call {
        callee: Box<Expr>,
        // closing ')', kept for runtime error locations
        paren: Token,
        arguments: Vec<Expr>,
    },
    Get {
        object: Box<Expr>,
        name: Token,
    },
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },
}
