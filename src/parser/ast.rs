// AST (Abstract Syntax Tree) definitions for the Xene interpreter

use super::token::Position;
use std::ops::Range;
use std::sync::Arc;

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Logical
    And,
    Or,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,     // -x
    Not,     // !x
    PostInc, // x++
    PostDec, // x--
}

impl UnOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnOp::Neg => "-",
            UnOp::Not => "!",
            UnOp::PostInc => "++",
            UnOp::PostDec => "--",
        }
    }
}

/// Built-in functions reachable through a `fn_name` primary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Abs,
    Min,
    Max,
    Len,
    NewList,
    Str,
    Range,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Builtin> {
        match name {
            "abs" => Some(Builtin::Abs),
            "min" => Some(Builtin::Min),
            "max" => Some(Builtin::Max),
            "len" => Some(Builtin::Len),
            "new_list" => Some(Builtin::NewList),
            "str" => Some(Builtin::Str),
            "range" => Some(Builtin::Range),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Abs => "abs",
            Builtin::Min => "min",
            Builtin::Max => "max",
            Builtin::Len => "len",
            Builtin::NewList => "new_list",
            Builtin::Str => "str",
            Builtin::Range => "range",
        }
    }

    /// Number of arguments the built-in takes
    pub fn arity(self) -> usize {
        match self {
            Builtin::Min | Builtin::Max => 2,
            _ => 1,
        }
    }
}

/// Expression nodes
#[derive(Debug, Clone)]
pub enum Expr {
    Int(i64),
    Str(String),
    Bool(bool),
    Var(String, Position),
    /// The `input` binding supplied by the caller
    Input(Position),
    Builtin(Builtin),
    List(Vec<Expr>, Position),
    /// Parenthesized expression; kept so that `(x)++` is not addressable
    Group(Box<Expr>),
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
        location: Position,
    },
    Member {
        target: Box<Expr>,
        name: String,
        location: Position,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        location: Position,
    },
    Unary {
        op: UnOp,
        operand: Box<Expr>,
        location: Position,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        location: Position,
    },
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
        location: Position,
    },
    Lambda(Arc<FunctionDef>),
}

impl Expr {
    /// Whether the expression names a storage slot: a variable or an
    /// element of an indexed container.
    pub fn is_addressable(&self) -> bool {
        matches!(self, Expr::Var(..) | Expr::Index { .. })
    }

    /// Short description used in error messages
    pub fn describe(&self) -> &'static str {
        match self {
            Expr::Int(_) => "integer literal",
            Expr::Str(_) => "string literal",
            Expr::Bool(_) => "boolean literal",
            Expr::Var(..) => "variable",
            Expr::Input(_) => "input",
            Expr::Builtin(_) => "built-in function",
            Expr::List(..) => "list literal",
            Expr::Group(_) => "parenthesized expression",
            Expr::Index { .. } => "index expression",
            Expr::Member { .. } => "member access",
            Expr::Call { .. } => "call",
            Expr::Unary { .. } => "unary expression",
            Expr::Binary { .. } => "binary expression",
            Expr::Assign { .. } => "assignment",
            Expr::Lambda(_) => "function",
        }
    }
}

/// Statement nodes
#[derive(Debug, Clone)]
pub enum Stmt {
    Expr(Expr),
    Return(Expr, Position),
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
        location: Position,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
        location: Position,
    },
    Foreach {
        var: String,
        iterable: Expr,
        body: Vec<Stmt>,
        location: Position,
    },
}

/// Function body: a single expression or a statement block
#[derive(Debug, Clone)]
pub enum Body {
    Expr(Expr),
    Block(Vec<Stmt>),
}

/// A function literal (or a whole program, which is a parameterless function)
#[derive(Debug)]
pub struct FunctionDef {
    pub params: Vec<String>,
    pub body: Body,
    /// Source text the function was parsed from
    pub source: Arc<str>,
    /// Byte range of the function in `source`
    pub span: Range<usize>,
    pub location: Position,
}
