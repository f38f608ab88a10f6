//! Xene grammar: productions and their reduction functions
//!
//! Each [`Production`] pairs a right-hand side with a [`ReduceFn`] that folds
//! the popped stack attributes into one new attribute.  Reduction functions
//! are where the AST is built, where literal negation is folded, and where
//! semantic rejections happen (non-addressable `++`/`--`/`=` targets, unknown
//! built-ins, out-of-range literal indexing).  A rejection is returned as an
//! `Err(message)` and the driver turns it into a positioned parse error.

use super::ast::*;
use super::token::{Position, Token, TokenKind};
use std::sync::Arc;

/// Non-terminal symbols; the discriminant order is the goto-table column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NonTerminal {
    Start,
    Program,
    Stmts,
    StmtList,
    /// Statement list ending in a simple statement
    Open,
    /// Statement list ending in a compound statement or a separator
    Closed,
    Simple,
    Compound,
    If,
    Expr,
    Lambda,
    Params,
    ParamList,
    Or,
    And,
    Cmp,
    Sum,
    Term,
    Unary,
    Postfix,
    Primary,
    Args,
    ArgList,
}

impl NonTerminal {
    pub const COUNT: usize = 23;

    pub fn index(self) -> usize {
        self as usize
    }

    /// Symbols that collect siblings rather than nest them
    fn is_sequence(self) -> bool {
        matches!(
            self,
            NonTerminal::Start
                | NonTerminal::Program
                | NonTerminal::Stmts
                | NonTerminal::StmtList
                | NonTerminal::Open
                | NonTerminal::Closed
                | NonTerminal::Params
                | NonTerminal::ParamList
                | NonTerminal::Args
                | NonTerminal::ArgList
        )
    }
}

/// Deepest syntactic nesting a program may have
pub const MAX_NESTING: usize = 1_000;

/// A grammar symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sym {
    T(TokenKind),
    N(NonTerminal),
}

/// Attribute attached to a parse-stack slot
#[derive(Debug, Clone)]
pub enum Attrib {
    /// Bottom of the stack, or an attribute already moved out
    Empty,
    Token(Token),
    Expr(Expr),
    Stmt(Stmt),
    Stmts(Vec<Stmt>),
    Names(Vec<String>),
    Exprs(Vec<Expr>),
    /// Marker left by error recovery
    Error,
}

impl Attrib {
    /// Short description used when listing discarded symbols
    pub fn describe(&self) -> String {
        match self {
            Attrib::Empty => "<empty>".to_string(),
            Attrib::Token(token) => token.to_string(),
            Attrib::Expr(expr) => expr.describe().to_string(),
            Attrib::Stmt(_) => "statement".to_string(),
            Attrib::Stmts(stmts) => format!("{} statement(s)", stmts.len()),
            Attrib::Names(_) => "parameter list".to_string(),
            Attrib::Exprs(_) => "argument list".to_string(),
            Attrib::Error => "error".to_string(),
        }
    }
}

/// An attribute together with the source extent it covers
#[derive(Debug, Clone)]
pub struct Slot {
    pub attrib: Attrib,
    pub start: Position,
    /// Byte offset one past the last covered byte
    pub end: usize,
    /// Syntactic nesting of the attribute; tokens are 0
    pub depth: usize,
}

/// The popped right-hand side of a production, handed to its reduction function
pub struct Reduction<'a> {
    slots: Vec<Slot>,
    pub start: Position,
    pub end: usize,
    pub source: &'a Arc<str>,
}

impl<'a> Reduction<'a> {
    pub fn new(slots: Vec<Slot>, start: Position, end: usize, source: &'a Arc<str>) -> Self {
        Self {
            slots,
            start,
            end,
            source,
        }
    }

    fn take(&mut self, i: usize) -> Attrib {
        std::mem::replace(&mut self.slots[i].attrib, Attrib::Empty)
    }

    fn pos(&self, i: usize) -> Position {
        self.slots[i].start
    }

    fn token(&mut self, i: usize) -> Token {
        match self.take(i) {
            Attrib::Token(token) => token,
            other => mismatch("token", i, &other),
        }
    }

    fn expr(&mut self, i: usize) -> Expr {
        match self.take(i) {
            Attrib::Expr(expr) => expr,
            other => mismatch("expression", i, &other),
        }
    }

    fn stmt(&mut self, i: usize) -> Stmt {
        match self.take(i) {
            Attrib::Stmt(stmt) => stmt,
            other => mismatch("statement", i, &other),
        }
    }

    fn stmts(&mut self, i: usize) -> Vec<Stmt> {
        match self.take(i) {
            Attrib::Stmts(stmts) => stmts,
            other => mismatch("statement list", i, &other),
        }
    }

    fn names(&mut self, i: usize) -> Vec<String> {
        match self.take(i) {
            Attrib::Names(names) => names,
            other => mismatch("parameter list", i, &other),
        }
    }

    fn exprs(&mut self, i: usize) -> Vec<Expr> {
        match self.take(i) {
            Attrib::Exprs(exprs) => exprs,
            other => mismatch("argument list", i, &other),
        }
    }
}

fn mismatch(expected: &str, i: usize, found: &Attrib) -> ! {
    unreachable!("reduction expected {} in slot {}, found {:?}", expected, i, found)
}

pub type ReduceFn = fn(&mut Reduction<'_>) -> Result<Attrib, String>;

/// A grammar production
pub struct Production {
    pub lhs: NonTerminal,
    pub rhs: &'static [Sym],
    pub reduce: ReduceFn,
}

impl Production {
    pub fn arity(&self) -> usize {
        self.rhs.len()
    }

    /// Whether reducing adds a level of nesting over the deepest operand.
    /// Unit rules and sibling lists do not.
    pub fn nests(&self) -> bool {
        self.arity() >= 2 && !self.lhs.is_sequence()
    }
}

const fn t(kind: TokenKind) -> Sym {
    Sym::T(kind)
}

const fn n(nt: NonTerminal) -> Sym {
    Sym::N(nt)
}

use NonTerminal as N;
use TokenKind as K;

macro_rules! prod {
    ($lhs:ident => [$($sym:expr),*], $reduce:expr) => {
        Production {
            lhs: N::$lhs,
            rhs: &[$($sym),*],
            reduce: $reduce,
        }
    };
}

/// The production list. Production 0 is the augmented start rule.
pub static PRODUCTIONS: [Production; 70] = [
    // 0
    prod!(Start => [n(N::Program)], pass),
    prod!(Program => [n(N::Stmts)], pass),
    prod!(Stmts => [], empty_stmts),
    prod!(Stmts => [n(N::StmtList)], pass),
    prod!(StmtList => [n(N::Open)], pass),
    // 5
    prod!(StmtList => [n(N::Closed)], pass),
    prod!(Open => [n(N::Simple)], start_list),
    prod!(Open => [n(N::Closed), n(N::Simple)], append_statement),
    prod!(Closed => [n(N::Compound)], start_list),
    prod!(Closed => [n(N::StmtList), t(K::Semicolon)], pass),
    // 10
    prod!(Closed => [n(N::StmtList), n(N::Compound)], append_statement),
    prod!(Simple => [n(N::Expr)], expr_stmt),
    prod!(Simple => [t(K::Return), n(N::Expr)], return_stmt),
    prod!(Simple => [t(K::Error)], error_stmt),
    prod!(Compound => [n(N::If)], pass),
    // 15
    prod!(Compound => [t(K::While), n(N::Expr), t(K::LBrace), n(N::Stmts), t(K::RBrace)], while_stmt),
    prod!(Compound => [t(K::Foreach), t(K::Var), t(K::In), n(N::Expr), t(K::LBrace), n(N::Stmts), t(K::RBrace)], foreach_stmt),
    prod!(If => [t(K::If), n(N::Expr), t(K::LBrace), n(N::Stmts), t(K::RBrace)], if_stmt),
    prod!(If => [t(K::If), n(N::Expr), t(K::LBrace), n(N::Stmts), t(K::RBrace), t(K::Else), t(K::LBrace), n(N::Stmts), t(K::RBrace)], if_else_stmt),
    prod!(If => [t(K::If), n(N::Expr), t(K::LBrace), n(N::Stmts), t(K::RBrace), t(K::Else), n(N::If)], if_else_if_stmt),
    // 20
    prod!(Expr => [n(N::Lambda)], pass),
    prod!(Expr => [n(N::Postfix), t(K::Assign), n(N::Expr)], assign),
    prod!(Expr => [n(N::Or)], pass),
    prod!(Lambda => [t(K::Function), n(N::Params), t(K::Arrow), n(N::Expr)], lambda_expr),
    prod!(Lambda => [t(K::Function), n(N::Params), t(K::Arrow), t(K::LBrace), n(N::Stmts), t(K::RBrace)], lambda_block),
    // 25
    prod!(Params => [], empty_names),
    prod!(Params => [n(N::ParamList)], pass),
    prod!(ParamList => [t(K::Var)], start_names),
    prod!(ParamList => [n(N::ParamList), t(K::Comma), t(K::Var)], append_name),
    prod!(Or => [n(N::Or), t(K::OrOr), n(N::And)], binary),
    // 30
    prod!(Or => [n(N::And)], pass),
    prod!(And => [n(N::And), t(K::AndAnd), n(N::Cmp)], binary),
    prod!(And => [n(N::Cmp)], pass),
    prod!(Cmp => [n(N::Sum), t(K::EqEq), n(N::Sum)], binary),
    prod!(Cmp => [n(N::Sum), t(K::NotEq), n(N::Sum)], binary),
    // 35
    prod!(Cmp => [n(N::Sum), t(K::Lt), n(N::Sum)], binary),
    prod!(Cmp => [n(N::Sum), t(K::LtEq), n(N::Sum)], binary),
    prod!(Cmp => [n(N::Sum), t(K::Gt), n(N::Sum)], binary),
    prod!(Cmp => [n(N::Sum), t(K::GtEq), n(N::Sum)], binary),
    prod!(Cmp => [n(N::Sum)], pass),
    // 40
    prod!(Sum => [n(N::Sum), t(K::Plus), n(N::Term)], binary),
    prod!(Sum => [n(N::Sum), t(K::Minus), n(N::Term)], binary),
    prod!(Sum => [n(N::Term)], pass),
    prod!(Term => [n(N::Term), t(K::Star), n(N::Unary)], binary),
    prod!(Term => [n(N::Term), t(K::Slash), n(N::Unary)], binary),
    // 45
    prod!(Term => [n(N::Term), t(K::Percent), n(N::Unary)], binary),
    prod!(Term => [n(N::Unary)], pass),
    prod!(Unary => [t(K::Minus), n(N::Unary)], negate),
    prod!(Unary => [t(K::Bang), n(N::Postfix)], logical_not),
    prod!(Unary => [n(N::Postfix)], pass),
    // 50
    prod!(Postfix => [n(N::Primary)], pass),
    prod!(Postfix => [n(N::Postfix), t(K::LBracket), n(N::Expr), t(K::RBracket)], index),
    prod!(Postfix => [n(N::Postfix), t(K::Dot), t(K::FnName)], member),
    prod!(Postfix => [n(N::Postfix), t(K::LParen), n(N::Args), t(K::RParen)], call),
    prod!(Postfix => [n(N::Postfix), t(K::Inc)], post_increment),
    // 55
    prod!(Postfix => [n(N::Postfix), t(K::Dec)], post_decrement),
    prod!(Primary => [t(K::Int)], int_literal),
    prod!(Primary => [t(K::Str)], string_literal),
    prod!(Primary => [t(K::True)], true_literal),
    prod!(Primary => [t(K::False)], false_literal),
    // 60
    prod!(Primary => [t(K::Var)], variable),
    prod!(Primary => [t(K::Input)], input),
    prod!(Primary => [t(K::FnName)], builtin),
    prod!(Primary => [t(K::CustFnName)], variable),
    prod!(Primary => [t(K::LParen), n(N::Expr), t(K::RParen)], group),
    // 65
    prod!(Primary => [t(K::LBracket), n(N::Args), t(K::RBracket)], list_literal),
    prod!(Args => [], empty_exprs),
    prod!(Args => [n(N::ArgList)], pass),
    prod!(ArgList => [n(N::Expr)], start_exprs),
    prod!(ArgList => [n(N::ArgList), t(K::Comma), n(N::Expr)], append_expr),
];

pub fn productions() -> &'static [Production] {
    &PRODUCTIONS
}

// ===== Structural reductions =====

fn pass(r: &mut Reduction<'_>) -> Result<Attrib, String> {
    Ok(r.take(0))
}

fn empty_stmts(_: &mut Reduction<'_>) -> Result<Attrib, String> {
    Ok(Attrib::Stmts(Vec::new()))
}

fn empty_names(_: &mut Reduction<'_>) -> Result<Attrib, String> {
    Ok(Attrib::Names(Vec::new()))
}

fn empty_exprs(_: &mut Reduction<'_>) -> Result<Attrib, String> {
    Ok(Attrib::Exprs(Vec::new()))
}

/// Statements replaced by an error marker are dropped; the parse has
/// already failed by then and the list is only kept to continue scanning.
fn push_stmt(stmts: &mut Vec<Stmt>, attrib: Attrib, i: usize) {
    match attrib {
        Attrib::Stmt(stmt) => stmts.push(stmt),
        Attrib::Error => {}
        other => mismatch("statement", i, &other),
    }
}

fn start_list(r: &mut Reduction<'_>) -> Result<Attrib, String> {
    let mut stmts = Vec::new();
    push_stmt(&mut stmts, r.take(0), 0);
    Ok(Attrib::Stmts(stmts))
}

fn append_statement(r: &mut Reduction<'_>) -> Result<Attrib, String> {
    let mut stmts = r.stmts(0);
    push_stmt(&mut stmts, r.take(1), 1);
    Ok(Attrib::Stmts(stmts))
}

fn start_names(r: &mut Reduction<'_>) -> Result<Attrib, String> {
    Ok(Attrib::Names(vec![r.token(0).lit]))
}

fn append_name(r: &mut Reduction<'_>) -> Result<Attrib, String> {
    let mut names = r.names(0);
    let name = r.token(2).lit;
    if names.contains(&name) {
        return Err(format!("duplicate parameter '{}'", name));
    }
    names.push(name);
    Ok(Attrib::Names(names))
}

fn start_exprs(r: &mut Reduction<'_>) -> Result<Attrib, String> {
    Ok(Attrib::Exprs(vec![r.expr(0)]))
}

fn append_expr(r: &mut Reduction<'_>) -> Result<Attrib, String> {
    let mut exprs = r.exprs(0);
    exprs.push(r.expr(2));
    Ok(Attrib::Exprs(exprs))
}

// ===== Statements =====

fn expr_stmt(r: &mut Reduction<'_>) -> Result<Attrib, String> {
    Ok(Attrib::Stmt(Stmt::Expr(r.expr(0))))
}

fn return_stmt(r: &mut Reduction<'_>) -> Result<Attrib, String> {
    let location = r.pos(0);
    Ok(Attrib::Stmt(Stmt::Return(r.expr(1), location)))
}

fn error_stmt(_: &mut Reduction<'_>) -> Result<Attrib, String> {
    Ok(Attrib::Error)
}

fn while_stmt(r: &mut Reduction<'_>) -> Result<Attrib, String> {
    Ok(Attrib::Stmt(Stmt::While {
        condition: r.expr(1),
        body: r.stmts(3),
        location: r.pos(0),
    }))
}

fn foreach_stmt(r: &mut Reduction<'_>) -> Result<Attrib, String> {
    Ok(Attrib::Stmt(Stmt::Foreach {
        var: r.token(1).lit,
        iterable: r.expr(3),
        body: r.stmts(5),
        location: r.pos(0),
    }))
}

fn if_stmt(r: &mut Reduction<'_>) -> Result<Attrib, String> {
    Ok(Attrib::Stmt(Stmt::If {
        condition: r.expr(1),
        then_branch: r.stmts(3),
        else_branch: None,
        location: r.pos(0),
    }))
}

fn if_else_stmt(r: &mut Reduction<'_>) -> Result<Attrib, String> {
    Ok(Attrib::Stmt(Stmt::If {
        condition: r.expr(1),
        then_branch: r.stmts(3),
        else_branch: Some(r.stmts(7)),
        location: r.pos(0),
    }))
}

fn if_else_if_stmt(r: &mut Reduction<'_>) -> Result<Attrib, String> {
    Ok(Attrib::Stmt(Stmt::If {
        condition: r.expr(1),
        then_branch: r.stmts(3),
        else_branch: Some(vec![r.stmt(6)]),
        location: r.pos(0),
    }))
}

// ===== Expressions =====

fn require_addressable(target: &Expr, op: &str) -> Result<(), String> {
    if target.is_addressable() {
        Ok(())
    } else {
        Err(format!(
            "operand of '{}' must be a variable or list element, found {}",
            op,
            target.describe()
        ))
    }
}

fn assign(r: &mut Reduction<'_>) -> Result<Attrib, String> {
    let target = r.expr(0);
    require_addressable(&target, "=")?;
    Ok(Attrib::Expr(Expr::Assign {
        target: Box::new(target),
        value: Box::new(r.expr(2)),
        location: r.pos(1),
    }))
}

fn function_def(r: &Reduction<'_>, params: Vec<String>, body: Body) -> Attrib {
    Attrib::Expr(Expr::Lambda(Arc::new(FunctionDef {
        params,
        body,
        source: Arc::clone(r.source),
        span: r.start.offset..r.end,
        location: r.start,
    })))
}

fn lambda_expr(r: &mut Reduction<'_>) -> Result<Attrib, String> {
    let params = r.names(1);
    let body = Body::Expr(r.expr(3));
    Ok(function_def(r, params, body))
}

fn lambda_block(r: &mut Reduction<'_>) -> Result<Attrib, String> {
    let params = r.names(1);
    let body = Body::Block(r.stmts(4));
    Ok(function_def(r, params, body))
}

fn binary(r: &mut Reduction<'_>) -> Result<Attrib, String> {
    let operator = r.token(1);
    let op = match operator.kind {
        K::OrOr => BinOp::Or,
        K::AndAnd => BinOp::And,
        K::EqEq => BinOp::Eq,
        K::NotEq => BinOp::Ne,
        K::Lt => BinOp::Lt,
        K::LtEq => BinOp::Le,
        K::Gt => BinOp::Gt,
        K::GtEq => BinOp::Ge,
        K::Plus => BinOp::Add,
        K::Minus => BinOp::Sub,
        K::Star => BinOp::Mul,
        K::Slash => BinOp::Div,
        K::Percent => BinOp::Mod,
        other => unreachable!("not a binary operator: {:?}", other),
    };
    Ok(Attrib::Expr(Expr::Binary {
        op,
        left: Box::new(r.expr(0)),
        right: Box::new(r.expr(2)),
        location: operator.pos,
    }))
}

/// `-` on an integer literal folds into the literal itself
fn negate(r: &mut Reduction<'_>) -> Result<Attrib, String> {
    let location = r.pos(0);
    let folded = match r.expr(1) {
        Expr::Int(n) => match n.checked_neg() {
            Some(neg) => Expr::Int(neg),
            None => return Err(format!("negation of {} overflows", n)),
        },
        operand => Expr::Unary {
            op: UnOp::Neg,
            operand: Box::new(operand),
            location,
        },
    };
    Ok(Attrib::Expr(folded))
}

fn logical_not(r: &mut Reduction<'_>) -> Result<Attrib, String> {
    Ok(Attrib::Expr(Expr::Unary {
        op: UnOp::Not,
        operand: Box::new(r.expr(1)),
        location: r.pos(0),
    }))
}

/// Indexing a list literal by an integer literal is range-checked here; the
/// node itself is kept so that it stays addressable.
fn index(r: &mut Reduction<'_>) -> Result<Attrib, String> {
    let target = r.expr(0);
    let index = r.expr(2);
    if let (Expr::List(items, _), Expr::Int(i)) = (&target, &index) {
        if *i < 0 || *i as usize >= items.len() {
            return Err(format!(
                "index {} out of range for list of length {}",
                i,
                items.len()
            ));
        }
    }
    Ok(Attrib::Expr(Expr::Index {
        target: Box::new(target),
        index: Box::new(index),
        location: r.pos(1),
    }))
}

fn member(r: &mut Reduction<'_>) -> Result<Attrib, String> {
    Ok(Attrib::Expr(Expr::Member {
        target: Box::new(r.expr(0)),
        name: r.token(2).lit,
        location: r.pos(1),
    }))
}

fn call(r: &mut Reduction<'_>) -> Result<Attrib, String> {
    Ok(Attrib::Expr(Expr::Call {
        callee: Box::new(r.expr(0)),
        args: r.exprs(2),
        location: r.pos(1),
    }))
}

fn post_step(r: &mut Reduction<'_>, op: UnOp) -> Result<Attrib, String> {
    let operand = r.expr(0);
    require_addressable(&operand, op.symbol())?;
    Ok(Attrib::Expr(Expr::Unary {
        op,
        operand: Box::new(operand),
        location: r.pos(1),
    }))
}

fn post_increment(r: &mut Reduction<'_>) -> Result<Attrib, String> {
    post_step(r, UnOp::PostInc)
}

fn post_decrement(r: &mut Reduction<'_>) -> Result<Attrib, String> {
    post_step(r, UnOp::PostDec)
}

fn int_literal(r: &mut Reduction<'_>) -> Result<Attrib, String> {
    let token = r.token(0);
    token
        .lit
        .parse::<i64>()
        .map(|n| Attrib::Expr(Expr::Int(n)))
        .map_err(|_| format!("invalid integer literal {}", token.lit))
}

fn string_literal(r: &mut Reduction<'_>) -> Result<Attrib, String> {
    let token = r.token(0);
    Ok(Attrib::Expr(Expr::Str(unescape(&token.lit)?)))
}

fn true_literal(_: &mut Reduction<'_>) -> Result<Attrib, String> {
    Ok(Attrib::Expr(Expr::Bool(true)))
}

fn false_literal(_: &mut Reduction<'_>) -> Result<Attrib, String> {
    Ok(Attrib::Expr(Expr::Bool(false)))
}

fn variable(r: &mut Reduction<'_>) -> Result<Attrib, String> {
    let token = r.token(0);
    Ok(Attrib::Expr(Expr::Var(token.lit, token.pos)))
}

fn input(r: &mut Reduction<'_>) -> Result<Attrib, String> {
    Ok(Attrib::Expr(Expr::Input(r.pos(0))))
}

fn builtin(r: &mut Reduction<'_>) -> Result<Attrib, String> {
    let token = r.token(0);
    Builtin::from_name(&token.lit)
        .map(|b| Attrib::Expr(Expr::Builtin(b)))
        .ok_or_else(|| format!("unknown function '{}'", token.lit))
}

fn group(r: &mut Reduction<'_>) -> Result<Attrib, String> {
    Ok(Attrib::Expr(Expr::Group(Box::new(r.expr(1)))))
}

fn list_literal(r: &mut Reduction<'_>) -> Result<Attrib, String> {
    let location = r.pos(0);
    Ok(Attrib::Expr(Expr::List(r.exprs(1), location)))
}

/// Decode a quoted string literal as spelled in the source
fn unescape(lit: &str) -> Result<String, String> {
    let inner = lit
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| format!("malformed string literal {}", lit))?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('0') => out.push('\0'),
            other => return Err(format!("invalid escape sequence in {}: {:?}", lit, other)),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_zero_is_augmented_start() {
        assert_eq!(PRODUCTIONS[0].lhs, NonTerminal::Start);
        assert_eq!(PRODUCTIONS[0].rhs, &[Sym::N(NonTerminal::Program)]);
        assert!(PRODUCTIONS[1..]
            .iter()
            .all(|p| p.lhs != NonTerminal::Start && !p.rhs.contains(&Sym::N(NonTerminal::Start))));
    }

    #[test]
    fn test_every_nonterminal_has_a_production() {
        for i in 0..NonTerminal::COUNT {
            assert!(PRODUCTIONS.iter().any(|p| p.lhs.index() == i), "no production for {}", i);
        }
    }

    #[test]
    fn test_nesting_rules() {
        let nests = |lhs: NonTerminal| PRODUCTIONS.iter().filter(|p| p.lhs == lhs).any(Production::nests);
        assert!(nests(NonTerminal::Primary));
        assert!(nests(NonTerminal::Sum));
        assert!(nests(NonTerminal::Compound));
        assert!(!nests(NonTerminal::Open));
        assert!(!nests(NonTerminal::ArgList));
        assert!(!PRODUCTIONS[50].nests());
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r#""a\nb""#).unwrap(), "a\nb");
        assert_eq!(unescape(r#""\"q\"""#).unwrap(), "\"q\"");
        assert!(unescape("abc").is_err());
    }
}
