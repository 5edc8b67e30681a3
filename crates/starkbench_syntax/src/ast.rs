//! Abstract Syntax Tree definitions for the contract language.
//!
//! Every node that diagnostics point at is wrapped in [`Spanned`]. Integer and short-string literals are already
//! converted to [`Felt`] by the parser.

use std::fmt;

use starkbench_core::Felt;
use starkbench_core::lang::keywords::{self, KeywordId};

/// Source location span (byte offsets)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

pub type Ident = String;

/// A source file is a sequence of top-level items.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub items: Vec<Spanned<Item>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Directive(Directive),
    Import(ImportDecl),
    Const(ConstDecl),
    Function(FunctionDecl),
}

/// `%lang starknet`, `%builtins pedersen range_check`
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Lang(Spanned<Ident>),
    Builtins(Vec<Spanned<Ident>>),
}

/// `from a.b.c import x, y as z`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub module: Spanned<Vec<Ident>>,
    pub items: Vec<ImportItem>,
}

impl ImportDecl {
    /// Dotted module path as written.
    pub fn module_path(&self) -> String {
        self.module.node.join(".")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportItem {
    pub name: Spanned<Ident>,
    pub alias: Option<Spanned<Ident>>,
}

impl ImportItem {
    /// Name the item is bound to in the importing module.
    pub fn local_name(&self) -> &Spanned<Ident> {
        self.alias.as_ref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstDecl {
    pub name: Spanned<Ident>,
    pub value: Spanned<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub decorators: Vec<Spanned<Ident>>,
    pub name: Spanned<Ident>,
    /// `{syscall_ptr : felt*, range_check_ptr}`; parsed and otherwise ignored.
    pub implicit_args: Vec<TypedParam>,
    pub params: Vec<TypedParam>,
    pub outputs: Vec<TypedParam>,
    pub body: Vec<Spanned<Stmt>>,
    /// Span of the `func ... :` header line.
    pub header_span: Span,
}

/// `name : type`; the type defaults to `felt` when omitted.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedParam {
    pub name: Spanned<Ident>,
    pub ty: Spanned<TypeExpr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Named(Ident),
    Pointer(Box<TypeExpr>),
}

impl TypeExpr {
    pub fn felt() -> Self {
        TypeExpr::Named("felt".to_string())
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named(name) => f.write_str(name),
            TypeExpr::Pointer(inner) => write!(f, "{inner}*"),
        }
    }
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Let,
    Local,
    Tempvar,
}

impl BindingKind {
    pub fn keyword(self) -> KeywordId {
        match self {
            BindingKind::Let => KeywordId::Let,
            BindingKind::Local => KeywordId::Local,
            BindingKind::Tempvar => KeywordId::Tempvar,
        }
    }
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(keywords::as_str(self.keyword()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `let x = e`, `local x : felt = e`, `tempvar x = e`
    Bind {
        kind: BindingKind,
        name: Spanned<Ident>,
        ty: Option<Spanned<TypeExpr>>,
        value: Spanned<Expr>,
    },
    /// `let (a, b) = f(...)`
    Unpack {
        names: Vec<Spanned<Ident>>,
        call: Spanned<CallExpr>,
    },
    AllocLocals,
    /// `assert lhs = rhs`
    Assert { lhs: Spanned<Expr>, rhs: Spanned<Expr> },
    /// `return (a=e, ...)` or `return (e, ...)`
    Return(Vec<CallArg>),
    If {
        cond: Condition,
        then_body: Vec<Spanned<Stmt>>,
        else_body: Option<Vec<Spanned<Stmt>>>,
    },
    /// `with_attr error_message("..."): ... end`
    WithAttr {
        attr: Spanned<Ident>,
        message: Spanned<String>,
        body: Vec<Spanned<Stmt>>,
    },
    Call(CallExpr),
    /// `%{ ... %}`; the code between the markers, trimmed.
    Hint(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CompareOp::Eq => "==",
            CompareOp::NotEq => "!=",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub lhs: Spanned<Expr>,
    pub op: CompareOp,
    pub rhs: Spanned<Expr>,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(Felt),
    Name(Ident),
    Binary {
        op: BinaryOp,
        lhs: Box<Spanned<Expr>>,
        rhs: Box<Spanned<Expr>>,
    },
    Neg(Box<Spanned<Expr>>),
    Index {
        base: Box<Spanned<Expr>>,
        index: Box<Spanned<Expr>>,
    },
    /// `new (e1, e2, ...)`
    New(Vec<Spanned<Expr>>),
    Call(CallExpr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub target: CallTarget,
    pub args: Vec<CallArg>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CallTarget {
    Function(Spanned<Ident>),
    /// `var.read(..)`, `var.write(..)`, `var.addr(..)`
    Storage {
        var: Spanned<Ident>,
        accessor: Spanned<Ident>,
    },
}

impl CallTarget {
    pub fn span(&self) -> Span {
        match self {
            CallTarget::Function(name) => name.span,
            CallTarget::Storage { var, accessor } => var.span.merge(accessor.span),
        }
    }
}

impl fmt::Display for CallTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallTarget::Function(name) => f.write_str(&name.node),
            CallTarget::Storage { var, accessor } => write!(f, "{}.{}", var.node, accessor.node),
        }
    }
}

/// A positional (`e`) or named (`x=e`) argument; also used for return values.
#[derive(Debug, Clone, PartialEq)]
pub struct CallArg {
    pub name: Option<Spanned<Ident>>,
    pub value: Spanned<Expr>,
}
