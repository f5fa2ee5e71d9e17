//! Python syntax tree produced by the transformer.
//!
//! Shapes follow Python's `ast` module closely enough that the renderer can
//! mirror `ast.unparse`. Nodes carry no source positions.

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Module {
    pub body: Vec<Stmt>,
}

impl Module {
    pub fn new(body: Vec<Stmt>) -> Self {
        Self { body }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    FunctionDef(FunctionDef),
    ClassDef(ClassDef),
    Return(Option<Expr>),
    Assign {
        targets: Vec<Expr>,
        value: Expr,
    },
    AugAssign {
        target: Expr,
        op: Operator,
        value: Expr,
    },
    Expr(Expr),
    If {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    While {
        test: Expr,
        body: Vec<Stmt>,
    },
    For {
        target: Expr,
        iter: Expr,
        body: Vec<Stmt>,
    },
    Try {
        body: Vec<Stmt>,
        handlers: Vec<ExceptHandler>,
        finalbody: Vec<Stmt>,
    },
    Raise(Option<Expr>),
    Import(Vec<Alias>),
    ImportFrom {
        /// `None` for `from . import x`
        module: Option<String>,
        names: Vec<Alias>,
        /// Number of leading dots
        level: u32,
    },
    Pass,
    Break,
    Continue,
}

impl Stmt {
    pub fn assign(target: Expr, value: Expr) -> Self {
        Stmt::Assign {
            targets: vec![target],
            value,
        }
    }

    pub fn expr(value: Expr) -> Self {
        Stmt::Expr(value)
    }

    pub fn is_break(&self) -> bool {
        matches!(self, Stmt::Break)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub args: Arguments,
    pub body: Vec<Stmt>,
    pub decorators: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub name: String,
    pub bases: Vec<Expr>,
    pub body: Vec<Stmt>,
    pub decorators: Vec<Expr>,
}

/// Parameter list. As in Python, `defaults` line up with the last
/// `defaults.len()` entries of `args`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Arguments {
    pub args: Vec<Arg>,
    pub vararg: Option<Arg>,
    pub defaults: Vec<Expr>,
}

impl Arguments {
    pub fn is_empty(&self) -> bool {
        self.args.is_empty() && self.vararg.is_none()
    }

    pub fn names(&self) -> Vec<&str> {
        self.args.iter().map(|arg| arg.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arg {
    pub name: String,
}

impl Arg {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExceptHandler {
    /// Exception class matched, `None` for a bare `except:`
    pub type_: Option<Expr>,
    pub name: Option<String>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub name: String,
    pub asname: Option<String>,
}

impl Alias {
    pub fn new(name: impl Into<String>, asname: Option<String>) -> Self {
        Self {
            name: name.into(),
            asname,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Name(String),
    Constant(Constant),
    BinOp {
        left: Box<Expr>,
        op: Operator,
        right: Box<Expr>,
    },
    BoolOp {
        op: BoolOperator,
        values: Vec<Expr>,
    },
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expr>,
    },
    Compare {
        left: Box<Expr>,
        ops: Vec<CmpOp>,
        comparators: Vec<Expr>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
    },
    Attribute {
        value: Box<Expr>,
        attr: String,
    },
    Subscript {
        value: Box<Expr>,
        slice: Box<Expr>,
    },
    Dict(Vec<(Expr, Expr)>),
    List(Vec<Expr>),
    Lambda {
        args: Arguments,
        body: Box<Expr>,
    },
    IfExp {
        test: Box<Expr>,
        body: Box<Expr>,
        orelse: Box<Expr>,
    },
    JoinedStr(Vec<FStringPart>),
    Starred(Box<Expr>),
}

impl Expr {
    pub fn name(id: impl Into<String>) -> Self {
        Expr::Name(id.into())
    }

    pub fn none() -> Self {
        Expr::Constant(Constant::None)
    }

    pub fn constant_str(value: impl Into<String>) -> Self {
        Expr::Constant(Constant::Str(value.into()))
    }

    pub fn int(value: i64) -> Self {
        Expr::Constant(Constant::Int(value))
    }

    pub fn bool(value: bool) -> Self {
        Expr::Constant(Constant::Bool(value))
    }

    pub fn call(func: Expr, args: Vec<Expr>) -> Self {
        Expr::Call {
            func: Box::new(func),
            args,
        }
    }

    pub fn attribute(value: Expr, attr: impl Into<String>) -> Self {
        Expr::Attribute {
            value: Box::new(value),
            attr: attr.into(),
        }
    }

    pub fn binop(left: Expr, op: Operator, right: Expr) -> Self {
        Expr::BinOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn compare(left: Expr, op: CmpOp, right: Expr) -> Self {
        Expr::Compare {
            left: Box::new(left),
            ops: vec![op],
            comparators: vec![right],
        }
    }

    /// Whether the expression can appear on the left of `=`.
    pub fn is_store_target(&self) -> bool {
        matches!(
            self,
            Expr::Name(_) | Expr::Attribute { .. } | Expr::Subscript { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FStringPart {
    Literal(String),
    Formatted(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mult,
    Div,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mult => "*",
            Operator::Div => "/",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOperator {
    And,
    Or,
}

impl BoolOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoolOperator::And => "and",
            BoolOperator::Or => "or",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    USub,
    UAdd,
}

impl UnaryOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOperator::Not => "not ",
            UnaryOperator::USub => "-",
            UnaryOperator::UAdd => "+",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
}

impl CmpOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::NotEq => "!=",
            CmpOp::Lt => "<",
            CmpOp::LtE => "<=",
            CmpOp::Gt => ">",
            CmpOp::GtE => ">=",
        }
    }
}
