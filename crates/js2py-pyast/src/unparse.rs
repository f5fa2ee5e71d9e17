//! Python source rendering.

use std::fmt::Write;

use crate::ast::{
    Alias, Arguments, BoolOperator, Constant, ExceptHandler, Expr, FStringPart, Module, Operator,
    Stmt, UnaryOperator,
};

// Binding strength, weakest first
const PREC_LAMBDA: u8 = 0;
const PREC_IFEXP: u8 = 1;
const PREC_OR: u8 = 2;
const PREC_AND: u8 = 3;
const PREC_NOT: u8 = 4;
const PREC_CMP: u8 = 5;
const PREC_BOR: u8 = 6;
const PREC_ARITH: u8 = 7;
const PREC_TERM: u8 = 8;
const PREC_FACTOR: u8 = 9;
const PREC_ATOM: u8 = 10;

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Lambda { .. } => PREC_LAMBDA,
        Expr::IfExp { .. } => PREC_IFEXP,
        Expr::BoolOp {
            op: BoolOperator::Or,
            ..
        } => PREC_OR,
        Expr::BoolOp {
            op: BoolOperator::And,
            ..
        } => PREC_AND,
        Expr::UnaryOp {
            op: UnaryOperator::Not,
            ..
        } => PREC_NOT,
        Expr::UnaryOp { .. } => PREC_FACTOR,
        Expr::Compare { .. } => PREC_CMP,
        Expr::BinOp { op, .. } => match op {
            Operator::Add | Operator::Sub => PREC_ARITH,
            Operator::Mult | Operator::Div => PREC_TERM,
        },
        Expr::Starred(_) => PREC_BOR,
        Expr::Constant(Constant::Int(value)) if *value < 0 => PREC_FACTOR,
        Expr::Constant(Constant::Float(value)) if value.is_sign_negative() && !value.is_nan() => {
            PREC_FACTOR
        }
        _ => PREC_ATOM,
    }
}

/// Render a module as Python source. Every line, including the last,
/// ends with a newline.
pub fn unparse(module: &Module, indent: usize) -> String {
    let mut unparser = Unparser {
        indent,
        level: 0,
        output: String::new(),
    };
    unparser.stmts(&module.body);
    unparser.output
}

/// Render a single expression.
pub fn unparse_expr(expr: &Expr) -> String {
    expr_str(expr, PREC_LAMBDA)
}

struct Unparser {
    indent: usize,
    level: usize,
    output: String,
}

impl Unparser {
    fn line(&mut self, text: &str) {
        for _ in 0..self.level * self.indent {
            self.output.push(' ');
        }
        self.output.push_str(text);
        self.output.push('\n');
    }

    fn block(&mut self, body: &[Stmt]) {
        self.level += 1;
        if body.is_empty() {
            self.line("pass");
        } else {
            self.stmts(body);
        }
        self.level -= 1;
    }

    fn stmts(&mut self, body: &[Stmt]) {
        for stmt in body {
            self.stmt(stmt);
        }
    }

    /// Blank line before a `def` or `class`, except at the top of the
    /// output or of a block.
    fn separate_definition(&mut self) {
        if !self.output.is_empty() && !self.output.ends_with(":\n") && !self.output.ends_with("\n\n")
        {
            self.output.push('\n');
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::FunctionDef(def) => {
                self.separate_definition();
                for decorator in &def.decorators {
                    self.line(&format!("@{}", expr_str(decorator, PREC_ATOM)));
                }
                self.line(&format!("def {}({}):", def.name, arguments_str(&def.args)));
                self.block(&def.body);
            }
            Stmt::ClassDef(def) => {
                self.separate_definition();
                for decorator in &def.decorators {
                    self.line(&format!("@{}", expr_str(decorator, PREC_ATOM)));
                }
                if def.bases.is_empty() {
                    self.line(&format!("class {}:", def.name));
                } else {
                    self.line(&format!("class {}({}):", def.name, expr_list(&def.bases)));
                }
                self.block(&def.body);
            }
            Stmt::Return(None) => self.line("return"),
            Stmt::Return(Some(value)) => {
                self.line(&format!("return {}", expr_str(value, PREC_LAMBDA)))
            }
            Stmt::Assign { targets, value } => {
                let mut text = String::new();
                for target in targets {
                    text.push_str(&expr_str(target, PREC_LAMBDA));
                    text.push_str(" = ");
                }
                text.push_str(&expr_str(value, PREC_LAMBDA));
                self.line(&text);
            }
            Stmt::AugAssign { target, op, value } => self.line(&format!(
                "{} {}= {}",
                expr_str(target, PREC_LAMBDA),
                op.as_str(),
                expr_str(value, PREC_LAMBDA)
            )),
            Stmt::Expr(value) => self.line(&expr_str(value, PREC_LAMBDA)),
            Stmt::If { test, body, orelse } => self.if_chain("if", test, body, orelse),
            Stmt::While { test, body } => {
                self.line(&format!("while {}:", expr_str(test, PREC_LAMBDA)));
                self.block(body);
            }
            Stmt::For { target, iter, body } => {
                self.line(&format!(
                    "for {} in {}:",
                    expr_str(target, PREC_LAMBDA),
                    expr_str(iter, PREC_LAMBDA)
                ));
                self.block(body);
            }
            Stmt::Try {
                body,
                handlers,
                finalbody,
            } => {
                self.line("try:");
                self.block(body);
                for handler in handlers {
                    self.line(&handler_header(handler));
                    self.block(&handler.body);
                }
                if !finalbody.is_empty() || handlers.is_empty() {
                    self.line("finally:");
                    self.block(finalbody);
                }
            }
            Stmt::Raise(None) => self.line("raise"),
            Stmt::Raise(Some(exc)) => self.line(&format!("raise {}", expr_str(exc, PREC_LAMBDA))),
            Stmt::Import(names) => self.line(&format!("import {}", alias_list(names))),
            Stmt::ImportFrom {
                module,
                names,
                level,
            } => {
                let dots = ".".repeat(*level as usize);
                let module = module.as_deref().unwrap_or("");
                self.line(&format!("from {}{} import {}", dots, module, alias_list(names)));
            }
            Stmt::Pass => self.line("pass"),
            Stmt::Break => self.line("break"),
            Stmt::Continue => self.line("continue"),
        }
    }

    /// `else: if ...` collapses into `elif`.
    fn if_chain(&mut self, keyword: &str, test: &Expr, body: &[Stmt], orelse: &[Stmt]) {
        self.line(&format!("{} {}:", keyword, expr_str(test, PREC_LAMBDA)));
        self.block(body);
        match orelse {
            [] => {}
            [Stmt::If { test, body, orelse }] => self.if_chain("elif", test, body, orelse),
            _ => {
                self.line("else:");
                self.block(orelse);
            }
        }
    }
}

fn handler_header(handler: &ExceptHandler) -> String {
    match (&handler.type_, &handler.name) {
        (Some(type_), Some(name)) => format!("except {} as {}:", expr_str(type_, PREC_ATOM), name),
        (Some(type_), None) => format!("except {}:", expr_str(type_, PREC_ATOM)),
        (None, _) => "except:".to_string(),
    }
}

fn alias_list(names: &[Alias]) -> String {
    names
        .iter()
        .map(|alias| match &alias.asname {
            Some(asname) => format!("{} as {}", alias.name, asname),
            None => alias.name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn arguments_str(args: &Arguments) -> String {
    let first_default = args.args.len().saturating_sub(args.defaults.len());
    let mut parts = Vec::with_capacity(args.args.len() + 1);
    for (i, arg) in args.args.iter().enumerate() {
        let default = i
            .checked_sub(first_default)
            .and_then(|index| args.defaults.get(index));
        match default {
            Some(default) => parts.push(format!("{}={}", arg.name, expr_str(default, PREC_LAMBDA))),
            None => parts.push(arg.name.clone()),
        }
    }
    if let Some(vararg) = &args.vararg {
        parts.push(format!("*{}", vararg.name));
    }
    parts.join(", ")
}

fn expr_list(items: &[Expr]) -> String {
    items
        .iter()
        .map(|item| expr_str(item, PREC_LAMBDA))
        .collect::<Vec<_>>()
        .join(", ")
}

fn expr_str(expr: &Expr, min: u8) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr, min);
    out
}

fn write_expr(out: &mut String, expr: &Expr, min: u8) {
    let prec = precedence(expr);
    let parens = prec < min;
    if parens {
        out.push('(');
    }
    match expr {
        Expr::Name(id) => out.push_str(id),
        Expr::Constant(constant) => write_constant(out, constant),
        Expr::BinOp { left, op, right } => {
            write_expr(out, left, prec);
            let _ = write!(out, " {} ", op.as_str());
            write_expr(out, right, prec + 1);
        }
        Expr::BoolOp { op, values } => {
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    let _ = write!(out, " {} ", op.as_str());
                }
                write_expr(out, value, prec + 1);
            }
        }
        Expr::UnaryOp { op, operand } => {
            out.push_str(op.as_str());
            write_expr(out, operand, prec);
        }
        Expr::Compare {
            left,
            ops,
            comparators,
        } => {
            write_expr(out, left, PREC_CMP + 1);
            for (op, comparator) in ops.iter().zip(comparators) {
                let _ = write!(out, " {} ", op.as_str());
                write_expr(out, comparator, PREC_CMP + 1);
            }
        }
        Expr::Call { func, args } => {
            write_expr(out, func, PREC_ATOM);
            out.push('(');
            out.push_str(&expr_list(args));
            out.push(')');
        }
        Expr::Attribute { value, attr } => {
            // `1.real` would lex as a float
            if matches!(**value, Expr::Constant(Constant::Int(_))) {
                out.push('(');
                write_expr(out, value, PREC_LAMBDA);
                out.push(')');
            } else {
                write_expr(out, value, PREC_ATOM);
            }
            out.push('.');
            out.push_str(attr);
        }
        Expr::Subscript { value, slice } => {
            write_expr(out, value, PREC_ATOM);
            out.push('[');
            write_expr(out, slice, PREC_LAMBDA);
            out.push(']');
        }
        Expr::Dict(entries) => {
            out.push('{');
            for (i, (key, value)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expr(out, key, PREC_IFEXP);
                out.push_str(": ");
                write_expr(out, value, PREC_LAMBDA);
            }
            out.push('}');
        }
        Expr::List(items) => {
            out.push('[');
            out.push_str(&expr_list(items));
            out.push(']');
        }
        Expr::Lambda { args, body } => {
            out.push_str("lambda");
            if !args.is_empty() {
                out.push(' ');
                out.push_str(&arguments_str(args));
            }
            out.push_str(": ");
            write_expr(out, body, PREC_LAMBDA);
        }
        Expr::IfExp { test, body, orelse } => {
            write_expr(out, body, PREC_IFEXP + 1);
            out.push_str(" if ");
            write_expr(out, test, PREC_IFEXP + 1);
            out.push_str(" else ");
            write_expr(out, orelse, PREC_IFEXP);
        }
        Expr::JoinedStr(parts) => write_fstring(out, parts),
        Expr::Starred(value) => {
            out.push('*');
            write_expr(out, value, PREC_BOR);
        }
    }
    if parens {
        out.push(')');
    }
}

fn write_constant(out: &mut String, constant: &Constant) {
    match constant {
        Constant::None => out.push_str("None"),
        Constant::Bool(true) => out.push_str("True"),
        Constant::Bool(false) => out.push_str("False"),
        Constant::Int(value) => {
            let _ = write!(out, "{}", value);
        }
        Constant::Float(value) => out.push_str(&float_literal(*value)),
        Constant::Str(value) => out.push_str(&string_literal(value)),
    }
}

/// Python spelling of a float; non-finite values go through `float(...)`.
pub fn float_literal(value: f64) -> String {
    if value.is_nan() {
        "float(\"nan\")".to_string()
    } else if value.is_infinite() {
        if value > 0.0 {
            "float(\"inf\")".to_string()
        } else {
            "-float(\"inf\")".to_string()
        }
    } else {
        // Debug keeps the fractional part (`1.0`) and round-trips
        format!("{:?}", value)
    }
}

/// Quoted Python string literal, preferring single quotes like `repr`.
pub fn string_literal(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    escape_into(&mut out, value, quote, false);
    out.push(quote);
    out
}

fn escape_into(out: &mut String, value: &str, quote: char, double_braces: bool) {
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '{' if double_braces => out.push_str("{{"),
            '}' if double_braces => out.push_str("}}"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
}

fn write_fstring(out: &mut String, parts: &[FStringPart]) {
    let rendered: Vec<Option<String>> = parts
        .iter()
        .map(|part| match part {
            FStringPart::Literal(_) => None,
            FStringPart::Formatted(expr) => Some(expr_str(expr, PREC_IFEXP)),
        })
        .collect();

    // Replacement fields may not reuse the enclosing quote
    let has_single = rendered.iter().flatten().any(|text| text.contains('\''));
    let has_double = rendered.iter().flatten().any(|text| text.contains('"'));
    let (quote, delimiter) = match (has_single, has_double) {
        (false, _) => ('\'', "'"),
        (true, false) => ('"', "\""),
        (true, true) => ('\'', "'''"),
    };

    out.push('f');
    out.push_str(delimiter);
    for (part, text) in parts.iter().zip(&rendered) {
        match (part, text) {
            (FStringPart::Literal(literal), _) => escape_into(out, literal, quote, true),
            (FStringPart::Formatted(_), Some(text)) => {
                out.push('{');
                if text.starts_with('{') {
                    out.push(' ');
                }
                out.push_str(text);
                out.push('}');
            }
            (FStringPart::Formatted(_), None) => {}
        }
    }
    out.push_str(delimiter);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Arg, ClassDef, CmpOp, FunctionDef};

    fn name(id: &str) -> Expr {
        Expr::name(id)
    }

    fn render(body: Vec<Stmt>) -> String {
        unparse(&Module::new(body), 4)
    }

    #[test]
    fn test_function_and_call() {
        let add = Stmt::FunctionDef(FunctionDef {
            name: "add".into(),
            args: Arguments {
                args: vec![Arg::new("a"), Arg::new("b")],
                ..Default::default()
            },
            body: vec![Stmt::Return(Some(Expr::binop(
                name("a"),
                Operator::Add,
                name("b"),
            )))],
            decorators: vec![],
        });
        let result = Stmt::assign(
            name("result"),
            Expr::call(name("add"), vec![Expr::int(1), Expr::int(2)]),
        );
        let print = Stmt::expr(Expr::call(name("print"), vec![name("result")]));

        assert_eq!(
            render(vec![add, result, print]),
            "def add(a, b):\n    return a + b\nresult = add(1, 2)\nprint(result)\n"
        );
    }

    #[test]
    fn test_arithmetic_parentheses() {
        let sum = Expr::binop(name("a"), Operator::Add, name("b"));
        assert_eq!(
            unparse_expr(&Expr::binop(sum.clone(), Operator::Mult, name("c"))),
            "(a + b) * c"
        );
        assert_eq!(
            unparse_expr(&Expr::binop(name("c"), Operator::Mult, sum.clone())),
            "c * (a + b)"
        );
        let diff = Expr::binop(name("b"), Operator::Sub, name("c"));
        assert_eq!(
            unparse_expr(&Expr::binop(name("a"), Operator::Sub, diff)),
            "a - (b - c)"
        );
        assert_eq!(
            unparse_expr(&Expr::binop(sum, Operator::Sub, name("c"))),
            "a + b - c"
        );
    }

    #[test]
    fn test_boolean_and_comparison_parentheses() {
        let and = Expr::BoolOp {
            op: BoolOperator::And,
            values: vec![name("a"), name("b")],
        };
        let or = Expr::BoolOp {
            op: BoolOperator::Or,
            values: vec![and.clone(), name("c")],
        };
        assert_eq!(unparse_expr(&or), "a and b or c");

        let not = Expr::UnaryOp {
            op: UnaryOperator::Not,
            operand: Box::new(and),
        };
        assert_eq!(unparse_expr(&not), "not (a and b)");

        let inner = Expr::compare(name("a"), CmpOp::Lt, name("b"));
        assert_eq!(
            unparse_expr(&Expr::compare(inner, CmpOp::Eq, name("c"))),
            "(a < b) == c"
        );

        let neg = Expr::UnaryOp {
            op: UnaryOperator::USub,
            operand: Box::new(Expr::binop(name("a"), Operator::Add, Expr::int(1))),
        };
        assert_eq!(unparse_expr(&neg), "-(a + 1)");
    }

    #[test]
    fn test_elif_chain() {
        let stmt = Stmt::If {
            test: Expr::compare(name("x"), CmpOp::Gt, Expr::int(0)),
            body: vec![Stmt::assign(name("label"), Expr::constant_str("positive"))],
            orelse: vec![Stmt::If {
                test: Expr::compare(name("x"), CmpOp::Lt, Expr::int(0)),
                body: vec![Stmt::assign(name("label"), Expr::constant_str("negative"))],
                orelse: vec![Stmt::assign(name("label"), Expr::constant_str("zero"))],
            }],
        };
        assert_eq!(
            render(vec![stmt]),
            "if x > 0:\n    label = 'positive'\nelif x < 0:\n    label = 'negative'\nelse:\n    label = 'zero'\n"
        );
    }

    #[test]
    fn test_try_except_finally() {
        let stmt = Stmt::Try {
            body: vec![Stmt::expr(Expr::call(name("risky"), vec![]))],
            handlers: vec![ExceptHandler {
                type_: Some(name("Exception")),
                name: Some("err".into()),
                body: vec![Stmt::Raise(Some(name("err")))],
            }],
            finalbody: vec![Stmt::expr(Expr::call(name("cleanup"), vec![]))],
        };
        assert_eq!(
            render(vec![stmt]),
            "try:\n    risky()\nexcept Exception as err:\n    raise err\nfinally:\n    cleanup()\n"
        );
    }

    #[test]
    fn test_class_with_static_method() {
        let class = Stmt::ClassDef(ClassDef {
            name: "Point".into(),
            bases: vec![name("Base")],
            body: vec![Stmt::FunctionDef(FunctionDef {
                name: "origin".into(),
                args: Arguments::default(),
                body: vec![],
                decorators: vec![name("staticmethod")],
            })],
            decorators: vec![],
        });
        let after = Stmt::assign(name("p"), Expr::call(name("Point"), vec![]));
        assert_eq!(
            render(vec![Stmt::Pass, class, after]),
            "pass\n\nclass Point(Base):\n    @staticmethod\n    def origin():\n        pass\np = Point()\n"
        );
    }

    #[test]
    fn test_parameters_with_defaults_and_rest() {
        let args = Arguments {
            args: vec![Arg::new("a"), Arg::new("b")],
            vararg: Some(Arg::new("rest")),
            defaults: vec![Expr::int(2)],
        };
        let lambda = Expr::Lambda {
            args,
            body: Box::new(name("a")),
        };
        assert_eq!(unparse_expr(&lambda), "lambda a, b=2, *rest: a");

        let bare = Expr::Lambda {
            args: Arguments::default(),
            body: Box::new(Expr::none()),
        };
        assert_eq!(unparse_expr(&Expr::call(name("f"), vec![bare])), "f(lambda: None)");
    }

    #[test]
    fn test_string_literals() {
        assert_eq!(string_literal("plain"), "'plain'");
        assert_eq!(string_literal("it's"), "\"it's\"");
        assert_eq!(string_literal("both ' and \""), "'both \\' and \"'");
        assert_eq!(string_literal("line\nbreak\t\\"), "'line\\nbreak\\t\\\\'");
        assert_eq!(string_literal("\u{1}"), "'\\x01'");
    }

    #[test]
    fn test_float_literals() {
        assert_eq!(float_literal(1.0), "1.0");
        assert_eq!(float_literal(0.5), "0.5");
        assert_eq!(float_literal(f64::NAN), "float(\"nan\")");
        assert_eq!(float_literal(f64::INFINITY), "float(\"inf\")");
        assert_eq!(float_literal(f64::NEG_INFINITY), "-float(\"inf\")");
    }

    #[test]
    fn test_fstring_rendering() {
        let fstring = Expr::JoinedStr(vec![
            FStringPart::Literal("Hello {".into()),
            FStringPart::Formatted(name("name")),
            FStringPart::Literal("}!".into()),
        ]);
        assert_eq!(unparse_expr(&fstring), "f'Hello {{{name}}}!'");

        let quoted = Expr::JoinedStr(vec![FStringPart::Formatted(Expr::Subscript {
            value: Box::new(name("row")),
            slice: Box::new(Expr::constant_str("id")),
        })]);
        assert_eq!(unparse_expr(&quoted), "f\"{row['id']}\"");
    }

    #[test]
    fn test_imports() {
        let stmts = vec![
            Stmt::Import(vec![Alias::new("fs", None)]),
            Stmt::Import(vec![Alias::new("lodash_es", Some("_".into()))]),
            Stmt::ImportFrom {
                module: Some("a.b".into()),
                names: vec![Alias::new("join", None), Alias::new("resolve", Some("r".into()))],
                level: 1,
            },
            Stmt::ImportFrom {
                module: None,
                names: vec![Alias::new("x", None)],
                level: 2,
            },
        ];
        assert_eq!(
            render(stmts),
            "import fs\nimport lodash_es as _\nfrom .a.b import join, resolve as r\nfrom .. import x\n"
        );
    }

    #[test]
    fn test_attribute_on_int_and_starred() {
        let attr = Expr::attribute(Expr::int(1), "real");
        assert_eq!(unparse_expr(&attr), "(1).real");

        let call = Expr::call(name("f"), vec![Expr::Starred(Box::new(name("args")))]);
        assert_eq!(unparse_expr(&call), "f(*args)");
    }

    #[test]
    fn test_custom_indent() {
        let stmt = Stmt::While {
            test: Expr::bool(true),
            body: vec![Stmt::Break],
        };
        assert_eq!(unparse(&Module::new(vec![stmt]), 2), "while True:\n  break\n");
    }
}
