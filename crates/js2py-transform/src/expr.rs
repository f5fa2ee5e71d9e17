//! Expression lowering.

use js2py_pyast as py;
use swc_common::Spanned;
use swc_ecma_ast as ast;

use crate::error::TransformError;
use crate::kind::expr_kind;
use crate::transformer::Transformer;

const SPARSE_ARRAY_NOTE: &str = "Sparse array element converted to None.";

/// How a JavaScript binary operator maps onto Python.
enum BinaryLowering {
    Arithmetic(py::Operator),
    Comparison(py::CmpOp),
    Logical(py::BoolOperator),
}

/// Strip grouping parentheses.
pub(crate) fn unparen(mut expr: &ast::Expr) -> &ast::Expr {
    while let ast::Expr::Paren(paren) = expr {
        expr = &paren.expr;
    }
    expr
}

impl<'a> Transformer<'a> {
    pub(crate) fn lower_expr(&mut self, expr: &ast::Expr) -> Result<py::Expr, TransformError> {
        match expr {
            ast::Expr::Ident(ident) => Ok(match &*ident.sym {
                "undefined" => py::Expr::none(),
                name => py::Expr::name(name),
            }),
            ast::Expr::Lit(lit) => self.lower_lit(lit),
            ast::Expr::This(_) => Ok(py::Expr::name("self")),
            ast::Expr::Paren(paren) => self.transform_expr(&paren.expr),
            ast::Expr::Bin(bin) => self.lower_binary(bin),
            ast::Expr::Unary(unary) => self.lower_unary(unary),
            ast::Expr::Cond(cond) => {
                let test = self.transform_expr(&cond.test)?;
                let body = self.transform_expr(&cond.cons)?;
                let orelse = self.transform_expr(&cond.alt)?;
                Ok(py::Expr::IfExp {
                    test: Box::new(test),
                    body: Box::new(body),
                    orelse: Box::new(orelse),
                })
            }
            ast::Expr::Member(member) => self.lower_member(member),
            ast::Expr::SuperProp(super_prop) => match &super_prop.prop {
                ast::SuperProp::Ident(name) => Ok(py::Expr::attribute(super_call(), &*name.sym)),
                ast::SuperProp::Computed(computed) => Err(self.error(
                    "MemberExpression property must be Identifier.",
                    "MemberExpression",
                    computed.span,
                )),
            },
            ast::Expr::Call(call) => {
                let func = match &call.callee {
                    ast::Callee::Expr(callee) => self.transform_expr(callee)?,
                    // `super(...)` in a constructor
                    ast::Callee::Super(_) => py::Expr::attribute(super_call(), "__init__"),
                    ast::Callee::Import(import) => {
                        return Err(self.unsupported_expression("ImportExpression", import.span))
                    }
                };
                let args = self.lower_args(&call.args)?;
                Ok(py::Expr::call(func, args))
            }
            ast::Expr::New(new) => {
                let func = self.transform_expr(&new.callee)?;
                let args = match &new.args {
                    Some(args) => self.lower_args(args)?,
                    None => Vec::new(),
                };
                Ok(py::Expr::call(func, args))
            }
            ast::Expr::Array(array) => self.lower_array(array),
            ast::Expr::Object(object) => self.lower_object(object),
            ast::Expr::Tpl(tpl) => self.lower_template(tpl),
            ast::Expr::Arrow(arrow) => self.lower_lambda(arrow),
            ast::Expr::Fn(fn_expr) => Err(self.error(
                "Function expressions are not supported in expression context.",
                "FunctionExpression",
                fn_expr.function.span,
            )),
            ast::Expr::Class(class_expr) => Err(self.error(
                "Class expressions are only supported as variable initializers.",
                "ClassExpression",
                class_expr.class.span,
            )),
            ast::Expr::Assign(_) | ast::Expr::Update(_) => Err(self.error(
                "Assignment expressions are only supported as statements.",
                expr_kind(expr),
                expr.span(),
            )),
            ast::Expr::TaggedTpl(tagged) => Err(self.error(
                "Tagged template literals are not supported.",
                "TaggedTemplateExpression",
                tagged.span,
            )),
            other => Err(self.unsupported_expression(expr_kind(other), other.span())),
        }
    }

    fn lower_lit(&mut self, lit: &ast::Lit) -> Result<py::Expr, TransformError> {
        match lit {
            ast::Lit::Num(n) => Ok(py::Expr::Constant(number_constant(n.value))),
            ast::Lit::Str(s) => Ok(py::Expr::constant_str(self.str_value(s)?)),
            ast::Lit::Bool(b) => Ok(py::Expr::bool(b.value)),
            ast::Lit::Null(_) => Ok(py::Expr::none()),
            ast::Lit::Regex(re) => Err(self.error(
                "Regular expression literals are not supported.",
                "Literal",
                re.span,
            )),
            ast::Lit::BigInt(big) => {
                Err(self.error("BigInt literals are not supported.", "Literal", big.span))
            }
            other => Err(self.unsupported_expression("JSXText", other.span())),
        }
    }

    fn lower_binary(&mut self, bin: &ast::BinExpr) -> Result<py::Expr, TransformError> {
        let lowering = match bin.op {
            ast::BinaryOp::Add => BinaryLowering::Arithmetic(py::Operator::Add),
            ast::BinaryOp::Sub => BinaryLowering::Arithmetic(py::Operator::Sub),
            ast::BinaryOp::Mul => BinaryLowering::Arithmetic(py::Operator::Mult),
            ast::BinaryOp::Div => BinaryLowering::Arithmetic(py::Operator::Div),
            ast::BinaryOp::EqEqEq | ast::BinaryOp::EqEq => BinaryLowering::Comparison(py::CmpOp::Eq),
            ast::BinaryOp::NotEqEq | ast::BinaryOp::NotEq => {
                BinaryLowering::Comparison(py::CmpOp::NotEq)
            }
            ast::BinaryOp::Lt => BinaryLowering::Comparison(py::CmpOp::Lt),
            ast::BinaryOp::LtEq => BinaryLowering::Comparison(py::CmpOp::LtE),
            ast::BinaryOp::Gt => BinaryLowering::Comparison(py::CmpOp::Gt),
            ast::BinaryOp::GtEq => BinaryLowering::Comparison(py::CmpOp::GtE),
            ast::BinaryOp::LogicalAnd => BinaryLowering::Logical(py::BoolOperator::And),
            ast::BinaryOp::LogicalOr => BinaryLowering::Logical(py::BoolOperator::Or),
            other => {
                return Err(self.error(
                    format!("Unsupported binary operator: {}", other),
                    expr_kind_of_binary(other),
                    bin.span,
                ))
            }
        };

        let left = self.transform_expr(&bin.left)?;
        let right = self.transform_expr(&bin.right)?;

        Ok(match lowering {
            BinaryLowering::Arithmetic(op) => py::Expr::binop(left, op, right),
            BinaryLowering::Comparison(op) => py::Expr::compare(left, op, right),
            BinaryLowering::Logical(op) => {
                // Left-nested chains of one operator flatten into a single BoolOp
                let mut values = match left {
                    py::Expr::BoolOp { op: inner, values } if inner == op => values,
                    other => vec![other],
                };
                values.push(right);
                py::Expr::BoolOp { op, values }
            }
        })
    }

    fn lower_unary(&mut self, unary: &ast::UnaryExpr) -> Result<py::Expr, TransformError> {
        let op = match unary.op {
            ast::UnaryOp::Bang => py::UnaryOperator::Not,
            ast::UnaryOp::Minus => py::UnaryOperator::USub,
            ast::UnaryOp::Plus => py::UnaryOperator::UAdd,
            other => {
                return Err(self.error(
                    format!("Unsupported unary operator: {}", other),
                    "UnaryExpression",
                    unary.span,
                ))
            }
        };
        let operand = self.transform_expr(&unary.arg)?;
        Ok(py::Expr::UnaryOp {
            op,
            operand: Box::new(operand),
        })
    }

    pub(crate) fn lower_member(&mut self, member: &ast::MemberExpr) -> Result<py::Expr, TransformError> {
        let value = self.transform_expr(&member.obj)?;
        match &member.prop {
            ast::MemberProp::Ident(name) => Ok(py::Expr::attribute(value, &*name.sym)),
            ast::MemberProp::Computed(computed) => {
                let slice = self.transform_expr(&computed.expr)?;
                Ok(py::Expr::Subscript {
                    value: Box::new(value),
                    slice: Box::new(slice),
                })
            }
            ast::MemberProp::PrivateName(private) => Err(self.error(
                "MemberExpression property must be Identifier.",
                "PrivateIdentifier",
                private.span,
            )),
        }
    }

    fn lower_args(&mut self, args: &[ast::ExprOrSpread]) -> Result<Vec<py::Expr>, TransformError> {
        args.iter().map(|arg| self.lower_element(arg)).collect()
    }

    /// A call argument or array element; spreads become `*value`.
    fn lower_element(&mut self, element: &ast::ExprOrSpread) -> Result<py::Expr, TransformError> {
        let value = self.transform_expr(&element.expr)?;
        Ok(match element.spread {
            Some(_) => py::Expr::Starred(Box::new(value)),
            None => value,
        })
    }

    fn lower_array(&mut self, array: &ast::ArrayLit) -> Result<py::Expr, TransformError> {
        let mut items = Vec::with_capacity(array.elems.len());
        for element in &array.elems {
            match element {
                Some(element) => items.push(self.lower_element(element)?),
                None => {
                    self.note(SPARSE_ARRAY_NOTE, array.span);
                    items.push(py::Expr::none());
                }
            }
        }
        Ok(py::Expr::List(items))
    }

    fn lower_object(&mut self, object: &ast::ObjectLit) -> Result<py::Expr, TransformError> {
        let mut entries = Vec::with_capacity(object.props.len());
        for prop in &object.props {
            let prop = match prop {
                ast::PropOrSpread::Prop(prop) => prop,
                ast::PropOrSpread::Spread(spread) => {
                    return Err(self.error(
                        "Object spread is not supported.",
                        "SpreadElement",
                        spread.dot3_token,
                    ))
                }
            };
            let entry = match &**prop {
                ast::Prop::Shorthand(ident) => (
                    py::Expr::constant_str(&*ident.sym),
                    py::Expr::name(&*ident.sym),
                ),
                ast::Prop::KeyValue(kv) => {
                    let key = self.lower_prop_key(&kv.key)?;
                    let value = self.transform_expr(&kv.value)?;
                    (key, value)
                }
                ast::Prop::Getter(getter) => {
                    return Err(self.error(
                        "Getter/setter properties are not supported.",
                        "Property",
                        getter.span,
                    ))
                }
                ast::Prop::Setter(setter) => {
                    return Err(self.error(
                        "Getter/setter properties are not supported.",
                        "Property",
                        setter.span,
                    ))
                }
                ast::Prop::Method(method) => {
                    return Err(self.error(
                        "Object methods are not supported.",
                        "Property",
                        method.function.span,
                    ))
                }
                ast::Prop::Assign(assign) => {
                    return Err(self.unsupported_expression("AssignmentPattern", assign.key.span))
                }
            };
            entries.push(entry);
        }
        Ok(py::Expr::Dict(entries))
    }

    fn lower_prop_key(&mut self, key: &ast::PropName) -> Result<py::Expr, TransformError> {
        match key {
            ast::PropName::Ident(name) => Ok(py::Expr::constant_str(&*name.sym)),
            ast::PropName::Str(s) => Ok(py::Expr::constant_str(self.str_value(s)?)),
            ast::PropName::Num(n) => Ok(py::Expr::Constant(number_constant(n.value))),
            ast::PropName::Computed(computed) => self.transform_expr(&computed.expr),
            ast::PropName::BigInt(big) => {
                Err(self.error("BigInt literals are not supported.", "Literal", big.span))
            }
        }
    }

    /// `` `a${b}c` `` becomes `f'a{b}c'`.
    fn lower_template(&mut self, tpl: &ast::Tpl) -> Result<py::Expr, TransformError> {
        if tpl.exprs.is_empty() {
            let text: String = tpl.quasis.iter().map(|quasi| unescape_template(&quasi.raw)).collect();
            return Ok(py::Expr::constant_str(text));
        }

        let mut parts = Vec::new();
        for (index, quasi) in tpl.quasis.iter().enumerate() {
            let text = unescape_template(&quasi.raw);
            if !text.is_empty() {
                parts.push(py::FStringPart::Literal(text));
            }
            if let Some(expr) = tpl.exprs.get(index) {
                parts.push(py::FStringPart::Formatted(self.transform_expr(expr)?));
            }
        }
        Ok(py::Expr::JoinedStr(parts))
    }
}

fn super_call() -> py::Expr {
    py::Expr::call(py::Expr::name("super"), Vec::new())
}

fn expr_kind_of_binary(op: ast::BinaryOp) -> &'static str {
    match op {
        ast::BinaryOp::LogicalAnd | ast::BinaryOp::LogicalOr | ast::BinaryOp::NullishCoalescing => {
            "LogicalExpression"
        }
        _ => "BinaryExpression",
    }
}

/// Integral values that fit become `int`, the rest `float`.
pub(crate) fn number_constant(value: f64) -> py::Constant {
    if value.is_finite()
        && value.fract() == 0.0
        && value >= i64::MIN as f64
        && value < i64::MAX as f64
    {
        py::Constant::Int(value as i64)
    } else {
        py::Constant::Float(value)
    }
}

/// Decode the escapes of a raw template segment.
fn unescape_template(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\r' {
            // Template line terminators normalize to \n
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            result.push('\n');
            continue;
        }
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('b') => result.push('\u{8}'),
            Some('f') => result.push('\u{c}'),
            Some('v') => result.push('\u{b}'),
            Some('0') => result.push('\0'),
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                push_code_point(&mut result, &hex, "\\x");
            }
            Some('u') => {
                let hex: String = if chars.peek() == Some(&'{') {
                    chars.next();
                    chars.by_ref().take_while(|&c| c != '}').collect()
                } else {
                    chars.by_ref().take(4).collect()
                };
                push_code_point(&mut result, &hex, "\\u");
            }
            // Line continuation
            Some('\n') => {}
            Some('\r') => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            Some(other) => result.push(other),
            None => result.push('\\'),
        }
    }

    result
}

fn push_code_point(out: &mut String, hex: &str, prefix: &str) {
    match u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
        Some(c) => out.push(c),
        None => {
            out.push_str(prefix);
            out.push_str(hex);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{render, transform_error, transform_source};
    use js2py_parser::SourceType;

    #[test]
    fn test_operators() {
        assert_eq!(
            render("r = (a + b) * c - d / e;"),
            "r = (a + b) * c - d / e\n"
        );
        assert_eq!(
            render("ok = a === 1 && b !== 2 || c != null;"),
            "ok = a == 1 and b != 2 or c != None\n"
        );
        assert_eq!(render("t = a <= b;"), "t = a <= b\n");
    }

    #[test]
    fn test_logical_chain_flattens() {
        let result = transform_source("x = a && b && c;", SourceType::Script).unwrap();
        let py::Stmt::Assign { value, .. } = &result.module.body[0] else {
            panic!("expected an assignment");
        };
        let py::Expr::BoolOp { values, .. } = value else {
            panic!("expected a BoolOp");
        };
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn test_unsupported_binary_operator() {
        let err = transform_error("x = a ** 2;");
        assert_eq!(err.message, "Unsupported binary operator: **");
        assert_eq!(err.kind, "BinaryExpression");

        let err = transform_error("x = a ?? b;");
        assert_eq!(err.message, "Unsupported binary operator: ??");
        assert_eq!(err.kind, "LogicalExpression");
    }

    #[test]
    fn test_unary_and_conditional() {
        assert_eq!(
            render("y = !done ? -n : +m;"),
            "y = -n if not done else +m\n"
        );
        let err = transform_error("t = typeof x;");
        assert_eq!(err.message, "Unsupported unary operator: typeof");
    }

    #[test]
    fn test_members_and_calls() {
        assert_eq!(
            render("console.log(items[0].name, ...rest);"),
            "console.log(items[0].name, *rest)\n"
        );
        assert_eq!(render("d = new Date(2020, 1);"), "d = Date(2020, 1)\n");
        assert_eq!(render("e = new Error;"), "e = Error()\n");
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            render("v = [1, 2.5, 'two', true, null, undefined];"),
            "v = [1, 2.5, 'two', True, None, None]\n"
        );
        assert_eq!(render("big = 1e21;"), "big = 1e21\n");
        let err = transform_error("r = /ab+c/;");
        assert_eq!(err.message, "Regular expression literals are not supported.");
    }

    #[test]
    fn test_object_literal() {
        assert_eq!(
            render("o = { a: 1, 'b c': 2, 3: x, [k]: v, short };"),
            "o = {'a': 1, 'b c': 2, 3: x, k: v, 'short': short}\n"
        );
    }

    #[test]
    fn test_object_accessors_and_methods_are_fatal() {
        assert_eq!(
            transform_error("o = { get a() { return 1; } };").message,
            "Getter/setter properties are not supported."
        );
        assert_eq!(
            transform_error("o = { run() {} };").message,
            "Object methods are not supported."
        );
    }

    #[test]
    fn test_sparse_array() {
        let result = transform_source("a = [1, , 3];", SourceType::Script).unwrap();
        assert_eq!(
            js2py_pyast::unparse(&result.module, 4),
            "a = [1, None, 3]\n"
        );
        assert_eq!(
            result.diagnostics,
            ["Sparse array element converted to None. (line 1, column 5)"]
        );
    }

    #[test]
    fn test_template_literals() {
        assert_eq!(
            render("s = `Hello, ${name}! {x}`;"),
            "s = f'Hello, {name}! {{x}}'\n"
        );
        assert_eq!(render("s = ``;"), "s = ''\n");
        assert_eq!(render("s = `a\\tb`;"), "s = 'a\\tb'\n");
    }

    #[test]
    fn test_tagged_template_is_fatal() {
        let err = transform_error("s = tag`x`;");
        assert_eq!(err.message, "Tagged template literals are not supported.");
    }

    #[test]
    fn test_arrow_in_expression_context() {
        assert_eq!(
            render("items.map((x, i = 0) => x + i);"),
            "items.map(lambda x, i=0: x + i)\n"
        );
        let err = transform_error("items.forEach((x) => { print(x); });");
        assert_eq!(
            err.message,
            "Arrow functions with block bodies are not supported in expression context."
        );
        let err = transform_error("setTimeout(function () {}, 10);");
        assert_eq!(
            err.message,
            "Function expressions are not supported in expression context."
        );
    }

    #[test]
    fn test_assignment_in_expression_is_fatal() {
        let err = transform_error("if ((m = next())) use(m);");
        assert_eq!(err.message, "Assignment expressions are only supported as statements.");
        let err = transform_error("f(i++);");
        assert_eq!(err.kind, "UpdateExpression");
    }

    #[test]
    fn test_private_member_is_fatal() {
        let err = transform_error("class A { #x = 1; get() { return this.#x; } }");
        assert_eq!(err.message, "MemberExpression property must be Identifier.");
    }

    #[test]
    fn test_super_calls() {
        let output = render(
            "class B extends A { constructor(x) { super(x); } run() { return super.run(); } }",
        );
        assert!(output.contains("        super().__init__(x)\n"));
        assert!(output.contains("        return super().run()\n"));
    }

    #[test]
    fn test_number_constant() {
        assert_eq!(number_constant(3.0), py::Constant::Int(3));
        assert_eq!(number_constant(0.5), py::Constant::Float(0.5));
        assert!(matches!(number_constant(f64::INFINITY), py::Constant::Float(_)));
    }

    #[test]
    fn test_unescape_template() {
        assert_eq!(unescape_template("a\\nb"), "a\nb");
        assert_eq!(unescape_template("\\x41\\u0042\\u{43}"), "ABC");
        assert_eq!(unescape_template("\\`\\$"), "`$");
        assert_eq!(unescape_template("line\\\ncontinued"), "linecontinued");
    }
}
