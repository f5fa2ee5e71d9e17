//! Class lowering.

use js2py_pyast as py;
use swc_common::Spanned;
use swc_ecma_ast as ast;

use crate::error::TransformError;
use crate::expr::number_constant;
use crate::kind::class_member_kind;
use crate::transformer::Transformer;

impl<'a> Transformer<'a> {
    /// `class Name extends Base { ... }` as a `ClassDef`. The constructor
    /// becomes `__init__`, instance methods take `self`, static methods
    /// are decorated with `@staticmethod`.
    pub(crate) fn lower_class(&mut self, name: &str, class: &ast::Class) -> Result<py::ClassDef, TransformError> {
        let bases = match &class.super_class {
            Some(super_class) => vec![self.transform_expr(super_class)?],
            None => Vec::new(),
        };

        let mut body = Vec::new();
        for member in &class.body {
            match member {
                ast::ClassMember::Constructor(ctor) => {
                    body.push(py::Stmt::FunctionDef(self.lower_constructor(ctor)?))
                }
                ast::ClassMember::Method(method) => {
                    body.push(py::Stmt::FunctionDef(self.lower_method(method)?))
                }
                ast::ClassMember::Empty(_) => {}
                other => {
                    let message = format!("Unsupported class element type: {}", class_member_kind(other));
                    self.note(&message, other.span());
                    body.push(py::Stmt::Pass);
                }
            }
        }

        if body.is_empty() {
            body.push(py::Stmt::Pass);
        }

        log::trace!("lowered class {} ({} member(s))", name, class.body.len());
        Ok(py::ClassDef {
            name: name.to_string(),
            bases,
            body,
            decorators: Vec::new(),
        })
    }

    fn lower_constructor(&mut self, ctor: &ast::Constructor) -> Result<py::FunctionDef, TransformError> {
        let mut params = Vec::with_capacity(ctor.params.len());
        for param in &ctor.params {
            match param {
                ast::ParamOrTsParamProp::Param(param) => params.push(&param.pat),
                ast::ParamOrTsParamProp::TsParamProp(prop) => {
                    return Err(self.error(
                        "Unsupported parameter pattern: TSParameterProperty",
                        "TSParameterProperty",
                        prop.span,
                    ))
                }
            }
        }

        let mut args = self.lower_parameters(params)?;
        args.args.insert(0, py::Arg::new("self"));
        let body = match &ctor.body {
            Some(body) => self.lower_body(&body.stmts)?,
            None => Vec::new(),
        };

        Ok(py::FunctionDef {
            name: "__init__".to_string(),
            args,
            body,
            decorators: Vec::new(),
        })
    }

    fn lower_method(&mut self, method: &ast::ClassMethod) -> Result<py::FunctionDef, TransformError> {
        let name = self.method_name(&method.key)?;
        match method.kind {
            ast::MethodKind::Getter => self.note(
                "Accessor 'get' emitted as regular method; manual review recommended.",
                method.span,
            ),
            ast::MethodKind::Setter => self.note(
                "Accessor 'set' emitted as regular method; manual review recommended.",
                method.span,
            ),
            ast::MethodKind::Method => {}
        }

        let mut def = self.lower_function(&name, &method.function)?;
        if method.is_static {
            def.decorators.push(py::Expr::name("staticmethod"));
        } else {
            def.args.args.insert(0, py::Arg::new("self"));
        }
        Ok(def)
    }

    /// Method keys must spell a Python identifier.
    fn method_name(&self, key: &ast::PropName) -> Result<String, TransformError> {
        let (name, span) = match key {
            ast::PropName::Ident(ident) => (ident.sym.to_string(), ident.span),
            ast::PropName::Str(s) => (self.str_value(s)?, s.span),
            ast::PropName::Num(n) => {
                let name = match number_constant(n.value) {
                    py::Constant::Int(value) => value.to_string(),
                    _ => n.value.to_string(),
                };
                (name, n.span)
            }
            ast::PropName::Computed(computed) => {
                return Err(self.error(
                    "Computed class method names are not supported.",
                    "MethodDefinition",
                    computed.span,
                ))
            }
            ast::PropName::BigInt(big) => (big.value.to_string(), big.span),
        };

        if !is_identifier(&name) {
            return Err(self.error(
                format!("Class method name '{}' is not a valid Python identifier.", name),
                "MethodDefinition",
                span,
            ));
        }
        Ok(name)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_alphabetic() => {
            chars.all(|c| c == '_' || c.is_alphanumeric())
        }
        _ => false,
    }
}
