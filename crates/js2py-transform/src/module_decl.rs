//! Imports and exports.

use js2py_pyast as py;
use swc_common::{Span, Spanned};
use swc_ecma_ast as ast;

use crate::error::TransformError;
use crate::expr::unparen;
use crate::kind::module_decl_kind;
use crate::transformer::Transformer;

/// Name bound by `export default <expr>` and anonymous default exports.
pub const DEFAULT_EXPORT_NAME: &str = "__default_export__";

const EXPORT_SPECIFIERS_NOTE: &str =
    "Export specifiers are noted but not emitted; consider manual __all__ edits.";
const DEFAULT_EXPRESSION_NOTE: &str = "export default expression lowered to assignment.";

impl<'a> Transformer<'a> {
    pub(crate) fn lower_module_decl(&mut self, decl: &ast::ModuleDecl) -> Result<Vec<py::Stmt>, TransformError> {
        match decl {
            ast::ModuleDecl::Import(import) => self.lower_import(import),
            ast::ModuleDecl::ExportDecl(export) => self.lower_decl(&export.decl),
            ast::ModuleDecl::ExportDefaultDecl(export) => match &export.decl {
                ast::DefaultDecl::Fn(fn_expr) => {
                    let name = default_name(fn_expr.ident.as_ref());
                    let def = self.lower_function(&name, &fn_expr.function)?;
                    Ok(vec![py::Stmt::FunctionDef(def)])
                }
                ast::DefaultDecl::Class(class_expr) => {
                    let name = default_name(class_expr.ident.as_ref());
                    let def = self.lower_class(&name, &class_expr.class)?;
                    Ok(vec![py::Stmt::ClassDef(def)])
                }
                ast::DefaultDecl::TsInterfaceDecl(iface) => {
                    Err(self.unsupported_statement("TSInterfaceDeclaration", iface.span))
                }
            },
            ast::ModuleDecl::ExportDefaultExpr(export) => {
                let value = match unparen(&export.expr) {
                    ast::Expr::Ident(ident) => py::Expr::name(&*ident.sym),
                    other => {
                        let value = self.transform_expr(other)?;
                        self.note(DEFAULT_EXPRESSION_NOTE, export.span);
                        value
                    }
                };
                Ok(vec![py::Stmt::assign(py::Expr::name(DEFAULT_EXPORT_NAME), value)])
            }
            ast::ModuleDecl::ExportNamed(named) => {
                if !named.specifiers.is_empty() || named.src.is_some() {
                    self.note(EXPORT_SPECIFIERS_NOTE, named.span);
                }
                Ok(Vec::new())
            }
            ast::ModuleDecl::ExportAll(export_all) => {
                self.note(EXPORT_SPECIFIERS_NOTE, export_all.span);
                Ok(Vec::new())
            }
            other => Err(self.unsupported_statement(module_decl_kind(other), other.span())),
        }
    }

    /// Default and namespace specifiers import the whole module under the
    /// local name; named specifiers collect into one `from ... import`.
    fn lower_import(&mut self, import: &ast::ImportDecl) -> Result<Vec<py::Stmt>, TransformError> {
        let specifier = self.str_value(&import.src)?;
        let (level, dotted) = py::module_path(&specifier);
        if dotted.is_empty() && level == 0 {
            return Err(self.error(
                format!("Cannot derive a Python module name from '{}'.", specifier),
                "ImportDeclaration",
                import.span,
            ));
        }
        log::trace!("import '{}' -> level {} '{}'", specifier, level, dotted);

        let mut stmts = Vec::new();
        let mut names = Vec::new();
        for spec in &import.specifiers {
            match spec {
                ast::ImportSpecifier::Default(ast::ImportDefaultSpecifier { local, .. })
                | ast::ImportSpecifier::Namespace(ast::ImportStarAsSpecifier { local, .. }) => {
                    let stmt =
                        self.import_module(&specifier, level, &dotted, Some(&*local.sym), import.span)?;
                    stmts.push(stmt);
                }
                ast::ImportSpecifier::Named(named) => {
                    let local = named.local.sym.to_string();
                    let imported = match &named.imported {
                        Some(ast::ModuleExportName::Ident(ident)) => ident.sym.to_string(),
                        Some(ast::ModuleExportName::Str(s)) => self.str_value(s)?,
                        None => local.clone(),
                    };
                    let asname = (imported != local).then_some(local);
                    names.push(py::Alias::new(imported, asname));
                }
            }
        }

        if !names.is_empty() {
            stmts.push(py::Stmt::ImportFrom {
                module: (!dotted.is_empty()).then(|| dotted.clone()),
                names,
                level,
            });
        }
        if import.specifiers.is_empty() {
            stmts.push(self.import_module(&specifier, level, &dotted, None, import.span)?);
        }
        Ok(stmts)
    }

    /// `import a.b as local`, or `from .a import b as local` for relative
    /// specifiers since Python cannot `import` a relative path directly.
    fn import_module(
        &self,
        specifier: &str,
        level: u32,
        dotted: &str,
        local: Option<&str>,
        span: Span,
    ) -> Result<py::Stmt, TransformError> {
        let alias = |name: &str| match local {
            Some(local) if local != name => Some(local.to_string()),
            _ => None,
        };

        if level == 0 {
            return Ok(py::Stmt::Import(vec![py::Alias::new(dotted, alias(dotted))]));
        }

        let (parent, leaf) = match dotted.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent.to_string()), leaf),
            None => (None, dotted),
        };
        if leaf.is_empty() {
            return Err(self.error(
                format!("Relative import of '{}' needs a module name.", specifier),
                "ImportDeclaration",
                span,
            ));
        }

        Ok(py::Stmt::ImportFrom {
            module: parent,
            names: vec![py::Alias::new(leaf, alias(leaf))],
            level,
        })
    }
}

fn default_name(ident: Option<&ast::Ident>) -> String {
    match ident {
        Some(ident) => ident.sym.to_string(),
        None => DEFAULT_EXPORT_NAME.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{render_module, transform_module_error, transform_source};
    use js2py_parser::SourceType;

    #[test]
    fn test_imports() {
        let output = render_module(
            "import fs from 'fs';\n\
             import * as path from 'node:path';\n\
             import { join, resolve as res } from 'path';\n\
             import _ from 'lodash-es';\n\
             import 'polyfill';",
        );
        assert_eq!(
            output,
            "import fs\n\
             import path\n\
             from path import join, resolve as res\n\
             import lodash_es as _\n\
             import polyfill\n"
        );
    }

    #[test]
    fn test_default_and_named_from_one_module() {
        assert_eq!(
            render_module("import React, { useState } from 'react';"),
            "import react as React\nfrom react import useState\n"
        );
    }

    #[test]
    fn test_relative_imports() {
        assert_eq!(
            render_module(
                "import util from './util.js';\n\
                 import { a } from '../lib/helpers';\n\
                 import * as models from './db/models';"
            ),
            "from . import util\n\
             from ..lib.helpers import a\n\
             from .db import models\n"
        );
    }

    #[test]
    fn test_relative_import_without_module_name_is_fatal() {
        let err = transform_module_error("import pkg from '.';");
        assert_eq!(err.message, "Relative import of '.' needs a module name.");
    }

    #[test]
    fn test_export_declarations() {
        assert_eq!(
            render_module("export const answer = 42;\nexport function twice(x) { return x * 2; }"),
            "answer = 42\n\ndef twice(x):\n    return x * 2\n"
        );
    }

    #[test]
    fn test_export_default_forms() {
        assert_eq!(
            render_module("export default function () { return 1; }"),
            "def __default_export__():\n    return 1\n"
        );
        assert_eq!(
            render_module("class App {}\nexport default App;"),
            "class App:\n    pass\n__default_export__ = App\n"
        );

        let result = transform_source("export default 1 + 2;", SourceType::Module).unwrap();
        assert_eq!(
            js2py_pyast::unparse(&result.module, 4),
            "__default_export__ = 1 + 2\n"
        );
        assert_eq!(
            result.diagnostics,
            ["export default expression lowered to assignment. (line 1, column 1)"]
        );
    }

    #[test]
    fn test_export_specifiers_are_noted() {
        let result = transform_source(
            "const a = 1;\nexport { a };\nexport * from './other';",
            SourceType::Module,
        )
        .unwrap();
        assert_eq!(js2py_pyast::unparse(&result.module, 4), "a = 1\n");
        assert_eq!(result.diagnostics.len(), 2);
        assert!(result.diagnostics[0].starts_with("Export specifiers are noted but not emitted"));
        assert!(result.diagnostics[0].ends_with("(line 2, column 1)"));
    }
}
