//! JavaScript to Python tree lowering
//!
//! Walks an SWC [`Program`](swc_ecma_ast::Program) and builds the Python
//! tree defined in `js2py-pyast`, one node kind at a time:
//! - statements lower to zero or more Python statements
//! - expressions lower to exactly one Python expression
//! - constructs with no safe Python equivalent abort with a
//!   [`TransformError`]
//! - approximate lowerings (do/while, sparse arrays, accessors) succeed and
//!   leave a diagnostic string behind
//!
//! The pass does not consult scope analysis; it only needs the identifiers
//! it sees locally.

mod class;
mod context;
mod error;
mod expr;
mod function;
pub mod kind;
mod module_decl;
mod stmt;
mod transformer;

use js2py_diagnostics::LineIndex;
use js2py_pyast::Module;
use swc_ecma_ast::Program;

pub use context::{TransformContext, MAX_DEPTH};
pub use error::TransformError;
pub use module_decl::DEFAULT_EXPORT_NAME;
pub use transformer::Transformer;

/// Output of a successful transformation.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformResult {
    pub module: Module,
    /// Soft diagnostics, each with a location suffix when one is known
    pub diagnostics: Vec<String>,
}

/// Lower a whole program. `lines` resolves node positions for messages.
pub fn transform_program(
    program: &Program,
    source_name: &str,
    lines: Option<&LineIndex>,
) -> Result<TransformResult, TransformError> {
    let mut transformer = Transformer::new(TransformContext::new(source_name, lines));
    let module = transformer.transform_program(program)?;
    Ok(TransformResult {
        module,
        diagnostics: transformer.into_diagnostics(),
    })
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use js2py_parser::{parse_program, SourceType};

    #[test]
    fn test_add_example() {
        let result = transform_source(
            "function add(a,b){return a+b;}\nvar result = add(1,2);",
            SourceType::Script,
        )
        .unwrap();
        let output = js2py_pyast::unparse(&result.module, 4);
        assert!(output.contains("def add(a, b):"));
        assert!(output.contains("return a + b"));
        assert!(output.contains("add(1, 2)"));
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_error_without_line_index_has_no_suffix() {
        let parsed = parse_program("x = a ** b;", SourceType::Script);
        let program = parsed.program.as_ref().unwrap();
        let err = transform_program(program, "test.js", None).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported binary operator: **");
        assert!(err.position.is_none());
    }

    #[test]
    fn test_unsupported_statements_name_their_kind() {
        let err = transform_error("with (obj) { a(); }");
        assert_eq!(err.to_string(), "Unsupported statement node: WithStatement (line 1, column 1)");
        let err = transform_error("debugger;");
        assert_eq!(err.kind, "DebuggerStatement");
    }

    #[test]
    fn test_unsupported_expressions_name_their_kind() {
        let err = transform_error("x = (a, b);");
        assert_eq!(
            err.to_string(),
            "Unsupported expression node: SequenceExpression (line 1, column 6)"
        );
    }

    #[test]
    fn test_nesting_limit() {
        let source = format!("x = {}1{};", "(".repeat(40), ")".repeat(40));
        let parsed = parse_program(&source, SourceType::Script);
        let program = parsed.program.as_ref().unwrap();

        let context = TransformContext::new("deep.js", Some(&parsed.lines)).with_max_depth(16);
        let mut transformer = Transformer::new(context);
        let err = transformer.transform_program(program).unwrap_err();
        assert_eq!(err.message, "Maximum nesting depth exceeded.");

        assert!(transform_program(program, "deep.js", Some(&parsed.lines)).is_ok());
    }

    #[test]
    fn test_one_tree_transforms_on_many_threads() {
        let parsed = parse_program("var total = price * (1 + rate);", SourceType::Script);
        let program = parsed.program.as_ref().unwrap();
        let lines = &parsed.lines;

        let outputs: Vec<String> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(move || {
                        let result = transform_program(program, "shared.js", Some(lines)).unwrap();
                        js2py_pyast::unparse(&result.module, 4)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(outputs.iter().all(|out| out == "total = price * (1 + rate)\n"));
    }

    #[test]
    fn test_typical_script() {
        let source = r#"
            var items = [1, 2, 3];
            var total = 0;
            for (var i = 0; i < items.length; i++) {
                total += items[i];
            }
            function describe(value) {
                if (value > 5) {
                    return `big ${value}`;
                }
                return "small";
            }
            console.log(describe(total));
        "#;
        let output = render(source);
        assert_eq!(
            output,
            "items = [1, 2, 3]\n\
             total = 0\n\
             i = 0\n\
             while i < items.length:\n    total += items[i]\n    i += 1\n\
             \n\
             def describe(value):\n    if value > 5:\n        return f'big {value}'\n    return 'small'\n\
             console.log(describe(total))\n"
        );
    }
}
