//! Final source assembly: rendered module plus optional runtime snippets.

use crate::ast::Module;
use crate::unparse::unparse;

#[derive(Debug, Clone)]
pub struct EmitOptions {
    pub include_runtime: bool,
    pub runtime_snippets: Vec<String>,
    pub trailing_newline: bool,
    /// Spaces per indentation level
    pub indent: usize,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            include_runtime: false,
            runtime_snippets: Vec::new(),
            trailing_newline: true,
            indent: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitResult {
    pub source: String,
    /// The runtime text appended to `source`, if any
    pub runtime: Option<String>,
}

/// Render `module` and append runtime snippets after a blank line when
/// `include_runtime` is set and snippets exist.
pub fn emit_module(module: &Module, options: &EmitOptions) -> EmitResult {
    let mut source = unparse(module, options.indent);
    while source.ends_with('\n') {
        source.pop();
    }
    if options.trailing_newline {
        source.push('\n');
    }

    let runtime = if options.include_runtime && !options.runtime_snippets.is_empty() {
        let lines: Vec<&str> = options
            .runtime_snippets
            .iter()
            .map(|snippet| snippet.trim_end())
            .collect();
        Some(format!("{}\n", lines.join("\n")))
    } else {
        None
    };

    if let Some(runtime) = &runtime {
        source.push('\n');
        source.push_str(runtime);
    }

    log::debug!(
        "emitted {} byte(s) of Python{}",
        source.len(),
        if runtime.is_some() { " with runtime" } else { "" }
    );

    EmitResult { source, runtime }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expr, Stmt};

    fn module() -> Module {
        Module::new(vec![Stmt::assign(Expr::name("x"), Expr::int(1))])
    }

    #[test]
    fn test_trailing_newline() {
        let with = emit_module(&module(), &EmitOptions::default());
        assert_eq!(with.source, "x = 1\n");
        assert_eq!(with.runtime, None);

        let without = emit_module(
            &module(),
            &EmitOptions {
                trailing_newline: false,
                ..Default::default()
            },
        );
        assert_eq!(without.source, "x = 1");
    }

    #[test]
    fn test_empty_module() {
        let result = emit_module(&Module::default(), &EmitOptions::default());
        assert_eq!(result.source, "\n");
    }

    #[test]
    fn test_runtime_snippets_appended() {
        let options = EmitOptions {
            include_runtime: true,
            runtime_snippets: vec![
                "def js_typeof(v):\n    return 'object'\n\n".into(),
                "UNDEFINED = None".into(),
            ],
            ..Default::default()
        };
        let result = emit_module(&module(), &options);
        let runtime = "def js_typeof(v):\n    return 'object'\nUNDEFINED = None\n";
        assert_eq!(result.runtime.as_deref(), Some(runtime));
        assert_eq!(result.source, format!("x = 1\n\n{}", runtime));
    }

    #[test]
    fn test_runtime_requires_flag() {
        let options = EmitOptions {
            include_runtime: false,
            runtime_snippets: vec!["UNDEFINED = None".into()],
            ..Default::default()
        };
        assert_eq!(emit_module(&module(), &options).runtime, None);
    }
}
