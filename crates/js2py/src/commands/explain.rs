//! Explain command - explain diagnostic codes

use anyhow::{anyhow, Result};
use clap::Args;
use js2py_diagnostics::DiagnosticCode;

use super::Context;
use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct ExplainArgs {
    /// Diagnostic code to explain (e.g., A001, EVAL_CALL); lists all codes when omitted
    pub code: Option<String>,
}

struct Explanation {
    title: &'static str,
    description: &'static str,
    example: Option<&'static str>,
    suggestion: Option<&'static str>,
}

fn explanation(code: DiagnosticCode) -> Explanation {
    match code {
        DiagnosticCode::ParseError => Explanation {
            title: "Parse Error",
            description: "The JavaScript parser encountered syntax it could not read. In strict mode any recovered error also discards the program.",
            example: Some("var = 1;  // missing binding name"),
            suggestion: Some("Fix the syntax error, or check whether the file is an ES module and pass --module."),
        },
        DiagnosticCode::EvalCall => Explanation {
            title: "Use of eval",
            description: "A direct call to eval can introduce bindings at runtime, so the scope tree computed for this file may be incomplete.",
            example: Some("eval(\"var injected = 1\");"),
            suggestion: Some("Replace eval with explicit code or a lookup table."),
        },
        DiagnosticCode::WithStatement => Explanation {
            title: "with Statement",
            description: "A with statement resolves names against an object at runtime. Names inside its body cannot be resolved statically, and the transformer rejects it.",
            example: Some("with (config) { start(port); }"),
            suggestion: Some("Qualify each name explicitly: config.start(config.port)."),
        },
        DiagnosticCode::UnsupportedPattern => Explanation {
            title: "Unsupported Declaration Pattern",
            description: "A declaration uses a pattern whose bound names could not be determined, so none of them were recorded.",
            example: None,
            suggestion: Some("Declare each name separately."),
        },
        DiagnosticCode::UnsupportedParamPattern => Explanation {
            title: "Unsupported Parameter Pattern",
            description: "A function parameter uses a pattern whose bound names could not be determined.",
            example: None,
            suggestion: Some("Take a plain parameter and destructure it in the function body."),
        },
        DiagnosticCode::UnsupportedConstruct => Explanation {
            title: "Unsupported Construct",
            description: "The construct has no safe Python equivalent, so no output was written for the file.",
            example: Some("x = a ** b;  // exponent operator\nasync function load() {}"),
            suggestion: Some("Rewrite the construct using the supported subset and convert again."),
        },
        DiagnosticCode::LossyLowering => Explanation {
            title: "Lossy Lowering",
            description: "The construct was translated with an approximation. The output runs but may behave differently in edge cases.",
            example: Some("do { step(); } while (more());\nswitch (k) { case 1: a(); case 2: b(); }  // fallthrough"),
            suggestion: Some("Review the generated Python near the reported line."),
        },
        DiagnosticCode::RuntimeNotice => Explanation {
            title: "Runtime Not Bundled",
            description: "--runtime include was requested, but no runtime helpers are appended to the output yet.",
            example: None,
            suggestion: None,
        },
        DiagnosticCode::InternalError => Explanation {
            title: "Internal Error",
            description: "The tool could not read input, walk a directory or write output.",
            example: None,
            suggestion: Some("Check paths and permissions, then run again with -v for details."),
        },
    }
}

fn print_one(code: DiagnosticCode, use_color: bool) {
    let explanation = explanation(code);
    let heading = format!("{} ({})", code.as_str(), code.name());

    if use_color {
        println!(
            "\n{}: {}\n{}",
            console::style(&heading).bold().cyan(),
            console::style(explanation.title).bold(),
            "=".repeat(heading.len() + explanation.title.len() + 2)
        );
    } else {
        println!(
            "\n{}: {}\n{}",
            heading,
            explanation.title,
            "=".repeat(heading.len() + explanation.title.len() + 2)
        );
    }

    println!("\n{}\n", explanation.description);
    println!("Default severity: {}\n", code.default_severity());

    if let Some(example) = explanation.example {
        if use_color {
            println!("{}:", console::style("Example").bold());
        } else {
            println!("Example:");
        }
        for line in example.lines() {
            println!("  {}", line);
        }
        println!();
    }

    if let Some(suggestion) = explanation.suggestion {
        if use_color {
            println!("{}:", console::style("Suggestion").bold().green());
        } else {
            println!("Suggestion:");
        }
        println!("  {}", suggestion);
        println!();
    }
}

fn to_json(code: DiagnosticCode) -> serde_json::Value {
    let explanation = explanation(code);
    serde_json::json!({
        "code": code.as_str(),
        "name": code.name(),
        "severity": code.default_severity().as_str(),
        "title": explanation.title,
        "description": explanation.description,
        "example": explanation.example,
        "suggestion": explanation.suggestion,
    })
}

pub fn run(args: ExplainArgs, context: &Context) -> Result<bool> {
    let Some(requested) = args.code else {
        match context.format {
            OutputFormat::Text => {
                for code in DiagnosticCode::ALL {
                    println!("{}  {:<26} {}", code.as_str(), code.name(), explanation(code).title);
                }
            }
            OutputFormat::Json => {
                let all: Vec<_> = DiagnosticCode::ALL.into_iter().map(to_json).collect();
                println!("{}", serde_json::to_string_pretty(&all)?);
            }
        }
        return Ok(true);
    };

    let code = DiagnosticCode::parse(&requested)
        .ok_or_else(|| anyhow!("Unknown diagnostic code: {}", requested))?;

    match context.format {
        OutputFormat::Text => print_one(code, context.use_color),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&to_json(code))?),
    }
    Ok(true)
}
