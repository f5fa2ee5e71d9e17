//! CLI command implementations

pub mod check;
pub mod convert;
pub mod explain;
pub mod scopes;

use js2py_parser::SourceType;

use crate::config::Config;
use crate::OutputFormat;

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: Config,
    pub format: OutputFormat,
    pub use_color: bool,
    pub verbose: u8,
    pub quiet: bool,
}

impl Context {
    /// `--module` on the command line or `convert.module` in the config.
    pub fn source_type(&self, module_flag: bool) -> SourceType {
        if module_flag || self.config.convert.module {
            SourceType::Module
        } else {
            SourceType::Script
        }
    }
}
