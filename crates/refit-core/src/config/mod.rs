//! Configuration: schema, discovery and the enablement gate

mod enablement;
mod loader;
mod refit_config;

pub use enablement::Enablement;
pub use loader::{CONFIG_FILE_NAMES, ConfigLoader};
pub use refit_config::{AnalysisConfig, FormattingOptions, Newline, RefitConfig, RuleSeverity};
