//! Built-in code fix providers

pub mod conditional;
pub mod default_return;
pub mod replace_return;

pub use conditional::ConditionalExpressionFixProvider;
pub use default_return::AddDefaultReturnFixProvider;
pub use replace_return::ReplaceReturnFixProvider;
