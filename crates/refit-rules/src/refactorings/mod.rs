//! Built-in refactoring providers
//!
//! Refactorings are offered at a span without a diagnostic. Each provider is
//! gated on its refactoring ids before it runs, and again per action.

pub mod format_summary;
pub mod if_statement;
pub mod modify_expression;
pub mod null_check;

pub use format_summary::FormatSummaryProvider;
pub use if_statement::IfStatementProvider;
pub use modify_expression::ModifyExpressionProvider;
pub use null_check::CheckExpressionForNullProvider;
