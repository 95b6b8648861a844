//! Built-in analyzers
//!
//! Each analyzer registers per-kind node callbacks with the dispatcher and
//! reports against the descriptors in [`crate::catalog`].

pub mod conditional;
pub mod return_statement;

pub use conditional::ConditionalExpressionAnalyzer;
pub use return_statement::ReturnVoidExpressionAnalyzer;
