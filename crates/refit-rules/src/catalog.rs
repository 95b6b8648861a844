//! Diagnostic descriptors and refactoring ids of the built-in rules

use refit_core::{DiagnosticDescriptor, Severity};

/// Rule ID for a conditional whose condition is not parenthesized
pub const PARENTHESIZE_CONDITION_ID: &str = "style/parenthesize-conditional-condition";

/// Rule ID for `x != null ? x : y` and `x == null ? y : x`
pub const USE_COALESCE_ID: &str = "simplification/use-coalesce-expression";

/// Rule ID for `c ? true : false` and `c ? false : true`
pub const SIMPLIFY_CONDITIONAL_ID: &str = "simplification/simplify-conditional-expression";

/// Rule ID for `return`/`yield return` of a void expression
pub const RETURN_VOID_ID: &str = "redundancy/return-void-expression";

/// Hidden companion of [`RETURN_VOID_ID`] marking the keywords to fade
pub const RETURN_VOID_FADE_OUT_ID: &str = "redundancy/return-void-expression-fade-out";

pub use refit_core::semantic::NOT_ALL_PATHS_RETURN as NOT_ALL_PATHS_RETURN_ID;

pub const PARENTHESIZE_CONDITION: DiagnosticDescriptor = DiagnosticDescriptor {
    id: PARENTHESIZE_CONDITION_ID,
    title: "Parenthesize condition of conditional expression",
    message_format: "Wrap condition in parentheses",
    category: "style",
    default_severity: Severity::Info,
    enabled_by_default: true,
};

pub const USE_COALESCE: DiagnosticDescriptor = DiagnosticDescriptor {
    id: USE_COALESCE_ID,
    title: "Use coalesce expression instead of conditional expression",
    message_format: "Use coalesce expression",
    category: "simplification",
    default_severity: Severity::Info,
    enabled_by_default: true,
};

pub const SIMPLIFY_CONDITIONAL: DiagnosticDescriptor = DiagnosticDescriptor {
    id: SIMPLIFY_CONDITIONAL_ID,
    title: "Simplify conditional expression",
    message_format: "Simplify conditional expression",
    category: "simplification",
    default_severity: Severity::Info,
    enabled_by_default: true,
};

pub const RETURN_VOID: DiagnosticDescriptor = DiagnosticDescriptor {
    id: RETURN_VOID_ID,
    title: "Replace return statement with expression statement",
    message_format: "Replace '{0}' statement with expression statement",
    category: "redundancy",
    default_severity: Severity::Warning,
    enabled_by_default: true,
};

pub const RETURN_VOID_FADE_OUT: DiagnosticDescriptor = DiagnosticDescriptor {
    id: RETURN_VOID_FADE_OUT_ID,
    title: "Replace return statement with expression statement (fade out)",
    message_format: "",
    category: "redundancy",
    default_severity: Severity::Hidden,
    enabled_by_default: true,
};

/// Every analyzer descriptor shipped by this crate
pub fn all_descriptors() -> Vec<DiagnosticDescriptor> {
    vec![
        PARENTHESIZE_CONDITION,
        USE_COALESCE,
        SIMPLIFY_CONDITIONAL,
        RETURN_VOID,
        RETURN_VOID_FADE_OUT,
    ]
}

pub const CHECK_EXPRESSION_FOR_NULL: &str = "check-expression-for-null";
pub const SWAP_STATEMENTS_IN_IF_ELSE: &str = "swap-statements-in-if-else";
pub const REPLACE_IF_ELSE_WITH_CONDITIONAL: &str = "replace-if-else-with-conditional";
pub const REPLACE_IF_WITH_RETURN: &str = "replace-if-with-return";
pub const ADD_CAST_EXPRESSION: &str = "add-cast-expression";
pub const CALL_TO_METHOD: &str = "call-to-method";
pub const FORMAT_SUMMARY_ON_SINGLE_LINE: &str = "format-summary-on-single-line";
pub const ADD_DEFAULT_RETURN: &str = "add-return-statement-returning-default-value";

/// A refactoring as listed to users
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefactoringInfo {
    pub id: &'static str,
    pub title: &'static str,
}

pub const REFACTORINGS: &[RefactoringInfo] = &[
    RefactoringInfo {
        id: CHECK_EXPRESSION_FOR_NULL,
        title: "Check expression for null",
    },
    RefactoringInfo {
        id: SWAP_STATEMENTS_IN_IF_ELSE,
        title: "Swap statements in if-else",
    },
    RefactoringInfo {
        id: REPLACE_IF_ELSE_WITH_CONDITIONAL,
        title: "Replace if-else with conditional expression",
    },
    RefactoringInfo {
        id: REPLACE_IF_WITH_RETURN,
        title: "Replace if-else with return",
    },
    RefactoringInfo {
        id: ADD_CAST_EXPRESSION,
        title: "Add cast expression",
    },
    RefactoringInfo {
        id: CALL_TO_METHOD,
        title: "Call 'ToString', 'ToList' or 'ToArray'",
    },
    RefactoringInfo {
        id: FORMAT_SUMMARY_ON_SINGLE_LINE,
        title: "Format documentation summary on a single line",
    },
    RefactoringInfo {
        id: ADD_DEFAULT_RETURN,
        title: "Add return statement that returns default value",
    },
];
