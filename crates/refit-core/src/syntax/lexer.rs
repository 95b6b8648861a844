//! CST-aware lexer that preserves all trivia (whitespace, comments, directives)
//!
//! Every byte of the input ends up in exactly one token, so
//! `parse(source).text() == source` holds for any input, valid or not.

use super::SyntaxKind;
use std::ops::Range;

/// Simple span representing a byte range in the source
pub type CstSpan = Range<usize>;

/// A lexer error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerError {
    pub message: String,
    pub span: CstSpan,
}

impl LexerError {
    pub fn new(message: impl Into<String>, span: CstSpan) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// A token with its syntax kind and span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CstToken {
    pub kind: SyntaxKind,
    pub text: String,
    pub span: CstSpan,
}

impl CstToken {
    pub fn new(kind: SyntaxKind, text: impl Into<String>, span: CstSpan) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }
}

/// Result returned by the CST lexer
pub type CstLexResult = (Vec<CstToken>, Vec<LexerError>);

/// Lex input preserving ALL trivia for CST construction
pub fn lex_with_trivia(input: &str) -> CstLexResult {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut i = 0usize;
    // Only whitespace seen since the last line break
    let mut at_line_start = true;

    while i < len {
        let start = i;
        let current = bytes[i];
        let next = bytes.get(i + 1).copied();

        let kind = match current {
            b'\n' => {
                i += 1;
                SyntaxKind::Newline
            }
            b'\r' => {
                i += if next == Some(b'\n') { 2 } else { 1 };
                SyntaxKind::Newline
            }
            b' ' | b'\t' => {
                while i < len && matches!(bytes[i], b' ' | b'\t') {
                    i += 1;
                }
                SyntaxKind::Whitespace
            }
            b'#' if at_line_start => {
                i = line_end(bytes, i);
                SyntaxKind::Directive
            }
            b'/' if next == Some(b'/') => {
                let is_doc = bytes.get(i + 2) == Some(&b'/') && bytes.get(i + 3) != Some(&b'/');
                i = line_end(bytes, i);
                if is_doc {
                    SyntaxKind::DocComment
                } else {
                    SyntaxKind::LineComment
                }
            }
            b'/' if next == Some(b'*') => {
                match input[i + 2..].find("*/") {
                    Some(end) => i = i + 2 + end + 2,
                    None => {
                        i = len;
                        errors.push(LexerError::new("Unterminated block comment", span(start, i)));
                    }
                }
                SyntaxKind::BlockComment
            }
            b'"' => {
                i = lex_string(bytes, i, &mut errors);
                SyntaxKind::StringLiteral
            }
            b'0'..=b'9' => {
                while i < len && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                SyntaxKind::IntLiteral
            }
            c if c == b'_' || c.is_ascii_alphabetic() => {
                while i < len && (bytes[i] == b'_' || bytes[i].is_ascii_alphanumeric()) {
                    i += 1;
                }
                SyntaxKind::from_keyword(&input[start..i]).unwrap_or(SyntaxKind::Ident)
            }
            _ => match punctuation(current, next) {
                Some((kind, width)) => {
                    i += width;
                    kind
                }
                None => {
                    // Consume one full UTF-8 character
                    let width = input[i..].chars().next().map(char::len_utf8).unwrap_or(1);
                    i += width;
                    errors.push(LexerError::new(
                        format!("Unexpected character '{}'", &input[start..i]),
                        span(start, i),
                    ));
                    SyntaxKind::ErrorToken
                }
            },
        };

        at_line_start = match kind {
            SyntaxKind::Newline => true,
            SyntaxKind::Whitespace => at_line_start,
            _ => false,
        };

        tokens.push(CstToken::new(kind, &input[start..i], span(start, i)));
    }

    (tokens, errors)
}

fn span(start: usize, end: usize) -> CstSpan {
    start..end
}

/// Index of the next line break (or end of input) starting at `from`
fn line_end(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|&b| b == b'\n' || b == b'\r')
        .map(|offset| from + offset)
        .unwrap_or(bytes.len())
}

fn lex_string(bytes: &[u8], start: usize, errors: &mut Vec<LexerError>) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return i + 1,
            b'\n' | b'\r' => break,
            _ => i += 1,
        }
    }
    let end = i.min(bytes.len());
    errors.push(LexerError::new("Unterminated string literal", span(start, end)));
    end
}

fn punctuation(current: u8, next: Option<u8>) -> Option<(SyntaxKind, usize)> {
    let two = match (current, next) {
        (b'?', Some(b'?')) => Some(SyntaxKind::QuestionQuestion),
        (b'=', Some(b'=')) => Some(SyntaxKind::EqEq),
        (b'=', Some(b'>')) => Some(SyntaxKind::FatArrow),
        (b'!', Some(b'=')) => Some(SyntaxKind::BangEq),
        (b'<', Some(b'=')) => Some(SyntaxKind::LtEq),
        (b'>', Some(b'=')) => Some(SyntaxKind::GtEq),
        (b'&', Some(b'&')) => Some(SyntaxKind::AmpAmp),
        (b'|', Some(b'|')) => Some(SyntaxKind::PipePipe),
        _ => None,
    };
    if let Some(kind) = two {
        return Some((kind, 2));
    }

    let one = match current {
        b'(' => SyntaxKind::LParen,
        b')' => SyntaxKind::RParen,
        b'{' => SyntaxKind::LBrace,
        b'}' => SyntaxKind::RBrace,
        b'[' => SyntaxKind::LBracket,
        b']' => SyntaxKind::RBracket,
        b';' => SyntaxKind::Semicolon,
        b',' => SyntaxKind::Comma,
        b'.' => SyntaxKind::Dot,
        b'?' => SyntaxKind::Question,
        b':' => SyntaxKind::Colon,
        b'=' => SyntaxKind::Eq,
        b'!' => SyntaxKind::Bang,
        b'<' => SyntaxKind::Lt,
        b'>' => SyntaxKind::Gt,
        b'+' => SyntaxKind::Plus,
        b'-' => SyntaxKind::Minus,
        b'*' => SyntaxKind::Star,
        b'/' => SyntaxKind::Slash,
        _ => return None,
    };
    Some((one, 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<SyntaxKind> {
        lex_with_trivia(input).0.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_lossless() {
        let source = "  return Foo(x ?? \"y\"); // done\r\n#if DEBUG\n/* a */ x != null";
        let (tokens, errors) = lex_with_trivia(source);
        assert!(errors.is_empty());
        let rebuilt: String = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(rebuilt, source);
    }

    #[test]
    fn test_directive_only_at_line_start() {
        assert_eq!(
            kinds("  #region A\nx # y"),
            vec![
                SyntaxKind::Whitespace,
                SyntaxKind::Directive,
                SyntaxKind::Newline,
                SyntaxKind::Ident,
                SyntaxKind::Whitespace,
                SyntaxKind::ErrorToken,
                SyntaxKind::Whitespace,
                SyntaxKind::Ident,
            ]
        );
    }

    #[test]
    fn test_comment_kinds() {
        assert_eq!(kinds("/// doc"), vec![SyntaxKind::DocComment]);
        assert_eq!(kinds("//// not doc"), vec![SyntaxKind::LineComment]);
        assert_eq!(kinds("// line"), vec![SyntaxKind::LineComment]);
        assert_eq!(kinds("/* block */"), vec![SyntaxKind::BlockComment]);
    }

    #[test]
    fn test_operators_and_keywords() {
        assert_eq!(
            kinds("yield return a==b"),
            vec![
                SyntaxKind::YieldKw,
                SyntaxKind::Whitespace,
                SyntaxKind::ReturnKw,
                SyntaxKind::Whitespace,
                SyntaxKind::Ident,
                SyntaxKind::EqEq,
                SyntaxKind::Ident,
            ]
        );
    }

    #[test]
    fn test_unterminated_string_reports_error() {
        let (tokens, errors) = lex_with_trivia("\"abc\nx");
        assert_eq!(errors.len(), 1);
        assert_eq!(tokens[0].kind, SyntaxKind::StringLiteral);
        assert_eq!(tokens[0].text, "\"abc");
    }
}
