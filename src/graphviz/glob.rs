//! Shell-style wildcard matching for style rules
//!
//! `*` matches any run of characters (including none), `?` matches exactly
//! one character, and `\` makes the following character literal. Every
//! other character matches itself.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("pattern ends with an unfinished escape: {0}")]
    TrailingEscape(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Literal(char),
    AnyChar,
    AnyRun,
}

/// A compiled wildcard pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    tokens: Vec<Token>,
}

impl Pattern {
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        let mut tokens = Vec::new();
        let mut chars = pattern.chars();

        while let Some(c) = chars.next() {
            let token = match c {
                '*' => Token::AnyRun,
                '?' => Token::AnyChar,
                '\\' => match chars.next() {
                    Some(escaped) => Token::Literal(escaped),
                    None => return Err(PatternError::TrailingEscape(pattern.to_string())),
                },
                other => Token::Literal(other),
            };

            // Consecutive stars behave as one
            if token == Token::AnyRun && tokens.last() == Some(&Token::AnyRun) {
                continue;
            }
            tokens.push(token);
        }

        Ok(Self { tokens })
    }

    /// Returns true if the whole of `text` matches the pattern
    pub fn matches(&self, text: &str) -> bool {
        let text: Vec<char> = text.chars().collect();
        let (mut t, mut p) = (0, 0);

        // Position of the last star seen and the text index it resumes from
        let mut backtrack: Option<(usize, usize)> = None;

        while t < text.len() {
            match self.tokens.get(p) {
                Some(Token::AnyRun) => {
                    backtrack = Some((p, t));
                    p += 1;
                }
                Some(Token::AnyChar) => {
                    t += 1;
                    p += 1;
                }
                Some(Token::Literal(c)) if *c == text[t] => {
                    t += 1;
                    p += 1;
                }
                _ => match backtrack {
                    Some((star, resume)) => {
                        p = star + 1;
                        t = resume + 1;
                        backtrack = Some((star, resume + 1));
                    }
                    None => return false,
                },
            }
        }

        self.tokens[p..].iter().all(|token| *token == Token::AnyRun)
    }
}

/// Matches `text` against `pattern`; a malformed pattern matches nothing.
///
/// ```
/// use task_graph::graphviz::glob_match;
///
/// assert!(glob_match("cmd:*", "cmd:build"));
/// assert!(glob_match("t?st", "test"));
/// assert!(!glob_match("cmd:*", "build"));
/// ```
pub fn glob_match(pattern: &str, text: &str) -> bool {
    Pattern::new(pattern).is_ok_and(|p| p.matches(text))
}
