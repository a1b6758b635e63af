//! Extended glob patterns with capture groups.
//!
//! Compiles a glob dialect into an anchored regular expression executed by
//! `fancy-regex`. A compiled [`Glob`] always matches whole strings, never
//! substrings. The pattern syntax:
//!
//! ```text
//! pattern:
//!     { term }
//!
//! term:
//!     `*`         any run of non-separator characters
//!     `**`        any run of characters, separators included
//!     `?`         any single non-separator character
//!     `[` [ `!` ] { character-range } `]`
//!                 character class (must be non-empty)
//!     `{` pattern-list `}`
//!                 pattern alternatives, comma-separated
//!     c           literal character c
//!     `\` c       literal character c, even when c is special
//!
//! character-range:
//!     c           single character (escapes allowed)
//!     lo `-` hi   characters between lo and hi inclusive
//!     `:` name `:`  POSIX class, e.g. `[:alpha:]`
//!
//! capture (pipe-separated alternatives, yields a capture group):
//!     `(` ... `)`, `@(` ... `)`   exactly one of
//!     `*(` ... `)`                zero or more of
//!     `+(` ... `)`                one or more of
//!     `?(` ... `)`                zero or one of
//!     `!(` ... `)`                none of
//! ```
//!
//! Separators are opt-in: with none configured, `*` and `?` match any
//! character.
//!
//! ```
//! let glob = exglob::compile("test/(a|b)/*.go", &['/']).unwrap();
//! assert!(glob.matches("test/a/x.go"));
//! let caps = glob.capture("test/b/y.go").unwrap();
//! assert_eq!(caps, vec!["test/b/y.go", "b"]);
//! ```

pub mod compiler;
pub mod error;
pub mod lexer;
pub mod parser;

pub use compiler::generate;
pub use error::Error;
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{parse, Node, NodeId, NodeKind, Quantifier, Tree};

/// Backtracking-step budget for one match. Overrunning it means the
/// pattern/input pair is pathological; the overrun is fatal, never
/// reported as "no match".
const BACKTRACK_LIMIT: usize = 1_000_000;

/// Glob metacharacters recognized by [`quote_meta`].
const SPECIAL: &[char] = &[
    '\\', '*', '?', '[', ']', '{', '}', '(', ')', '|', ',', '!', '@', '+', '-',
];

/// A compiled glob pattern. Immutable; safe to share across threads.
#[derive(Debug, Clone)]
pub struct Glob {
    regex: fancy_regex::Regex,
}

/// Compile `pattern` with the given separator set. An empty separator set
/// means `*` and `?` are unrestricted.
pub fn compile(pattern: &str, separators: &[char]) -> Result<Glob, Error> {
    let mut lexer = Lexer::new(pattern);
    let (tree, uses_negation) = parse(&mut lexer)?;
    let source = generate(&tree, separators, uses_negation)?;
    let regex = fancy_regex::RegexBuilder::new(&source)
        .backtrack_limit(BACKTRACK_LIMIT)
        .build()?;
    Ok(Glob { regex })
}

impl Glob {
    /// Whether `text` as a whole matches the pattern.
    ///
    /// Panics when the match overruns the backtracking budget: the result
    /// is unknown at that point and "false" would be a silent lie.
    pub fn matches(&self, text: &str) -> bool {
        match self.regex.is_match(text) {
            Ok(matched) => matched,
            Err(err) => panic!(
                "glob match aborted: {err} (regex {:?} against {} bytes)",
                self.regex.as_str(),
                text.len()
            ),
        }
    }

    /// Capture-group extraction. `None` when the whole pattern does not
    /// match; otherwise the full matched text followed by each capture
    /// group's text, in left-to-right order of group appearance in the
    /// pattern. Groups that did not participate yield empty strings.
    ///
    /// Panics on budget overrun, like [`Glob::matches`].
    pub fn capture(&self, text: &str) -> Option<Vec<String>> {
        let caps = match self.regex.captures(text) {
            Ok(caps) => caps,
            Err(err) => panic!(
                "glob capture aborted: {err} (regex {:?} against {} bytes)",
                self.regex.as_str(),
                text.len()
            ),
        }?;
        Some(
            (0..caps.len())
                .map(|i| {
                    caps.get(i)
                        .map(|m| m.as_str().to_string())
                        .unwrap_or_default()
                })
                .collect(),
        )
    }

    /// The generated regex source.
    pub fn regex_source(&self) -> &str {
        self.regex.as_str()
    }
}

/// Escape every glob metacharacter in `text` so it can be embedded in a
/// pattern as a literal. `quote_meta("*(foo*)")` returns `\*\(foo\*\)`.
pub fn quote_meta(text: &str) -> String {
    let mut out = String::with_capacity(2 * text.len());
    for c in text.chars() {
        if SPECIAL.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_meta() {
        assert_eq!(quote_meta("*(foo*)"), r"\*\(foo\*\)");
        assert_eq!(quote_meta("plain"), "plain");
        assert_eq!(quote_meta("{a,b}|[c]"), r"\{a\,b\}\|\[c\]");
    }

    #[test]
    fn test_compile_smoke() {
        let glob = compile("a*c", &[]).unwrap();
        assert!(glob.matches("abc"));
        assert!(glob.matches("ac"));
        assert!(!glob.matches("ab"));
    }

    #[test]
    fn test_regex_source_is_anchored() {
        let glob = compile("a*", &[]).unwrap();
        let source = glob.regex_source();
        assert!(source.starts_with('^') && source.ends_with('$'));
    }

    #[test]
    fn test_glob_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Glob>();
    }
}
