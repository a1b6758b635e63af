/// Everything that can go wrong while compiling a glob pattern.
///
/// Match-time budget overruns are not represented here: they abort the
/// calling task (see `Glob::matches`) instead of surfacing as a value.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed input caught by the tokenizer: unterminated escape,
    /// unterminated character class, bad range shape.
    #[error("lex error at byte {pos}: {msg}")]
    Lex { pos: usize, msg: String },

    /// Malformed token sequence: unterminated group or alternation, a
    /// character class that is neither a range nor a set, an inverted range.
    #[error("parse error: {0}")]
    Parse(String),

    /// Internal invariant violation in the code generator. Unreachable for
    /// trees produced by `parse`.
    #[error("codegen error: {0}")]
    Codegen(String),

    /// The regex engine rejected the generated source. Surfaced verbatim;
    /// indicates a generator bug, not a user input problem.
    #[error("regex rejected generated pattern: {0}")]
    Regex(#[from] fancy_regex::Error),
}
