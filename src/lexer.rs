//! Glob pattern lexer.
//!
//! Tokenizes pattern strings like `src/**/+(a|b)/[0-9].rs` into a flat
//! stream of typed tokens. The lexing is context-sensitive: `,` separates
//! alternatives only inside `{...}`, `|` only inside a capture group, and
//! `}` / `)` close a group only when one is open. The lexer tracks a depth
//! counter for each construct and chooses the set of characters that ends a
//! literal run ("breakers") from the innermost context.

use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Eof,
    Error,
    Text,
    /// `*`
    Any,
    /// `**`
    Super,
    /// `?`
    Single,
    /// `[`
    RangeOpen,
    /// `]`
    RangeClose,
    /// `!` directly after `[`
    RangeNot,
    RangeLo,
    /// `-` between range endpoints
    RangeBetween,
    RangeHi,
    /// `{`
    TermsOpen,
    /// `}`
    TermsClose,
    /// `,` inside `{...}`, `|` inside a capture
    Separator,
    /// `(` or `@(`
    CaptureOpenAt,
    /// `*(`
    CaptureOpenStar,
    /// `+(`
    CaptureOpenPlus,
    /// `?(`
    CaptureOpenQuestion,
    /// `!(`
    CaptureOpenNot,
    /// `)`
    CaptureClose,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub raw: String,
}

impl Token {
    fn new(kind: TokenKind, raw: impl Into<String>) -> Token {
        Token {
            kind,
            raw: raw.into(),
        }
    }
}

/// Characters that end a literal text run at the top level.
const TEXT_BREAKERS: &[char] = &['?', '*', '[', '{', '(', '@', '!', '+'];
/// Inside `{...}`: also stop at the terms close and the comma separator.
const TERMS_BREAKERS: &[char] = &['?', '*', '[', '{', '(', '@', '!', '+', '}', ','];
/// Inside a capture group: also stop at the group close and the pipe.
const CAPTURE_BREAKERS: &[char] = &['?', '*', '[', '{', '(', '@', '!', '+', ')', '|'];

pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    terms_depth: usize,
    capture_depth: usize,
    /// The character-class sub-scan emits several tokens per fetch; they
    /// queue here until `next` drains them.
    pending: VecDeque<Token>,
    /// Once set, `next` keeps returning the same error token.
    err: Option<String>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Lexer<'a> {
        Lexer {
            input,
            pos: 0,
            terms_depth: 0,
            capture_depth: 0,
            pending: VecDeque::new(),
            err: None,
        }
    }

    /// Current byte offset into the input, for error reporting.
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn next(&mut self) -> Token {
        if let Some(tok) = self.pending.pop_front() {
            return tok;
        }
        if let Some(msg) = &self.err {
            return Token::new(TokenKind::Error, msg.clone());
        }
        self.fetch()
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek2(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next()?;
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn fail(&mut self, msg: &str) -> Token {
        self.err = Some(msg.to_string());
        Token::new(TokenKind::Error, msg)
    }

    fn in_terms(&self) -> bool {
        self.terms_depth > 0
    }

    fn in_capture(&self) -> bool {
        self.capture_depth > 0
    }

    fn fetch(&mut self) -> Token {
        let Some(c) = self.peek() else {
            return Token::new(TokenKind::Eof, "");
        };

        match c {
            '{' => {
                self.advance();
                self.terms_depth += 1;
                Token::new(TokenKind::TermsOpen, "{")
            }
            ',' if self.in_terms() => {
                self.advance();
                Token::new(TokenKind::Separator, ",")
            }
            '}' if self.in_terms() => {
                self.advance();
                self.terms_depth -= 1;
                Token::new(TokenKind::TermsClose, "}")
            }
            '|' if self.in_capture() => {
                self.advance();
                Token::new(TokenKind::Separator, "|")
            }
            ')' if self.in_capture() => {
                self.advance();
                self.capture_depth -= 1;
                Token::new(TokenKind::CaptureClose, ")")
            }
            '[' => {
                self.advance();
                self.scan_class();
                Token::new(TokenKind::RangeOpen, "[")
            }
            '(' => {
                self.advance();
                self.capture_depth += 1;
                Token::new(TokenKind::CaptureOpenAt, "(")
            }
            '@' | '!' | '+' => {
                self.advance();
                if self.peek() == Some('(') {
                    self.advance();
                    self.capture_depth += 1;
                    let kind = match c {
                        '@' => TokenKind::CaptureOpenAt,
                        '!' => TokenKind::CaptureOpenNot,
                        _ => TokenKind::CaptureOpenPlus,
                    };
                    Token::new(kind, format!("{c}("))
                } else {
                    // not a capture opener after all; a bare `@` `!` `+` is
                    // literal text
                    Token::new(TokenKind::Text, c.to_string())
                }
            }
            '?' => {
                self.advance();
                if self.peek() == Some('(') {
                    self.advance();
                    self.capture_depth += 1;
                    Token::new(TokenKind::CaptureOpenQuestion, "?(")
                } else {
                    Token::new(TokenKind::Single, "?")
                }
            }
            '*' => {
                self.advance();
                match self.peek() {
                    Some('*') => {
                        self.advance();
                        Token::new(TokenKind::Super, "**")
                    }
                    Some('(') => {
                        self.advance();
                        self.capture_depth += 1;
                        Token::new(TokenKind::CaptureOpenStar, "*(")
                    }
                    _ => Token::new(TokenKind::Any, "*"),
                }
            }
            _ => {
                let breakers = if self.in_terms() {
                    TERMS_BREAKERS
                } else if self.in_capture() {
                    CAPTURE_BREAKERS
                } else {
                    TEXT_BREAKERS
                };
                match self.scan_run(breakers) {
                    Ok(text) => Token::new(TokenKind::Text, text),
                    Err(tok) => tok,
                }
            }
        }
    }

    /// Scan the inside of a `[...]` class, queuing its tokens. Called with
    /// the opening `[` already consumed. Classes cannot nest, so this is a
    /// straight-line sub-scan rather than another depth counter: an optional
    /// leading `!`, then either a `lo-hi` pair or a literal run, then `]`.
    fn scan_class(&mut self) {
        let mut seen_not = false;
        let mut want_hi = false;
        let mut want_close = false;

        loop {
            if want_close {
                match self.peek() {
                    Some(']') => {
                        self.advance();
                        let tok = Token::new(TokenKind::RangeClose, "]");
                        self.pending.push_back(tok);
                    }
                    Some(_) => {
                        let tok = self.fail("expected ']' to close character class");
                        self.pending.push_back(tok);
                    }
                    None => {
                        let tok = self.fail("unterminated character class");
                        self.pending.push_back(tok);
                    }
                }
                return;
            }

            let Some(c) = self.peek() else {
                let tok = self.fail("unterminated character class");
                self.pending.push_back(tok);
                return;
            };

            if want_hi {
                self.advance();
                let tok = Token::new(TokenKind::RangeHi, c.to_string());
                self.pending.push_back(tok);
                want_close = true;
                continue;
            }

            // only meaningful as the first character
            if !seen_not && c == '!' {
                self.advance();
                self.pending.push_back(Token::new(TokenKind::RangeNot, "!"));
                seen_not = true;
                continue;
            }

            // one-character lookahead for `-` decides range vs. set
            if self.peek2() == Some('-') {
                self.advance();
                self.advance();
                self.pending.push_back(Token::new(TokenKind::RangeLo, c.to_string()));
                self.pending.push_back(Token::new(TokenKind::RangeBetween, "-"));
                want_hi = true;
                continue;
            }

            match self.scan_run(&[']']) {
                Ok(text) => {
                    if !text.is_empty() {
                        self.pending.push_back(Token::new(TokenKind::Text, text));
                    }
                }
                Err(tok) => {
                    self.pending.push_back(tok);
                    return;
                }
            }
            want_close = true;
        }
    }

    /// Consume a literal run up to (not including) the first unescaped
    /// breaker. A backslash takes the following character literally
    /// regardless of breaker membership.
    fn scan_run(&mut self, breakers: &[char]) -> Result<String, Token> {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.advance();
                match self.advance() {
                    Some(escaped) => text.push(escaped),
                    None => return Err(self.fail("unterminated escape")),
                }
                continue;
            }
            if breakers.contains(&c) {
                break;
            }
            self.advance();
            text.push(c);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        loop {
            let tok = lexer.next();
            let done = matches!(tok.kind, TokenKind::Eof | TokenKind::Error);
            tokens.push(tok);
            if done {
                break;
            }
        }
        tokens
    }

    fn kinds(input: &str) -> Vec<TokenKind> {
        lex(input).iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_lexer_plain_text() {
        let tokens = lex("hello");
        assert_eq!(tokens[0], Token::new(TokenKind::Text, "hello"));
        assert_eq!(tokens[1].kind, TokenKind::Eof);
    }

    #[test]
    fn test_lexer_wildcards() {
        assert_eq!(
            kinds("a*b?c"),
            vec![
                TokenKind::Text,
                TokenKind::Any,
                TokenKind::Text,
                TokenKind::Single,
                TokenKind::Text,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lexer_super() {
        let tokens = lex("a**");
        assert_eq!(tokens[1], Token::new(TokenKind::Super, "**"));
    }

    #[test]
    fn test_lexer_triple_star() {
        // `***` is `**` followed by a lone `*`
        assert_eq!(
            kinds("***"),
            vec![TokenKind::Super, TokenKind::Any, TokenKind::Eof]
        );
    }

    #[test]
    fn test_lexer_terms() {
        let tokens = lex("{a,b}");
        let expected = vec![
            Token::new(TokenKind::TermsOpen, "{"),
            Token::new(TokenKind::Text, "a"),
            Token::new(TokenKind::Separator, ","),
            Token::new(TokenKind::Text, "b"),
            Token::new(TokenKind::TermsClose, "}"),
            Token::new(TokenKind::Eof, ""),
        ];
        assert_eq!(tokens, expected);
    }

    #[test]
    fn test_lexer_comma_is_text_outside_terms() {
        let tokens = lex("a,b");
        assert_eq!(tokens[0], Token::new(TokenKind::Text, "a,b"));
    }

    #[test]
    fn test_lexer_close_brace_is_text_outside_terms() {
        let tokens = lex("a}b");
        assert_eq!(tokens[0], Token::new(TokenKind::Text, "a}b"));
    }

    #[test]
    fn test_lexer_capture_openers() {
        for (input, kind) in [
            ("(", TokenKind::CaptureOpenAt),
            ("@(", TokenKind::CaptureOpenAt),
            ("*(", TokenKind::CaptureOpenStar),
            ("+(", TokenKind::CaptureOpenPlus),
            ("?(", TokenKind::CaptureOpenQuestion),
            ("!(", TokenKind::CaptureOpenNot),
        ] {
            let tokens = lex(input);
            assert_eq!(tokens[0].kind, kind, "failed for input: {input}");
        }
    }

    #[test]
    fn test_lexer_capture_group() {
        assert_eq!(
            kinds("@(a|b)"),
            vec![
                TokenKind::CaptureOpenAt,
                TokenKind::Text,
                TokenKind::Separator,
                TokenKind::Text,
                TokenKind::CaptureClose,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lexer_pipe_is_text_outside_capture() {
        let tokens = lex("a|b");
        assert_eq!(tokens[0], Token::new(TokenKind::Text, "a|b"));
    }

    #[test]
    fn test_lexer_bare_at_is_text() {
        let tokens = lex("a@b");
        assert_eq!(tokens[0], Token::new(TokenKind::Text, "a"));
        assert_eq!(tokens[1], Token::new(TokenKind::Text, "@"));
        assert_eq!(tokens[2], Token::new(TokenKind::Text, "b"));
    }

    #[test]
    fn test_lexer_class_set() {
        let tokens = lex("[abc]");
        let expected = vec![
            Token::new(TokenKind::RangeOpen, "["),
            Token::new(TokenKind::Text, "abc"),
            Token::new(TokenKind::RangeClose, "]"),
            Token::new(TokenKind::Eof, ""),
        ];
        assert_eq!(tokens, expected);
    }

    #[test]
    fn test_lexer_class_range() {
        let tokens = lex("[a-z]");
        let expected = vec![
            Token::new(TokenKind::RangeOpen, "["),
            Token::new(TokenKind::RangeLo, "a"),
            Token::new(TokenKind::RangeBetween, "-"),
            Token::new(TokenKind::RangeHi, "z"),
            Token::new(TokenKind::RangeClose, "]"),
            Token::new(TokenKind::Eof, ""),
        ];
        assert_eq!(tokens, expected);
    }

    #[test]
    fn test_lexer_class_negated_range() {
        assert_eq!(
            kinds("[!0-9]"),
            vec![
                TokenKind::RangeOpen,
                TokenKind::RangeNot,
                TokenKind::RangeLo,
                TokenKind::RangeBetween,
                TokenKind::RangeHi,
                TokenKind::RangeClose,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lexer_class_posix_chars() {
        let tokens = lex("[:alpha:]");
        assert_eq!(tokens[1], Token::new(TokenKind::Text, ":alpha:"));
    }

    #[test]
    fn test_lexer_class_junk_after_range() {
        let tokens = lex("[a-z0]");
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Error);
    }

    #[test]
    fn test_lexer_unterminated_class() {
        let tokens = lex("[abc");
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Error);
    }

    #[test]
    fn test_lexer_escape() {
        let tokens = lex(r"a\*b");
        assert_eq!(tokens[0], Token::new(TokenKind::Text, "a*b"));
    }

    #[test]
    fn test_lexer_escape_in_class() {
        let tokens = lex(r"[a\]b]");
        assert_eq!(tokens[1], Token::new(TokenKind::Text, "a]b"));
        assert_eq!(tokens[2].kind, TokenKind::RangeClose);
    }

    #[test]
    fn test_lexer_trailing_escape() {
        let tokens = lex("abc\\");
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Error);
    }

    #[test]
    fn test_lexer_error_is_sticky() {
        let mut lexer = Lexer::new("abc\\");
        assert_eq!(lexer.next().kind, TokenKind::Error);
        assert_eq!(lexer.next().kind, TokenKind::Error);
    }

    #[test]
    fn test_lexer_full_pattern() {
        assert_eq!(
            kinds("test/+(a|b)/x.go"),
            vec![
                TokenKind::Text,
                TokenKind::CaptureOpenPlus,
                TokenKind::Text,
                TokenKind::Separator,
                TokenKind::Text,
                TokenKind::CaptureClose,
                TokenKind::Text,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lexer_unicode_text() {
        let tokens = lex("héllo*wörld");
        assert_eq!(tokens[0], Token::new(TokenKind::Text, "héllo"));
        assert_eq!(tokens[2], Token::new(TokenKind::Text, "wörld"));
    }
}
