//! Glob pattern parser.
//!
//! Consumes the token stream and builds a tree whose shape encodes nesting.
//! The tree is an arena of nodes addressed by index, and the parser keeps a
//! single cursor into it, using parent links for scope navigation: every
//! `{` or capture opener descends exactly two levels (the container plus
//! its first alternative), so the matching close ascends to the
//! grandparent. No separate parse stack exists.

use crate::error::Error;
use crate::lexer::{Lexer, TokenKind};

pub type NodeId = usize;

/// Capture group quantifier, from the character before the `(`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    /// `@(...)` or bare `(...)`
    ExactlyOne,
    /// `*(...)`
    ZeroOrMore,
    /// `+(...)`
    OneOrMore,
    /// `?(...)`
    ZeroOrOne,
    /// `!(...)`
    NoneOf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Sequential concatenation of children.
    Pattern,
    /// Brace alternation; children are OR'd.
    AnyOf,
    /// Extglob group; children are alternative `Pattern`s.
    Capture { quantifier: Quantifier },
    /// `*`
    Any,
    /// `**`
    Super,
    /// `?`
    Single,
    /// `[abc]` / `[!abc]`
    List { chars: String, negated: bool },
    /// `[a-z]` / `[!a-z]`
    Range { lo: char, hi: char, negated: bool },
    /// `[:alpha:]` / `[:^alpha:]`
    Posix { class: String, negated: bool },
    Text { text: String },
    Nothing,
}

#[derive(Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Arena holding the pattern tree. Node 0 is always the root `Pattern`.
/// Child links own the tree shape; parent links are plain back-indices used
/// only for cursor navigation while parsing.
#[derive(Debug)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn new() -> Tree {
        Tree {
            nodes: vec![Node {
                kind: NodeKind::Pattern,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        0
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    fn insert(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        id
    }

    fn parent_of(&self, id: NodeId, what: &str) -> Result<NodeId, Error> {
        self.nodes[id]
            .parent
            .ok_or_else(|| Error::Parse(format!("unexpected {what} at top level")))
    }
}

/// Parse the token stream into a tree. The returned flag is true when the
/// pattern contains a `!(...)` capture, meaning the generated regex will
/// rely on negative lookahead.
pub fn parse(lexer: &mut Lexer) -> Result<(Tree, bool), Error> {
    let mut tree = Tree::new();
    let mut cursor = tree.root();
    let mut uses_negation = false;

    loop {
        let token = lexer.next();
        match token.kind {
            TokenKind::Eof => {
                if cursor != tree.root() {
                    return Err(Error::Parse(
                        "unterminated group or alternation".to_string(),
                    ));
                }
                return Ok((tree, uses_negation));
            }

            TokenKind::Error => {
                return Err(Error::Lex {
                    pos: lexer.pos(),
                    msg: token.raw,
                });
            }

            TokenKind::Text => {
                tree.insert(cursor, NodeKind::Text { text: token.raw });
            }
            TokenKind::Any => {
                tree.insert(cursor, NodeKind::Any);
            }
            TokenKind::Super => {
                tree.insert(cursor, NodeKind::Super);
            }
            TokenKind::Single => {
                tree.insert(cursor, NodeKind::Single);
            }

            TokenKind::RangeOpen => {
                parse_class(&mut tree, cursor, lexer)?;
            }

            TokenKind::TermsOpen => {
                let group = tree.insert(cursor, NodeKind::AnyOf);
                cursor = tree.insert(group, NodeKind::Pattern);
            }

            TokenKind::CaptureOpenAt
            | TokenKind::CaptureOpenStar
            | TokenKind::CaptureOpenPlus
            | TokenKind::CaptureOpenQuestion
            | TokenKind::CaptureOpenNot => {
                let quantifier = match token.kind {
                    TokenKind::CaptureOpenStar => Quantifier::ZeroOrMore,
                    TokenKind::CaptureOpenPlus => Quantifier::OneOrMore,
                    TokenKind::CaptureOpenQuestion => Quantifier::ZeroOrOne,
                    TokenKind::CaptureOpenNot => Quantifier::NoneOf,
                    _ => Quantifier::ExactlyOne,
                };
                if quantifier == Quantifier::NoneOf {
                    uses_negation = true;
                }
                let group = tree.insert(cursor, NodeKind::Capture { quantifier });
                cursor = tree.insert(group, NodeKind::Pattern);
            }

            TokenKind::Separator => {
                // new alternative: sibling `Pattern` under the enclosing
                // AnyOf/Capture
                let group = tree.parent_of(cursor, "separator")?;
                cursor = tree.insert(group, NodeKind::Pattern);
            }

            TokenKind::TermsClose | TokenKind::CaptureClose => {
                // out of the current alternative, out of its container
                let group = tree.parent_of(cursor, "group close")?;
                cursor = tree.parent_of(group, "group close")?;
            }

            _ => {
                return Err(Error::Parse(format!(
                    "unexpected token {:?} [{}]",
                    token.kind, token.raw
                )));
            }
        }
    }
}

/// Sub-parser for `[...]` contents: consumes tokens through `RangeClose`
/// and appends the classified `List`, `Range`, or `Posix` leaf.
fn parse_class(tree: &mut Tree, cursor: NodeId, lexer: &mut Lexer) -> Result<(), Error> {
    let mut negated = false;
    let mut lo: Option<char> = None;
    let mut hi: Option<char> = None;
    let mut chars = String::new();

    loop {
        let token = lexer.next();
        match token.kind {
            TokenKind::Eof => {
                return Err(Error::Parse("unexpected end of character class".to_string()));
            }
            TokenKind::Error => {
                return Err(Error::Lex {
                    pos: lexer.pos(),
                    msg: token.raw,
                });
            }
            TokenKind::RangeNot => negated = true,
            TokenKind::RangeLo => lo = Some(endpoint(&token.raw)?),
            TokenKind::RangeBetween => {}
            TokenKind::RangeHi => {
                let c = endpoint(&token.raw)?;
                if let Some(lo) = lo {
                    if c < lo {
                        return Err(Error::Parse(format!(
                            "range hi '{c}' precedes lo '{lo}'"
                        )));
                    }
                }
                hi = Some(c);
            }
            TokenKind::Text => chars = token.raw,
            TokenKind::RangeClose => {
                let kind = classify(lo, hi, chars, negated)?;
                tree.insert(cursor, kind);
                return Ok(());
            }
            _ => {
                return Err(Error::Parse(format!(
                    "unexpected token {:?} in character class",
                    token.kind
                )));
            }
        }
    }
}

fn classify(
    lo: Option<char>,
    hi: Option<char>,
    chars: String,
    negated: bool,
) -> Result<NodeKind, Error> {
    match (lo, hi, chars.is_empty()) {
        (Some(lo), Some(hi), true) => Ok(NodeKind::Range { lo, hi, negated }),
        (None, None, false) => {
            if chars.len() >= 2 && chars.starts_with(':') && chars.ends_with(':') {
                Ok(NodeKind::Posix {
                    negated: negated || chars.contains('^') || chars.contains('!'),
                    class: chars
                        .trim_matches(|c| matches!(c, '[' | ']' | ':' | '^' | '!'))
                        .to_string(),
                })
            } else {
                Ok(NodeKind::List { chars, negated })
            }
        }
        _ => Err(Error::Parse(
            "character class is neither a range nor a set".to_string(),
        )),
    }
}

fn endpoint(raw: &str) -> Result<char, Error> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(Error::Parse(format!(
            "unexpected length of range endpoint [{raw}]"
        ))),
    }
}
