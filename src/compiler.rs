//! Tree-to-regex code generator.
//!
//! Walks the pattern tree bottom-up and emits regex source for a
//! backtracking engine with negative-lookahead support. Most node kinds
//! translate locally, but a negated capture `!(...)` cannot: its trailing
//! run must stop wherever the *enclosing* pattern resumes, which is unknown
//! while compiling the capture in isolation. The generator therefore emits
//! an intermediate fragment list with explicit boundary markers and
//! resolves them in a second pass over the whole compilation, once the
//! full pattern is in view.

use crate::error::Error;
use crate::parser::{NodeId, NodeKind, Quantifier, Tree};

/// One element of the intermediate representation.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Frag {
    /// Final regex text.
    Lit(String),
    /// Emitted inside `!(...)` after its lazy run: the run's extent is
    /// unresolved until the rest of the pattern is known.
    NegBoundary,
    /// Emitted where real content starts (literals and wildcard runs); a
    /// pending negation's run stops here.
    ContentBoundary,
}

/// Compile the tree into anchored regex source. `separators` restricts `*`
/// and `?` (but never `**`); empty means no restriction. `uses_negation`
/// comes from the parser and gates the boundary-resolution pass.
pub fn generate(tree: &Tree, separators: &[char], uses_negation: bool) -> Result<String, Error> {
    let mut frags = vec![Frag::Lit("^".to_string())];
    emit(tree, tree.root(), separators, &mut frags)?;
    frags.push(Frag::Lit("$".to_string()));
    Ok(resolve(frags, uses_negation))
}

fn emit(tree: &Tree, id: NodeId, sep: &[char], out: &mut Vec<Frag>) -> Result<(), Error> {
    let node = tree
        .get(id)
        .ok_or_else(|| Error::Codegen(format!("dangling node id {id}")))?;

    match &node.kind {
        NodeKind::Pattern => {
            for &child in &node.children {
                emit(tree, child, sep, out)?;
            }
        }

        NodeKind::AnyOf => {
            if node.children.is_empty() {
                return Ok(());
            }
            out.push(Frag::Lit("(?:".to_string()));
            emit_alternatives(tree, &node.children, sep, out)?;
            out.push(Frag::Lit(")".to_string()));
        }

        NodeKind::Capture { quantifier } => {
            if node.children.is_empty() {
                return Ok(());
            }
            match quantifier {
                Quantifier::ExactlyOne => {
                    out.push(Frag::Lit("(".to_string()));
                    emit_alternatives(tree, &node.children, sep, out)?;
                    out.push(Frag::Lit(")".to_string()));
                }
                Quantifier::ZeroOrMore => {
                    out.push(Frag::Lit("((?:".to_string()));
                    emit_alternatives(tree, &node.children, sep, out)?;
                    out.push(Frag::Lit(")*)".to_string()));
                }
                Quantifier::OneOrMore => {
                    out.push(Frag::Lit("((?:".to_string()));
                    emit_alternatives(tree, &node.children, sep, out)?;
                    out.push(Frag::Lit(")+)".to_string()));
                }
                Quantifier::ZeroOrOne => {
                    out.push(Frag::Lit("((?:".to_string()));
                    emit_alternatives(tree, &node.children, sep, out)?;
                    out.push(Frag::Lit(")?)".to_string()));
                }
                Quantifier::NoneOf => {
                    // "none of the alternatives here", then consume a lazy
                    // run whose extent the resolution pass settles
                    out.push(Frag::Lit("((?!".to_string()));
                    emit_alternatives(tree, &node.children, sep, out)?;
                    out.push(Frag::Lit(format!("){}?", any_run(sep))));
                    out.push(Frag::NegBoundary);
                    out.push(Frag::Lit(")".to_string()));
                }
            }
        }

        NodeKind::Any => {
            out.push(Frag::ContentBoundary);
            out.push(Frag::Lit(any_run(sep)));
        }

        NodeKind::Super => {
            out.push(Frag::ContentBoundary);
            out.push(Frag::Lit(".*".to_string()));
        }

        NodeKind::Single => {
            let lit = if sep.is_empty() {
                ".".to_string()
            } else {
                format!("[^{}]", class_text(sep))
            };
            out.push(Frag::Lit(lit));
        }

        NodeKind::List { chars, negated } => {
            let sign = if *negated { "^" } else { "" };
            out.push(Frag::Lit(format!(
                "[{sign}{}]",
                fancy_regex::escape(chars)
            )));
        }

        NodeKind::Range { lo, hi, negated } => {
            let sign = if *negated { "^" } else { "" };
            out.push(Frag::Lit(format!(
                "[{sign}{}-{}]",
                fancy_regex::escape(&lo.to_string()),
                fancy_regex::escape(&hi.to_string())
            )));
        }

        NodeKind::Posix { class, negated } => {
            let sign = if *negated { "^" } else { "" };
            out.push(Frag::Lit(format!("[[:{sign}{class}:]]")));
        }

        NodeKind::Text { text } => {
            out.push(Frag::ContentBoundary);
            out.push(Frag::Lit(fancy_regex::escape(text).into_owned()));
        }

        NodeKind::Nothing => {}
    }

    Ok(())
}

fn emit_alternatives(
    tree: &Tree,
    children: &[NodeId],
    sep: &[char],
    out: &mut Vec<Frag>,
) -> Result<(), Error> {
    for (i, &child) in children.iter().enumerate() {
        if i > 0 {
            out.push(Frag::Lit("|".to_string()));
        }
        emit(tree, child, sep, out)?;
    }
    Ok(())
}

/// A greedy run of anything `*` may cross: `[^seps]*` with separators
/// configured, `.*` without.
fn any_run(sep: &[char]) -> String {
    if sep.is_empty() {
        ".*".to_string()
    } else {
        format!("[^{}]*", class_text(sep))
    }
}

fn class_text(sep: &[char]) -> String {
    let chars: String = sep.iter().collect();
    fancy_regex::escape(&chars).into_owned()
}

/// Settle every negation boundary: a negated capture whose enclosing
/// pattern still has content after it lets its lazy run stop at that
/// content; one with nothing after it gets anchored to the end of input.
/// Content boundaries are pure bookkeeping and are dropped.
fn resolve(frags: Vec<Frag>, uses_negation: bool) -> String {
    let last_content = if uses_negation {
        frags.iter().rposition(|f| *f == Frag::ContentBoundary)
    } else {
        None
    };

    let mut out = String::new();
    for (i, frag) in frags.into_iter().enumerate() {
        match frag {
            Frag::Lit(text) => out.push_str(&text),
            Frag::ContentBoundary => {}
            Frag::NegBoundary => {
                if last_content.is_none_or(|c| c < i) {
                    out.push('$');
                }
            }
        }
    }
    out
}
