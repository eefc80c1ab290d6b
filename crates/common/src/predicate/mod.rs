//! Predicate utilities
//!
//! Pure string-to-symbol transforms over s(CASP) literals:
//! - `generalize`: literal text to its `name/arity` reference
//! - `expand`: reference back to a call with fresh variables
//! - `declare_abducible`: `#abducible` directive for a reference

use crate::errors::{Result, ScaspError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Negation-as-failure prefix
const NAF_PREFIX: &str = "not ";

/// Classical negation prefix
const CLASSICAL_NEGATION: char = '-';

/// Separator introducing a constraint annotation (`X | {X \= 1}`)
const CONSTRAINT_SEPARATOR: char = '|';

/// A predicate identified by name and arity, independent of its arguments
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PredicateRef {
    /// Functor name
    pub name: String,
    /// Number of top-level arguments
    pub arity: usize,
}

impl PredicateRef {
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }

    /// Whether the name is a plain lowercase atom (`human`, `player_in_game`)
    pub fn is_plain_atom(&self) -> bool {
        is_atom_name(&self.name)
    }
}

impl fmt::Display for PredicateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

impl FromStr for PredicateRef {
    type Err = ScaspError;

    /// Parse the generalized `name/arity` form
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ScaspError::InvalidPredicate { input: s.to_string() };
        let (name, arity) = s.trim().rsplit_once('/').ok_or_else(invalid)?;
        let arity = arity.trim().parse::<usize>().map_err(|_| invalid())?;
        let name = name.trim();
        if name.is_empty() {
            return Err(invalid());
        }
        Ok(PredicateRef::new(name, arity))
    }
}

/// Whether `name` is a lowercase atom: `[a-z][A-Za-z0-9_]*`
pub fn is_atom_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Strip negation markers and a trailing period from a literal.
///
/// `not -human(X).` becomes `human(X)`.
pub fn strip_negation(literal: &str) -> &str {
    let mut text = literal.trim().trim_end_matches(['.', ',']).trim_end();
    loop {
        if let Some(rest) = text.strip_prefix(NAF_PREFIX) {
            text = rest.trim_start();
        } else if let Some(rest) = text.strip_prefix(CLASSICAL_NEGATION) {
            text = rest.trim_start();
        } else {
            return text;
        }
    }
}

/// Reduce a literal to its predicate reference.
///
/// Negation markers and a top-level constraint annotation are removed
/// before counting, and arguments are split only on commas outside any
/// nested term, list, constraint set or quoted atom, so `f(a,g(b,c),d)`
/// has arity 3.
pub fn generalize(literal: &str) -> PredicateRef {
    let text = strip_annotation(strip_negation(literal));

    let Some(open) = text.find('(') else {
        return PredicateRef::new(text.trim(), 0);
    };
    let name = text[..open].trim();
    PredicateRef::new(name, count_arguments(&text[open + 1..]))
}

/// Produce a call for `predicate` with fresh variables `A, B, C, ...`
pub fn expand(predicate: &PredicateRef) -> String {
    if predicate.arity == 0 {
        return predicate.name.clone();
    }
    let variables: Vec<String> = (0..predicate.arity).map(variable_name).collect();
    format!("{}({})", predicate.name, variables.join(","))
}

/// `#abducible` directive making `predicate` freely assumable
pub fn declare_abducible(predicate: &PredicateRef) -> String {
    format!("#abducible {}.", expand(predicate))
}

/// Variable name for argument position `index`: `A`..`Z`, then `A1`..`Z1`, ...
fn variable_name(index: usize) -> String {
    let letter = (b'A' + (index % 26) as u8) as char;
    match index / 26 {
        0 => letter.to_string(),
        round => format!("{}{}", letter, round),
    }
}

/// Drop a constraint annotation that sits at nesting depth 0
fn strip_annotation(text: &str) -> &str {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '(' | '[' | '{') => depth += 1,
            (None, ')' | ']' | '}') => depth = depth.saturating_sub(1),
            (None, CONSTRAINT_SEPARATOR) if depth == 0 => return text[..i].trim_end(),
            _ => {}
        }
    }
    text
}

/// Count top-level arguments in the text following a functor's `(`
fn count_arguments(args: &str) -> usize {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut commas = 0;
    let mut seen_content = false;

    for c in args.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => {
                quote = Some(c);
                seen_content = true;
            }
            (None, '(' | '[' | '{') => {
                depth += 1;
                seen_content = true;
            }
            (None, ')' | ']' | '}') if depth == 0 => break,
            (None, ')' | ']' | '}') => depth -= 1,
            (None, ',') if depth == 0 => commas += 1,
            (None, c) if !c.is_whitespace() => seen_content = true,
            _ => {}
        }
    }

    if seen_content || commas > 0 {
        commas + 1
    } else {
        0
    }
}
