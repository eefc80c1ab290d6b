//! Static scan of s(CASP) source text
//!
//! Splits a program into statements and classifies them so the search can
//! tell derived predicates (rule heads) from inputs (everything else the
//! program mentions), and can rebuild the program without selected clauses.

use scasplens_common::predicate::{generalize, PredicateRef};
use std::collections::BTreeSet;
use std::fmt;

/// Functors that are solver built-ins rather than program predicates
const BUILTINS: [&str; 8] = ["call", "fail", "false", "findall", "forall", "is", "not", "true"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// `head :- body`
    Rule,
    /// `:- body` (global constraint)
    Constraint,
    Fact,
    /// `?- goal`
    Query,
    /// `#pred`, `#abducible`, `#include`, ...
    Directive,
}

/// One statement, without its terminating period
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub kind: StatementKind,
    pub text: String,
}

impl Statement {
    fn classify(text: String) -> Self {
        let kind = if text.starts_with("?-") {
            StatementKind::Query
        } else if text.starts_with('#') {
            StatementKind::Directive
        } else if text.starts_with(":-") {
            StatementKind::Constraint
        } else if find_top_level(&text, ":-").is_some() {
            StatementKind::Rule
        } else {
            StatementKind::Fact
        };
        Self { kind, text }
    }

    /// Head literal of a rule or fact
    pub fn head(&self) -> Option<&str> {
        match self.kind {
            StatementKind::Rule => {
                find_top_level(&self.text, ":-").map(|at| self.text[..at].trim())
            }
            StatementKind::Fact => Some(self.text.as_str()),
            _ => None,
        }
    }

    /// Body literals of a rule or constraint
    pub fn body(&self) -> Vec<&str> {
        match self.kind {
            StatementKind::Rule | StatementKind::Constraint => {
                let at = find_top_level(&self.text, ":-").unwrap_or(0);
                split_top_level(&self.text[at + 2..], &[',', ';'])
            }
            _ => Vec::new(),
        }
    }

    /// Directive keyword, e.g. `pred` for `#pred human(X) :: '...'`
    pub fn directive(&self) -> Option<&str> {
        if self.kind != StatementKind::Directive {
            return None;
        }
        let rest = &self.text[1..];
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        Some(&rest[..end])
    }

    /// Predicate declared by a `#pred` or `#abducible` directive
    fn declared(&self) -> Option<PredicateRef> {
        let name = self.directive()?;
        if name != "pred" && name != "abducible" {
            return None;
        }
        let rest = self.text[1 + name.len()..].trim_start();
        let literal = match find_top_level(rest, "::") {
            Some(at) => &rest[..at],
            None => rest,
        };
        Some(generalize(literal))
    }
}

/// A parsed program
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    statements: Vec<Statement>,
}

impl Program {
    pub fn parse(source: &str) -> Self {
        let statements = split_statements(source)
            .into_iter()
            .map(Statement::classify)
            .collect();
        Self { statements }
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Predicates concluded by at least one rule head
    pub fn conclusions(&self) -> BTreeSet<PredicateRef> {
        self.statements
            .iter()
            .filter(|s| s.kind == StatementKind::Rule)
            .filter_map(Statement::head)
            .map(generalize)
            .collect()
    }

    /// Predicates the program declares, states as facts, or calls
    pub fn mentioned(&self) -> BTreeSet<PredicateRef> {
        let mut mentioned = BTreeSet::new();
        for statement in &self.statements {
            match statement.kind {
                StatementKind::Directive => mentioned.extend(statement.declared()),
                StatementKind::Fact => mentioned.extend(statement.head().map(generalize)),
                StatementKind::Rule | StatementKind::Constraint => {
                    mentioned.extend(
                        statement
                            .body()
                            .into_iter()
                            .map(generalize)
                            .filter(is_program_predicate),
                    );
                }
                StatementKind::Query => {}
            }
        }
        mentioned
    }

    /// Mentioned predicates that no rule concludes
    pub fn inputs(&self) -> BTreeSet<PredicateRef> {
        let conclusions = self.conclusions();
        self.mentioned()
            .into_iter()
            .filter(|p| !conclusions.contains(p))
            .collect()
    }

    /// Program text without queries and without the rules and facts whose
    /// head is in `removed`
    pub fn without_clauses_for(&self, removed: &BTreeSet<PredicateRef>) -> String {
        let kept = self.statements.iter().filter(|s| match s.kind {
            StatementKind::Query => false,
            StatementKind::Rule | StatementKind::Fact => {
                s.head().map_or(true, |head| !removed.contains(&generalize(head)))
            }
            _ => true,
        });
        render(kept)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self.statements.iter()))
    }
}

fn render<'a>(statements: impl Iterator<Item = &'a Statement>) -> String {
    let mut text = String::new();
    for statement in statements {
        text.push_str(&statement.text);
        text.push_str(".\n");
    }
    text
}

fn is_program_predicate(predicate: &PredicateRef) -> bool {
    predicate.is_plain_atom() && !BUILTINS.contains(&predicate.name.as_str())
}

/// Walks text, tracking bracket depth and quoted atoms/strings
struct Scanner {
    depth: usize,
    quote: Option<char>,
    escaped: bool,
}

impl Scanner {
    fn new() -> Self {
        Self {
            depth: 0,
            quote: None,
            escaped: false,
        }
    }

    /// Feed one character; returns whether it sits at depth 0 outside quotes
    fn step(&mut self, c: char) -> bool {
        if let Some(q) = self.quote {
            if self.escaped {
                self.escaped = false;
            } else if c == '\\' {
                self.escaped = true;
            } else if c == q {
                self.quote = None;
            }
            return false;
        }
        match c {
            '\'' | '"' => {
                self.quote = Some(c);
                false
            }
            '(' | '[' | '{' => {
                self.depth += 1;
                false
            }
            ')' | ']' | '}' => {
                self.depth = self.depth.saturating_sub(1);
                false
            }
            _ => self.depth == 0,
        }
    }

    fn in_quote(&self) -> bool {
        self.quote.is_some()
    }
}

/// Byte offset of `pattern` at depth 0 outside quotes
fn find_top_level(text: &str, pattern: &str) -> Option<usize> {
    let mut scanner = Scanner::new();
    text.char_indices()
        .find(|&(i, c)| scanner.step(c) && text[i..].starts_with(pattern))
        .map(|(i, _)| i)
}

/// Split on any of `separators` at depth 0, dropping empty pieces
fn split_top_level<'a>(text: &'a str, separators: &[char]) -> Vec<&'a str> {
    let mut scanner = Scanner::new();
    let mut pieces = Vec::new();
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if scanner.step(c) && separators.contains(&c) {
            pieces.push(text[start..i].trim());
            start = i + c.len_utf8();
        }
    }
    pieces.push(text[start..].trim());
    pieces.retain(|p| !p.is_empty());
    pieces
}

/// Split source into statement texts.
///
/// A statement ends at a `.` at depth 0, outside quotes, followed by
/// whitespace, a comment or the end of input. `%` comments run to the end
/// of the line. Trailing text without a period is kept as a statement.
fn split_statements(source: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut scanner = Scanner::new();
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '%' && !scanner.in_quote() {
            while chars.next_if(|&n| n != '\n').is_some() {}
            continue;
        }
        let top_level = scanner.step(c);
        let ends_statement = chars.peek().map_or(true, |n| n.is_whitespace() || *n == '%');
        if top_level && c == '.' && ends_statement {
            push_statement(&mut statements, &mut current);
            continue;
        }
        current.push(c);
    }
    push_statement(&mut statements, &mut current);
    statements
}

fn push_statement(statements: &mut Vec<String>, current: &mut String) {
    let text = current.trim();
    if !text.is_empty() {
        statements.push(text.to_string());
    }
    current.clear();
}
