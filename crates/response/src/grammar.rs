//! Grammar for s(CASP) output in justification-tree mode
//!
//! ```text
//! output    := preamble ( no_models | answer+ )
//! preamble  := text up to the first ANSWER / "no models" line
//! answer    := "ANSWER:" number "(in" float "ms)"
//!              "JUSTIFICATION_TREE:" tree
//!              "MODEL:" "{" entry (",  " entry)* "}"
//!              [ "BINDINGS:" binding* ]
//! binding   := VAR "equal" VALUE      (one per line)
//! ```
//!
//! Section markers are only recognized at the start of a line (after any
//! tabs), so marker-like text inside atoms or tree lines never splits a
//! section.

use nom::{
    bytes::complete::{tag, take_while},
    character::complete::{digit1, line_ending, multispace0, space0},
    combinator::{eof, map_res, opt, recognize, value},
    multi::many1,
    number::complete::recognize_float,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};
use scasplens_common::errors::{Result, ScaspError};

pub const ANSWER_MARKER: &str = "ANSWER:";
pub const TREE_MARKER: &str = "JUSTIFICATION_TREE:";
pub const MODEL_MARKER: &str = "MODEL:";
pub const BINDINGS_MARKER: &str = "BINDINGS:";
pub const NO_MODELS_MARKER: &str = "no models";
pub const QUERY_LABEL: &str = "QUERY:";
pub const QUERY_PROMPT: &str = "?-";

/// Separator between model entries
const MODEL_SEPARATOR: &str = ",  ";

/// Binding separators, human mode first
const BINDING_SEPARATORS: [&str; 2] = [" equal ", " = "];

/// Solver output split into its preamble and body
#[derive(Debug)]
pub(crate) struct RawOutput<'a> {
    pub preamble: &'a str,
    pub body: RawBody<'a>,
}

#[derive(Debug)]
pub(crate) enum RawBody<'a> {
    NoModels,
    /// One segment per answer, each starting at its ANSWER line
    Answers(Vec<&'a str>),
}

/// The sections of one answer segment
#[derive(Debug)]
pub(crate) struct RawAnswer<'a> {
    pub number: usize,
    pub time_ms: f64,
    pub tree: &'a str,
    pub model: Vec<&'a str>,
    pub bindings: Option<Vec<(&'a str, &'a str)>>,
}

/// Offset of the first line whose text (after tabs) starts with a marker
fn find_marker_line(input: &str, markers: &[&str]) -> Option<usize> {
    let mut offset = 0;
    for line in input.split_inclusive('\n') {
        let content = line.trim_start_matches('\t');
        if markers.iter().any(|m| content.starts_with(m)) {
            return Some(offset);
        }
        offset += line.len();
    }
    None
}

/// Consume everything before the next marker line (or the whole input)
fn until_marker_line<'a>(
    markers: &'static [&'static str],
) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    move |input: &'a str| {
        let end = find_marker_line(input, markers).unwrap_or(input.len());
        Ok((&input[end..], &input[..end]))
    }
}

/// A section marker at the start of a line
fn marker<'a>(name: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    preceded(take_while(|c: char| c == '\t'), tag(name))
}

fn no_models(input: &str) -> IResult<&str, ()> {
    value((), tuple((multispace0, tag(NO_MODELS_MARKER), multispace0, eof)))(input)
}

fn answer_segment(input: &str) -> IResult<&str, &str> {
    recognize(pair(marker(ANSWER_MARKER), until_marker_line(&[ANSWER_MARKER])))(input)
}

fn answer_number(input: &str) -> IResult<&str, usize> {
    preceded(space0, map_res(digit1, |d: &str| d.parse::<usize>()))(input)
}

/// `(in 0.188 ms)`
fn timing(input: &str) -> IResult<&str, f64> {
    delimited(
        tuple((space0, tag("(in"), space0)),
        map_res(recognize_float, |f: &str| f.parse::<f64>()),
        tuple((space0, tag("ms)"))),
    )(input)
}

fn section_start<'a>(name: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    preceded(multispace0, marker(name))
}

/// Map a nom failure to a malformed-response error on `segment`
fn step<'a, O>(result: IResult<&'a str, O>, message: &str, segment: &str) -> Result<(&'a str, O)> {
    result.map_err(|_| ScaspError::malformed(message, segment))
}

/// Split raw output into preamble and answer segments
pub(crate) fn parse_output(input: &str) -> Result<RawOutput<'_>> {
    let (rest, preamble) = step(
        until_marker_line(&[ANSWER_MARKER, NO_MODELS_MARKER])(input),
        "unreadable preamble",
        input,
    )?;

    if rest.trim().is_empty() {
        return Err(ScaspError::malformed(
            "neither an ANSWER section nor 'no models' found",
            input,
        ));
    }

    if no_models(rest).is_ok() {
        return Ok(RawOutput {
            preamble,
            body: RawBody::NoModels,
        });
    }

    let (rest, segments) = step(many1(answer_segment)(rest), "expected an ANSWER section", rest)?;
    if !rest.trim().is_empty() {
        return Err(ScaspError::malformed("unexpected content after answers", rest));
    }

    Ok(RawOutput {
        preamble,
        body: RawBody::Answers(segments),
    })
}

/// Split one answer segment into its sections
pub(crate) fn parse_answer(segment: &str) -> Result<RawAnswer<'_>> {
    let (i, _) = step(marker(ANSWER_MARKER)(segment), "missing ANSWER marker", segment)?;
    let (i, number) = step(answer_number(i), "missing answer number", segment)?;
    let (i, time_ms) = step(timing(i), "unreadable answer timing", segment)?;

    let (i, _) = step(
        section_start(TREE_MARKER)(i),
        "missing JUSTIFICATION_TREE section",
        segment,
    )?;
    let (i, _) = step(
        opt(pair(space0, line_ending))(i),
        "unreadable JUSTIFICATION_TREE marker",
        segment,
    )?;
    let (i, tree) = step(
        until_marker_line(&[MODEL_MARKER])(i),
        "unreadable justification tree",
        segment,
    )?;

    let (i, _) = step(marker(MODEL_MARKER)(i), "missing MODEL section", segment)?;
    let (i, model_block) = step(
        until_marker_line(&[BINDINGS_MARKER])(i),
        "unreadable model",
        segment,
    )?;
    let model = model_entries(model_block, segment)?;

    let (i, bindings_marker) = step(
        opt(marker(BINDINGS_MARKER))(i),
        "unreadable BINDINGS marker",
        segment,
    )?;
    let bindings = match bindings_marker {
        Some(_) => Some(binding_lines(i, segment)?),
        None => None,
    };

    Ok(RawAnswer {
        number,
        time_ms,
        tree,
        model,
        bindings,
    })
}

/// `{ a,  b,  c }` to `[a, b, c]`
fn model_entries<'a>(block: &'a str, segment: &str) -> Result<Vec<&'a str>> {
    let inner = block
        .trim()
        .strip_prefix('{')
        .and_then(|b| b.strip_suffix('}'))
        .ok_or_else(|| ScaspError::malformed("model is not enclosed in braces", segment))?;

    Ok(inner
        .split(MODEL_SEPARATOR)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect())
}

/// `X equal socrates` lines to `(X, socrates)` pairs
fn binding_lines<'a>(block: &'a str, segment: &str) -> Result<Vec<(&'a str, &'a str)>> {
    block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            BINDING_SEPARATORS
                .iter()
                .find_map(|sep| line.split_once(sep))
                .map(|(var, val)| (var.trim(), val.trim()))
                .ok_or_else(|| {
                    ScaspError::malformed(format!("unreadable binding {:?}", line), segment)
                })
        })
        .collect()
}

/// Query text with the label and prompt removed and whitespace collapsed
pub(crate) fn clean_query(preamble: &str) -> String {
    let text = preamble.trim();
    let text = text.strip_prefix(QUERY_LABEL).unwrap_or(text).trim_start();
    let text = text.strip_prefix(QUERY_PROMPT).unwrap_or(text);
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANSWER: &str = "\tANSWER:\t1 (in 0.188 ms)\n\nJUSTIFICATION_TREE:\nmortal(socrates) :-\n    human(socrates).\nglobal_constraint.\n\nMODEL:\n{ mortal(socrates),  human(socrates) }\n\nBINDINGS:\nX equal socrates\n\n";

    #[test]
    fn test_answer_sections() {
        let answer = parse_answer(ANSWER).unwrap();
        assert_eq!(answer.number, 1);
        assert!((answer.time_ms - 0.188).abs() < 1e-9);
        assert_eq!(answer.tree.lines().next(), Some("mortal(socrates) :-"));
        assert!(!answer.tree.contains(MODEL_MARKER));
        assert_eq!(answer.model, vec!["mortal(socrates)", "human(socrates)"]);
        assert_eq!(answer.bindings, Some(vec![("X", "socrates")]));
    }

    #[test]
    fn test_bindings_are_optional() {
        let segment = "\tANSWER:\t2 (in 1.5e-2 ms)\n\nJUSTIFICATION_TREE:\nrain\n\nMODEL:\n{ rain }\n";
        let answer = parse_answer(segment).unwrap();
        assert_eq!(answer.number, 2);
        assert!((answer.time_ms - 0.015).abs() < 1e-12);
        assert_eq!(answer.model, vec!["rain"]);
        assert!(answer.bindings.is_none());
    }

    #[test]
    fn test_constraint_braces_inside_model() {
        let segment = "\tANSWER:\t1 (in 0.2 ms)\n\nJUSTIFICATION_TREE:\np\n\nMODEL:\n{ player(P | {P \\= 1}),  game(G) }\n";
        let answer = parse_answer(segment).unwrap();
        assert_eq!(answer.model, vec!["player(P | {P \\= 1})", "game(G)"]);
    }

    #[test]
    fn test_missing_model_is_malformed() {
        let segment = "\tANSWER:\t1 (in 0.2 ms)\n\nJUSTIFICATION_TREE:\np\n";
        match parse_answer(segment) {
            Err(ScaspError::MalformedResponse { message, segment: seg }) => {
                assert_eq!(message, "missing MODEL section");
                assert_eq!(seg, segment);
            }
            other => panic!("expected MalformedResponse, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_tree_is_malformed() {
        let segment = "\tANSWER:\t1 (in 0.2 ms)\n\nMODEL:\n{ p }\n";
        assert!(matches!(
            parse_answer(segment),
            Err(ScaspError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_bad_timing_is_malformed() {
        let segment = "\tANSWER:\t1 (in fast)\n\nJUSTIFICATION_TREE:\np\n\nMODEL:\n{ p }\n";
        match parse_answer(segment) {
            Err(ScaspError::MalformedResponse { message, .. }) => {
                assert_eq!(message, "unreadable answer timing");
            }
            other => panic!("expected MalformedResponse, got {other:?}"),
        }
    }

    #[test]
    fn test_marker_text_inside_tree_line_does_not_split() {
        let segment = "\tANSWER:\t1 (in 0.2 ms)\n\nJUSTIFICATION_TREE:\nnote(a)\n    says(MODEL: ignored)\n\nMODEL:\n{ note(a) }\n";
        let answer = parse_answer(segment).unwrap();
        assert!(answer.tree.contains("says(MODEL: ignored)"));
        assert_eq!(answer.model, vec!["note(a)"]);
    }

    #[test]
    fn test_output_segments() {
        let output = format!(
            "QUERY:?- mortal(X).\n\n{}{}",
            ANSWER,
            ANSWER.replace("1 (in", "2 (in")
        );
        let raw = parse_output(&output).unwrap();
        assert_eq!(raw.preamble, "QUERY:?- mortal(X).\n\n");
        match raw.body {
            RawBody::Answers(segments) => {
                assert_eq!(segments.len(), 2);
                assert!(segments[1].trim_start().starts_with("ANSWER:\t2"));
            }
            RawBody::NoModels => panic!("expected answers"),
        }
    }

    #[test]
    fn test_output_no_models() {
        let raw = parse_output("QUERY:?- winner_of_game(jason,game).\n\nno models\n\n").unwrap();
        assert!(matches!(raw.body, RawBody::NoModels));
        assert_eq!(clean_query(raw.preamble), "winner_of_game(jason,game).");
    }

    #[test]
    fn test_output_without_sections() {
        assert!(matches!(
            parse_output("QUERY:?- p.\n"),
            Err(ScaspError::MalformedResponse { .. })
        ));
        assert!(matches!(parse_output(""), Err(ScaspError::MalformedResponse { .. })));
    }

    #[test]
    fn test_clean_query_collapses_whitespace() {
        assert_eq!(
            clean_query("QUERY:I would like to know if\n     'mortal' holds (for socrates).\n\n"),
            "I would like to know if 'mortal' holds (for socrates)."
        );
    }
}
