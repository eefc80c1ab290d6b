//! scasplens Response Library
//!
//! Structured view of one s(CASP) run in justification-tree mode:
//! - `parse_response`: raw solver output to a `Response`
//! - `tree`: indentation-based justification forest
//! - `render`: HTML list rendering of a forest
//!
//! Escaped values (`daSCASP_...` atoms) are decoded field by field after
//! the output has been split into sections.

mod grammar;
pub mod render;
pub mod tree;

use scasplens_common::errors::{Result, ScaspError};
use scasplens_common::escape::decode_output;
use scasplens_common::metrics;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub use grammar::{
    ANSWER_MARKER, BINDINGS_MARKER, MODEL_MARKER, NO_MODELS_MARKER, TREE_MARKER,
};
pub use render::render_explanation;
pub use tree::{build_forest, parse_tree, tree_lines, JustificationNode, TreeLine};

/// One solver run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// The query as the solver echoed it, whitespace collapsed
    pub query: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Whether the query succeeded, with its answers when it did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Outcome {
    /// At least one answer, in the order the solver printed them
    Yes { answers: Vec<Answer> },
    No,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    #[serde(rename = "time_ms", with = "duration_ms")]
    pub time: Duration,
    /// Model literals in emission order, escaped values decoded
    pub model: Vec<String>,
    /// Model literals as the solver printed them. Decoded values may carry
    /// commas or parentheses, so arity is read from these.
    #[serde(default, skip_serializing)]
    pub raw_model: Vec<String>,
    /// `None` when the solver printed no BINDINGS section
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bindings: Option<Vec<Binding>>,
    pub explanation: Vec<JustificationNode>,
}

/// A query variable and the value it was bound to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub variable: String,
    pub value: String,
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.variable, self.value)
    }
}

impl Response {
    pub fn is_yes(&self) -> bool {
        matches!(self.outcome, Outcome::Yes { .. })
    }

    /// Answers in solver order; empty for `No`
    pub fn answers(&self) -> &[Answer] {
        match &self.outcome {
            Outcome::Yes { answers } => answers,
            Outcome::No => &[],
        }
    }
}

/// Parse the output of one solver run that was asked for `requested`
/// answers (0 = all).
///
/// A solver that stops early returns fewer answers than requested; that is
/// not an error. Answer counting is left to the caller.
pub fn parse_response(raw: &str, requested: usize) -> Result<Response> {
    match parse_sections(raw, requested) {
        Ok(response) => {
            let label = if response.is_yes() { "yes" } else { "no" };
            metrics::record_response(label, response.answers().len());
            tracing::debug!(
                query = %response.query,
                result = label,
                answers = response.answers().len(),
                requested = requested,
                "Parsed solver response"
            );
            Ok(response)
        }
        Err(e) => {
            metrics::record_response("malformed", 0);
            tracing::warn!(error = %e, "Failed to parse solver response");
            Err(e)
        }
    }
}

fn parse_sections(raw: &str, requested: usize) -> Result<Response> {
    let output = grammar::parse_output(raw)?;
    let query = decode_output(&grammar::clean_query(output.preamble));

    let segments = match output.body {
        grammar::RawBody::NoModels => {
            return Ok(Response {
                query,
                outcome: Outcome::No,
            })
        }
        grammar::RawBody::Answers(segments) => segments,
    };

    if requested > 0 && segments.len() > requested {
        tracing::warn!(
            requested = requested,
            returned = segments.len(),
            "Solver returned more answers than requested"
        );
    }

    let answers = segments
        .into_iter()
        .enumerate()
        .map(|(index, segment)| parse_answer(index + 1, segment))
        .collect::<Result<Vec<_>>>()?;

    Ok(Response {
        query,
        outcome: Outcome::Yes { answers },
    })
}

fn parse_answer(position: usize, segment: &str) -> Result<Answer> {
    let raw = grammar::parse_answer(segment)?;
    if raw.number != position {
        return Err(ScaspError::malformed(
            format!("answer {} found where answer {} was expected", raw.number, position),
            segment,
        ));
    }

    let time = Duration::try_from_secs_f64(raw.time_ms / 1000.0)
        .map_err(|_| ScaspError::malformed("answer timing out of range", segment))?;

    let mut raw_model: Vec<String> = Vec::with_capacity(raw.model.len());
    for entry in raw.model {
        if !raw_model.iter().any(|seen| seen.as_str() == entry) {
            raw_model.push(entry.to_string());
        }
    }
    let model = raw_model.iter().map(|entry| decode_output(entry)).collect();

    let bindings = raw.bindings.map(|pairs| {
        pairs
            .into_iter()
            .map(|(variable, value)| Binding {
                variable: variable.to_string(),
                value: decode_output(value),
            })
            .collect()
    });

    let lines = tree_lines(raw.tree.lines()).into_iter().map(|line| TreeLine {
        depth: line.depth,
        text: decode_output(&line.text),
    });

    Ok(Answer {
        time,
        model,
        raw_model,
        bindings,
        explanation: build_forest(lines),
    })
}

/// `Duration` as fractional milliseconds, the unit the solver prints
mod duration_ms {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(time: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(time.as_secs_f64() * 1000.0)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let ms = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(ms / 1000.0).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scasplens_common::escape::encode_value;

    const MORTAL: &str = "QUERY:?- mortal(socrates).\n\n\tANSWER:\t1 (in 0.25 ms)\n\nJUSTIFICATION_TREE:\nmortal(socrates) :-\n    human(socrates).\nThe global constraints hold.\n\nMODEL:\n{ mortal(socrates),  human(socrates) }\n\n";

    #[test]
    fn test_mortal_socrates() {
        let response = parse_response(MORTAL, 1).unwrap();
        assert_eq!(response.query, "mortal(socrates).");
        assert!(response.is_yes());

        let answers = response.answers();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].model, vec!["mortal(socrates)", "human(socrates)"]);
        assert!((answers[0].time.as_secs_f64() - 0.00025).abs() < 1e-9);
        assert!(answers[0].bindings.is_none());
        assert_eq!(
            answers[0].explanation,
            vec![JustificationNode::internal(
                "mortal(socrates) :-",
                vec![JustificationNode::leaf("human(socrates)")]
            )]
        );
    }

    #[test]
    fn test_no_models() {
        let response =
            parse_response("QUERY:?- winner_of_game(jason,game).\n\nno models\n\n", 1).unwrap();
        assert_eq!(response.query, "winner_of_game(jason,game).");
        assert_eq!(response.outcome, Outcome::No);
        assert!(response.answers().is_empty());

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"query": "winner_of_game(jason,game).", "result": "no"})
        );
    }

    #[test]
    fn test_bindings_and_escaped_values() {
        let name = encode_value("Jason Morris");
        let raw = format!(
            "QUERY:?- lawyer(X).\n\n\tANSWER:\t1 (in 1.0 ms)\n\nJUSTIFICATION_TREE:\nlawyer({name}).\n\nMODEL:\n{{ lawyer({name}) }}\n\nBINDINGS:\nX equal {name}\n\n"
        );
        let response = parse_response(&raw, 0).unwrap();
        let answer = &response.answers()[0];
        assert_eq!(answer.model, vec!["lawyer(Jason Morris)"]);
        assert_eq!(answer.raw_model, vec![format!("lawyer({name})")]);
        assert_eq!(answer.explanation, vec![JustificationNode::leaf("lawyer(Jason Morris)")]);

        let bindings = answer.bindings.as_ref().unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].to_string(), "X: Jason Morris");
    }

    #[test]
    fn test_answers_out_of_order_are_malformed() {
        let raw = MORTAL.replace("1 (in", "2 (in");
        assert!(matches!(
            parse_response(&raw, 1),
            Err(ScaspError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_serialized_answer_shape() {
        let response = parse_response(MORTAL, 1).unwrap();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["result"], "yes");
        let time_ms = json["answers"][0]["time_ms"].as_f64().unwrap();
        assert!((time_ms - 0.25).abs() < 1e-6);
        assert!(json["answers"][0].get("bindings").is_none());
        assert!(json["answers"][0].get("raw_model").is_none());
        assert_eq!(json["answers"][0]["explanation"][0]["kind"], "internal");

        let back: Response = serde_json::from_value(json).unwrap();
        assert_eq!(back.query, response.query);
        assert_eq!(back.answers()[0].model, response.answers()[0].model);
        assert_eq!(back.answers()[0].explanation, response.answers()[0].explanation);
    }
}
