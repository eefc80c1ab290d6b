use scasplens_common::ScaspError;
use scasplens_response::{parse_response, render_explanation, JustificationNode, Outcome};

const TWO_ANSWERS: &str = "\
QUERY:I would like to know if
     'winner_of_game' holds (for X, and testgame).

\tANSWER:\t1 (in 1.132 ms)

JUSTIFICATION_TREE:
winner_of_game(1,testgame) :-
    player(1),
    player_in_game(1,testgame),
    'abducible' holds (for player_in_game(1,testgame)).
    throw(1,rock),
    beats(rock,scissors) :-
        sign_beats_sign(rock,scissors).
The global constraints hold.
    global_constraint.

MODEL:
{ winner_of_game(1,testgame),  player(1),  player_in_game(1,testgame),  throw(1,rock),  beats(rock,scissors) }

BINDINGS:
X equal 1

\tANSWER:\t2 (in 0.51 ms)

JUSTIFICATION_TREE:
winner_of_game(2,testgame) :-
    player(2).

MODEL:
{ winner_of_game(2,testgame),  player(2) }

BINDINGS:
X equal 2

";

#[test]
fn test_two_answers() {
    let response = parse_response(TWO_ANSWERS, 2).unwrap();
    assert_eq!(
        response.query,
        "I would like to know if 'winner_of_game' holds (for X, and testgame)."
    );

    let answers = match &response.outcome {
        Outcome::Yes { answers } => answers,
        Outcome::No => panic!("expected answers"),
    };
    assert_eq!(answers.len(), 2);

    let first = &answers[0];
    assert_eq!(first.model.len(), 5);
    assert_eq!(first.bindings.as_ref().unwrap()[0].to_string(), "X: 1");
    assert_eq!(first.explanation.len(), 1);

    let root = &first.explanation[0];
    assert_eq!(root.text(), "winner_of_game(1,testgame) :-");
    let children: Vec<&str> = root.children().iter().map(JustificationNode::text).collect();
    assert_eq!(
        children,
        vec![
            "player(1),",
            "player_in_game(1,testgame),",
            "throw(1,rock),",
            "beats(rock,scissors) :-"
        ]
    );
    assert_eq!(root.children()[3].children()[0].text(), "sign_beats_sign(rock,scissors)");

    assert_eq!(answers[1].bindings.as_ref().unwrap()[0].value, "2");
}

#[test]
fn test_fewer_answers_than_requested() {
    let response = parse_response(TWO_ANSWERS, 5).unwrap();
    assert_eq!(response.answers().len(), 2);
}

#[test]
fn test_render_first_answer() {
    let response = parse_response(TWO_ANSWERS, 0).unwrap();
    let html = render_explanation(&response.answers()[1].explanation);
    assert_eq!(
        html,
        "<ul id=\"explanation\" class=\"active\"><li><span class=\"caret\">winner_of_game(2,testgame) :-</span><ul class=\"nested\"><li>player(2)</li></ul></li></ul>"
    );
}

#[test]
fn test_truncated_output_reports_segment() {
    let truncated = &TWO_ANSWERS[..TWO_ANSWERS.find("MODEL:").unwrap()];
    match parse_response(truncated, 1) {
        Err(err @ ScaspError::MalformedResponse { .. }) => {
            assert!(err.is_fatal());
            if let ScaspError::MalformedResponse { segment, .. } = err {
                assert!(segment.contains("ANSWER:\t1"));
            }
        }
        other => panic!("expected MalformedResponse, got {other:?}"),
    }
}

#[test]
fn test_garbage_is_malformed() {
    assert!(matches!(
        parse_response("swipl: command not found\n", 1),
        Err(ScaspError::MalformedResponse { .. })
    ));
}
