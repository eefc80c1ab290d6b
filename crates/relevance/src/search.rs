//! Relevance search
//!
//! Finds the input predicates a query's derivations depend on. Inputs and
//! the derived predicates already resolved are declared abducible, and the
//! solver is asked for one more answer at a time. Each new model names the
//! predicates that answer used: derived ones are resolved recursively,
//! inputs are collected.
//!
//! A predicate stops when the solver returns one answer fewer than asked
//! for. Any other count means the probe was unsound and aborts the search.

use crate::program::Program;
use crate::reasoner::{query, Reasoner};
use futures::future::BoxFuture;
use scasplens_common::errors::{Result, ScaspError};
use scasplens_common::metrics;
use scasplens_common::predicate::{declare_abducible, expand, generalize, PredicateRef};
use std::collections::BTreeSet;
use tracing::Instrument;
use uuid::Uuid;

/// Mutable state of one top-level search
#[derive(Debug)]
struct SearchState {
    program: Program,
    /// Predicates no rule concludes
    inputs: BTreeSet<PredicateRef>,
    /// Rule-head predicates
    derived: BTreeSet<PredicateRef>,
    /// Derived predicates whose dependencies are fully explored
    mapped: BTreeSet<PredicateRef>,
    /// Predicates being resolved further up the call chain
    deferred: BTreeSet<PredicateRef>,
    /// Inputs found so far
    relevant: BTreeSet<PredicateRef>,
    probes: usize,
}

impl SearchState {
    fn new(program: Program) -> Self {
        Self {
            inputs: program.inputs(),
            derived: program.conclusions(),
            program,
            mapped: BTreeSet::new(),
            deferred: BTreeSet::new(),
            relevant: BTreeSet::new(),
            probes: 0,
        }
    }

    /// Program asking for `predicate` with inputs and mapped predicates
    /// abducible and the clauses of mapped predicates removed
    fn probe(&self, predicate: &PredicateRef) -> String {
        let mut text = self.program.without_clauses_for(&self.mapped);
        let abducible: BTreeSet<&PredicateRef> = self.mapped.iter().chain(&self.inputs).collect();
        for p in abducible {
            text.push_str(&declare_abducible(p));
            text.push('\n');
        }
        text.push_str(&format!("?- {}.\n", expand(predicate)));
        text
    }
}

/// Relevance search over one solver
pub struct RelevanceSearch<R> {
    reasoner: R,
}

impl<R: Reasoner> RelevanceSearch<R> {
    pub fn new(reasoner: R) -> Self {
        Self { reasoner }
    }

    pub fn reasoner(&self) -> &R {
        &self.reasoner
    }

    /// Input predicates that `query` depends on in `base_code`
    pub async fn relevant_inputs(
        &self,
        base_code: &str,
        query: &str,
    ) -> Result<BTreeSet<PredicateRef>> {
        let target = generalize(query);
        if !target.is_plain_atom() {
            return Err(ScaspError::InvalidPredicate {
                input: query.to_string(),
            });
        }

        let span = tracing::info_span!(
            "relevance_search",
            search_id = %Uuid::new_v4(),
            query = %target,
            solver = self.reasoner.name(),
        );

        async move {
            let mut state = SearchState::new(Program::parse(base_code));
            tracing::info!(
                inputs = state.inputs.len(),
                derived = state.derived.len(),
                "Starting relevance search"
            );

            let outcome = self.resolve(&target, &mut state).await;
            metrics::record_search(state.probes, outcome.is_ok());

            match outcome {
                Ok(()) => {
                    tracing::info!(
                        probes = state.probes,
                        relevant = state.relevant.len(),
                        "Relevance search complete"
                    );
                    Ok(state.relevant)
                }
                Err(e) => {
                    tracing::error!(probes = state.probes, error = %e, "Relevance search failed");
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// `relevant_inputs` over `base_code` with extra fact text appended
    pub async fn relevant_inputs_with_facts(
        &self,
        base_code: &str,
        facts: &str,
        query: &str,
    ) -> Result<BTreeSet<PredicateRef>> {
        let code = format!("{}\n{}\n", base_code.trim_end(), facts);
        self.relevant_inputs(&code, query).await
    }

    fn resolve<'a>(
        &'a self,
        predicate: &'a PredicateRef,
        state: &'a mut SearchState,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let mut expected = 1;
            loop {
                let probe = state.probe(predicate);
                state.probes += 1;

                let response = query(&self.reasoner, &probe, expected).await?;
                let returned = response.answers().len();
                tracing::debug!(
                    predicate = %predicate,
                    expected = expected,
                    returned = returned,
                    "Probe answered"
                );

                if returned + 1 == expected {
                    return Ok(());
                }
                if returned != expected {
                    return Err(ScaspError::UnexpectedAnswerCount {
                        predicate: predicate.to_string(),
                        expected,
                        returned,
                    });
                }

                // Arity comes from the undecoded literals.
                let used: BTreeSet<PredicateRef> = response.answers()[expected - 1]
                    .raw_model
                    .iter()
                    .map(|literal| generalize(literal))
                    .collect();

                for found in used {
                    if state.derived.contains(&found) {
                        if found == *predicate
                            || state.mapped.contains(&found)
                            || state.deferred.contains(&found)
                        {
                            continue;
                        }
                        state.deferred.insert(predicate.clone());
                        let outcome = self.resolve(&found, state).await;
                        state.deferred.remove(predicate);
                        outcome?;
                        state.mapped.insert(found);
                    } else if state.inputs.contains(&found)
                        && state.relevant.insert(found.clone())
                    {
                        tracing::debug!(input = %found, via = %predicate, "Relevant input found");
                    }
                }

                expected += 1;
            }
        })
    }
}
