use anyhow::{Context, Result};
use scasplens_common::config::AppConfig;
use scasplens_common::IndexNaming;
use scasplens_relevance::{RelevanceSearch, ScaspProcess};
use scasplens_response::{parse_response, render_explanation};
use std::path::Path;

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

pub fn parse(file: &Path, answers: usize) -> Result<()> {
    let raw = read(file)?;
    let response = parse_response(&raw, answers)
        .with_context(|| format!("failed to parse solver output in {}", file.display()))?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

pub async fn query(config: &AppConfig, program: &Path, answers: usize, html: bool) -> Result<()> {
    let source = read(program)?;
    let process = ScaspProcess::from_config(&config.reasoner);
    let response = scasplens_relevance::query(&process, &source, answers)
        .await
        .with_context(|| format!("failed to run {}", program.display()))?;

    if html {
        let explanation = response
            .answers()
            .first()
            .map(|answer| answer.explanation.as_slice())
            .unwrap_or_default();
        println!("{}", render_explanation(explanation));
    } else {
        println!("{}", serde_json::to_string_pretty(&response)?);
    }
    Ok(())
}

pub async fn relevant(
    config: &AppConfig,
    program: &Path,
    query: &str,
    facts: Option<&Path>,
    json: bool,
) -> Result<()> {
    let rules = read(program)?;
    let search = RelevanceSearch::new(ScaspProcess::from_config(&config.reasoner));

    let relevant = match facts {
        Some(path) => {
            let facts = read(path)?;
            search.relevant_inputs_with_facts(&rules, &facts, query).await
        }
        None => search.relevant_inputs(&rules, query).await,
    }
    .with_context(|| format!("relevance search for {} failed", query))?;

    let names: Vec<String> = relevant.iter().map(ToString::to_string).collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&names)?);
    } else {
        for name in names {
            println!("{}", name);
        }
    }
    Ok(())
}

pub fn index(path: &str, naming: IndexNaming) -> Result<()> {
    println!("{}", naming.apply_indices(path)?);
    Ok(())
}
