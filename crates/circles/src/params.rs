use anyhow::{Context, Result};
use serde::Serialize;
use tuning::{Bounds, ConsoleSession, Demo, Value, ValueKind};

use crate::cli::RunArgs;
use crate::run::{build_session, load_config};

#[derive(Debug, Serialize)]
struct ParamsReport<'a> {
    demo: Demo,
    params: Vec<ParamEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct ParamEntry<'a> {
    name: &'a str,
    kind: ValueKind,
    value: &'a Value,
    default: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    bounds: Option<Bounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uniform: Option<&'a str>,
}

/// Resolves the session exactly as a launch would and prints its parameters.
pub fn print_params(args: &RunArgs, json: bool) -> Result<()> {
    let config = load_config(args)?;
    let session = build_session(args, config.as_ref())?;
    if json {
        let rendered = serde_json::to_string_pretty(&report(&session))
            .context("failed to serialise parameters")?;
        println!("{rendered}");
    } else {
        println!("demo: {}", session.demo());
        for line in session.registry().summary() {
            println!("  {line}");
        }
    }
    Ok(())
}

fn report(session: &ConsoleSession) -> ParamsReport<'_> {
    ParamsReport {
        demo: session.demo(),
        params: session
            .registry()
            .entries()
            .map(|(spec, value)| ParamEntry {
                name: spec.name(),
                kind: spec.kind(),
                value,
                default: spec.default_value(),
                bounds: spec.bounds_range(),
                uniform: spec.uniform_name(),
            })
            .collect(),
    }
}
