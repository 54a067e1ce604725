//! Runs the codec over fixture documents and checks it against `serde_json`.
//!
//! Files under an `invalid/` directory must be rejected by both parsers;
//! every other file must decode to the same value as `serde_json` and survive
//! a compact and a pretty re-encode unchanged.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail, ensure};
use colored::Colorize;
use serde_json::Value;

use json_si::Node;
use json_si::json::{decode, encode};

const DEFAULT_PATTERN: &str = "fixtures/**/*.json";

fn main() -> Result<()> {
    let pattern = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_PATTERN.to_owned());
    let files = collect(&pattern)?;

    let mut failed = 0usize;
    for path in &files {
        match check(path) {
            Ok(()) => println!("✅ {}", path.display()),
            Err(error) => {
                failed += 1;
                println!("❌ {}: {}", path.display(), format!("{error:#}").red());
            }
        }
    }

    let summary = format!("{} passed, {failed} failed", files.len() - failed);
    if failed > 0 {
        println!("{}", summary.red().bold());
        bail!("{failed} fixture(s) failed");
    }
    println!("{}", summary.green().bold());
    Ok(())
}

fn collect(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut files = glob::glob(pattern)
        .with_context(|| format!("invalid glob pattern: {pattern}"))?
        .collect::<Result<Vec<_>, _>>()?;
    files.sort();
    ensure!(!files.is_empty(), "no fixtures match {pattern}");
    Ok(files)
}

fn expects_rejection(path: &Path) -> bool {
    path.components().any(|part| part.as_os_str() == "invalid")
}

fn check(path: &Path) -> Result<()> {
    let text = std::fs::read_to_string(path).context("failed to read fixture")?;
    let ours = decode(&text);
    let oracle = serde_json::from_str::<Value>(&text);

    if expects_rejection(path) {
        return match (ours, oracle) {
            (Err(_), Err(_)) => Ok(()),
            (Ok(_), _) => Err(anyhow!("accepted malformed input")),
            (Err(_), Ok(_)) => Err(anyhow!("serde_json accepts this fixture")),
        };
    }

    let node = ours.context("rejected well-formed input")?;
    let oracle = oracle.context("serde_json rejects this fixture")?;
    let converted = Value::try_from(&node)?;
    ensure!(
        converted == oracle,
        "decoded value differs from serde_json:\n  ours:   {converted}\n  oracle: {oracle}"
    );

    for pretty in [false, true] {
        let again: Node = decode(&encode(&node, pretty)?)?;
        ensure!(again == node, "re-encode (pretty = {pretty}) changed the tree");
    }
    Ok(())
}
