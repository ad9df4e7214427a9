use anyhow::{Context, Result};
use console::Term;

/// Interpret a short English answer to a yes/no question. An empty answer
/// means yes.
pub fn str2bool(answer: &str) -> bool {
    matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "yes" | "y" | "true" | "t" | "1" | "on" | ""
    )
}

pub fn confirm(question: &str) -> Result<bool> {
    let term = Term::stderr();
    term.write_str(question).context("Failed to write prompt")?;
    let answer = term.read_line().context("Failed to read answer")?;
    Ok(str2bool(&answer))
}
