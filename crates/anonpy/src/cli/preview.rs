use anonpy_fetch::PreviewResult;
use anonpy_fetch::core::resource_from_url;
use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use crate::cli::Ctx;
use crate::ui::spinner;

#[derive(Args, Clone, Debug)]
pub struct PreviewArgs {
    #[arg(
        short = 'u',
        long = "url",
        value_name = "URL",
        num_args = 1..,
        required = true,
        help = "One or more URLs or ids to preview"
    )]
    pub resources: Vec<String>,
}

pub fn run(ctx: &Ctx, args: &PreviewArgs) -> Result<()> {
    for raw in &args.resources {
        let resource =
            resource_from_url(raw).with_context(|| format!("Not a resource URL or id: {raw}"))?;

        let status = spinner(ctx.settings.verbose, "fetching data...");
        let preview = ctx.client.preview(&resource);
        status.finish_and_clear();

        println!("{}", render(&preview?, ctx.settings.verbose)?);
    }
    Ok(())
}

/// Pretty JSON, or the bare values separated by commas.
pub fn render(preview: &PreviewResult, verbose: bool) -> Result<String> {
    if verbose {
        return serde_json::to_string_pretty(&preview.fields).context("Failed to render preview");
    }

    let values: Vec<String> = preview
        .fields
        .values()
        .map(|value| match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
        .collect();
    Ok(values.join(","))
}
