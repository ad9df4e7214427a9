use std::path::PathBuf;

use anonpy_verify::{Algorithm, digest_file};
use anyhow::{Context, Result};
use clap::Args;
use console::style;

use crate::cli::Ctx;

#[derive(Args, Clone, Debug)]
pub struct UploadArgs {
    #[arg(
        short = 'f',
        long = "file",
        value_name = "FILE",
        num_args = 1..,
        required = true,
        help = "One or more files to upload"
    )]
    pub files: Vec<PathBuf>,
}

pub fn run(ctx: &Ctx, args: &UploadArgs) -> Result<()> {
    for file in &args.files {
        let upload = ctx.client.upload(file, ctx.settings.verbose)?;
        println!("URL={}", upload.url);

        if !ctx.settings.verbose {
            continue;
        }
        let checksum = digest_file(file, Algorithm::Sha256)
            .with_context(|| format!("Failed to hash {}", file.display()))?;
        println!("SHA256={}", style(checksum).bold().blue());
    }
    Ok(())
}
