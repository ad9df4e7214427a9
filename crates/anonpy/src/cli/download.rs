use std::path::{Path, PathBuf};

use anonpy_fetch::DownloadRequest;
use anonpy_fetch::core::{resource_from_url, sanitize_file_name};
use anonpy_verify::{Algorithm, VerificationError, verify_file};
use anyhow::{Context, Result, bail};
use clap::Args;
use console::style;

use crate::cli::Ctx;
use crate::ui::{confirm, print_diff, spinner};
use crate::utils::read_batch_file;

#[derive(Args, Clone, Debug)]
pub struct DownloadArgs {
    #[arg(
        short = 'u',
        long = "url",
        value_name = "URL",
        num_args = 1..,
        conflicts_with = "batch_file",
        required_unless_present = "batch_file",
        help = "One or more URLs or ids to download"
    )]
    pub resources: Vec<String>,

    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "File containing URLs to download, one per line"
    )]
    pub batch_file: Option<PathBuf>,

    #[arg(
        short,
        long,
        value_name = "DIR",
        help = "Download directory (configured directory by default)"
    )]
    pub path: Option<PathBuf>,

    #[arg(
        long,
        overrides_with = "no_check",
        help = "Ask before overwriting existing files (default)"
    )]
    pub check: bool,

    #[arg(long, overrides_with = "check", help = "Overwrite existing files without asking")]
    pub no_check: bool,

    #[arg(long, value_name = "HEX", help = "Expected checksum of every downloaded file")]
    pub checksum: Option<String>,

    #[arg(
        long,
        value_name = "ALG",
        default_value_t = Algorithm::Sha256,
        help = "Algorithm used with --checksum (sha256 by default, use md5 for MD5 checksums)"
    )]
    pub algorithm: Algorithm,
}

impl DownloadArgs {
    pub fn check(&self) -> bool { !self.no_check }
}

pub fn run(ctx: &Ctx, args: &DownloadArgs) -> Result<()> {
    let resources = match &args.batch_file {
        Some(batch) => read_batch_file(batch)?,
        None => args.resources.clone(),
    };
    let directory = args
        .path
        .clone()
        .unwrap_or_else(|| ctx.settings.download_directory.clone());

    let mut corrupt = Vec::new();
    for raw in &resources {
        let resource =
            resource_from_url(raw).with_context(|| format!("Not a resource URL or id: {raw}"))?;

        let status = spinner(ctx.settings.verbose, "fetching data...");
        let preview = ctx.client.preview(&resource);
        status.finish_and_clear();
        let preview = preview?;

        let name = sanitize_file_name(&preview.name).unwrap_or_else(|| resource.clone());
        let full_path = directory.join(&name);

        if args.check() && !ctx.settings.force && full_path.exists() {
            eprintln!(
                "{} The file {} already exists",
                style("WARNING:").yellow().bold(),
                style(full_path.display()).blue().bold()
            );
            if !confirm("Proceed with download? [Y/n] ")? {
                continue;
            }
        }

        let request = DownloadRequest::with_progress(&resource, &directory, preview.size, &name);
        let download = ctx.client.download(&request)?;
        println!("PATH={}", style(download.path.display()).blue().bold());

        let expected = match (&args.checksum, preview.hash_sha256()) {
            (Some(checksum), _) => Some((args.algorithm, checksum.as_str())),
            (None, Some(published)) => Some((Algorithm::Sha256, published)),
            (None, None) => None,
        };
        let Some((algorithm, expected)) = expected else {
            continue;
        };

        if !check_integrity(&download.path, algorithm, expected, ctx.settings.verbose)? {
            corrupt.push(download.path);
        }
    }

    if !corrupt.is_empty() {
        bail!("{} file(s) failed checksum verification", corrupt.len());
    }
    Ok(())
}

/// `false` when the digest differs from `expected`; the diff is printed.
fn check_integrity(
    path: &Path,
    algorithm: Algorithm,
    expected: &str,
    verbose: bool,
) -> Result<bool> {
    match verify_file(path, algorithm, expected) {
        Ok(actual) => {
            if verbose {
                println!("{}={}", algorithm.as_str().to_ascii_uppercase(), actual);
            }
            Ok(true)
        }
        Err(VerificationError::Mismatch { expected, actual }) => {
            tracing::warn!(path = %path.display(), %algorithm, "checksum mismatch");
            print_diff(&actual, &expected);
            Ok(false)
        }
        Err(VerificationError::InvalidDigest(digest)) => {
            let candidates = Algorithm::ALL
                .iter()
                .filter(|candidate| candidate.digest_length() * 2 == digest.len())
                .map(Algorithm::as_str)
                .collect::<Vec<_>>();
            if candidates.is_empty() {
                bail!("{digest} is not a valid {algorithm} checksum");
            }
            bail!(
                "{digest} is not a valid {algorithm} checksum; its length fits {}, \
                 select one with --algorithm",
                candidates.join(" or ")
            )
        }
        Err(e) => Err(e).with_context(|| format!("Failed to verify {}", path.display())),
    }
}
