use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::cli::download::DownloadArgs;
use crate::cli::preview::PreviewArgs;
use crate::cli::upload::UploadArgs;

#[derive(Clone, Debug, Parser)]
#[command(
    name = "anonpy",
    version = env!("CARGO_PKG_VERSION"),
    about = "Command line interface for anonymous file sharing",
    long_about = None,
    propagate_version = true
)]
pub struct App {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub cmd: Option<Commands>,
}

#[derive(Clone, Debug, Default, Args)]
pub struct GlobalArgs {
    #[arg(short, long, help = "Log request history to the log file")]
    pub logging: bool,

    #[arg(short, long, help = "Set API token")]
    pub token: Option<String>,

    #[arg(short, long, help = "Set custom user agent")]
    pub user_agent: Option<String>,

    #[arg(short, long, help = "Set HTTP/HTTPS proxies, either one URL or scheme=url pairs")]
    pub proxies: Option<String>,

    #[arg(short, long, value_name = "PATH", help = "Use another configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Overwrite the configuration file with defaults and exit")]
    pub reset_config: bool,

    #[arg(short, long, help = "Suppress progress bars and extra output")]
    pub quiet: bool,

    #[arg(short, long, help = "Overwrite existing files without asking")]
    pub force: bool,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "up", name = "upload", about = "Upload one or more files")]
    Upload(UploadArgs),
    #[command(alias = "p", name = "preview", about = "Read metadata of remote files")]
    Preview(PreviewArgs),
    #[command(alias = "dl", name = "download", about = "Download one or more files")]
    Download(DownloadArgs),
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_is_well_formed() { App::command().debug_assert(); }

    #[test]
    fn global_flags_before_subcommand() {
        let app = App::try_parse_from([
            "anonpy", "-l", "-q", "-t", "secret", "-p", "http://proxy:3128",
            "upload", "-f", "a.txt", "b.txt",
        ])
        .unwrap();

        assert!(app.global.logging);
        assert!(app.global.quiet);
        assert_eq!(app.global.token.as_deref(), Some("secret"));
        assert_eq!(app.global.proxies.as_deref(), Some("http://proxy:3128"));
        let Some(Commands::Upload(upload)) = app.cmd else {
            panic!("expected upload");
        };
        assert_eq!(upload.files, vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]);
    }

    #[test]
    fn reset_config_needs_no_subcommand() {
        let app = App::try_parse_from(["anonpy", "--reset-config"]).unwrap();
        assert!(app.global.reset_config);
        assert!(app.cmd.is_none());
    }

    #[test]
    fn download_takes_urls_or_batch_file() {
        let app =
            App::try_parse_from(["anonpy", "download", "-u", "abc", "def", "-p", "/tmp"]).unwrap();
        let Some(Commands::Download(download)) = app.cmd else {
            panic!("expected download");
        };
        assert_eq!(download.resources, vec!["abc", "def"]);
        assert_eq!(download.path, Some(PathBuf::from("/tmp")));
        assert!(download.check());
        assert_eq!(download.algorithm, anonpy_verify::Algorithm::Sha256);

        let app =
            App::try_parse_from(["anonpy", "download", "-b", "urls.txt", "--no-check"]).unwrap();
        let Some(Commands::Download(download)) = app.cmd else {
            panic!("expected download");
        };
        assert_eq!(download.batch_file, Some(PathBuf::from("urls.txt")));
        assert!(!download.check());

        assert!(App::try_parse_from(["anonpy", "download"]).is_err());
        assert!(App::try_parse_from(["anonpy", "download", "-u", "a", "-b", "urls.txt"]).is_err());
    }

    #[test]
    fn algorithm_is_parsed() {
        let app = App::try_parse_from([
            "anonpy", "download", "-u", "abc", "--checksum", "00ff", "--algorithm", "sha3-256",
        ])
        .unwrap();
        let Some(Commands::Download(download)) = app.cmd else {
            panic!("expected download");
        };
        assert_eq!(download.algorithm, anonpy_verify::Algorithm::Sha3_256);
        assert_eq!(download.checksum.as_deref(), Some("00ff"));
    }
}
