use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// URLs listed in a batch file, one per line. Blank lines and lines starting
/// with `#` are skipped.
pub fn read_batch_file(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read batch file {}", path.display()))?;
    Ok(parse_batch(&raw))
}

fn parse_batch(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_comments_and_blank_lines() {
        let raw = concat!(
            "# links\nhttps://pixeldrain.com/u/abc\n\n   \n",
            "#https://pixeldrain.com/u/old\ndef  \r\n"
        );
        assert_eq!(parse_batch(raw), vec!["https://pixeldrain.com/u/abc", "def"]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_batch_file(&dir.path().join("nope.txt")).is_err());
    }

    #[test]
    fn reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.txt");
        fs::write(&path, "a\nb\n").unwrap();
        assert_eq!(read_batch_file(&path).unwrap(), vec!["a", "b"]);
    }
}
