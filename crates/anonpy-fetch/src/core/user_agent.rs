use sysinfo::System;

const RUST_VERSION: &str = env!("CARGO_PKG_RUST_VERSION");

/// Compose a descriptive `User-Agent`.
///
/// `<product>/<version> <os>/<os-version> rustc/<rust-version>`, followed by
/// `username/<name>` when `expose_username` is set. The latter leaks
/// personally identifying information and is reported as a security advisory.
pub fn build_user_agent(product: &str, version: &str, expose_username: bool) -> String {
    let os = System::name().unwrap_or_else(|| std::env::consts::OS.to_string());
    let os_version = System::os_version().unwrap_or_else(|| "unknown".to_string());

    let username = expose_username.then(|| {
        tracing::warn!(
            target: "anonpy::security",
            "potential leak of personally identifying information in user agent"
        );
        current_username()
    });

    compose_user_agent(product, version, &os, &os_version, username.as_deref())
}

fn compose_user_agent(
    product: &str,
    version: &str,
    os: &str,
    os_version: &str,
    username: Option<&str>,
) -> String {
    let rust_version = if RUST_VERSION.is_empty() { "unknown" } else { RUST_VERSION };
    let mut parts = vec![
        format!("{product}/{version}"),
        format!("{}/{}", token(os), token(os_version)),
        format!("rustc/{rust_version}"),
    ];

    if let Some(username) = username {
        parts.push(format!("username/{}", token(username)));
    }

    parts.join(" ")
}

fn current_username() -> String {
    let var = if cfg!(windows) { "USERNAME" } else { "USER" };
    std::env::var(var)
        .ok()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "N/A".to_string())
}

// product tokens cannot contain whitespace or slashes
fn token(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() || c == '/' { '-' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composes_all_parts() {
        let agent = compose_user_agent("anonpy", "0.1.0", "Arch Linux", "rolling", None);
        assert!(agent.starts_with("anonpy/0.1.0 Arch-Linux/rolling rustc/"));
        assert!(!agent.contains("username/"));
    }

    #[test]
    fn username_is_appended_last() {
        let agent = compose_user_agent("anonpy", "0.1.0", "Windows", "11", Some("jane doe"));
        assert!(agent.ends_with(" username/jane-doe"));
    }

    #[test]
    fn build_user_agent_has_three_tokens_by_default() {
        let agent = build_user_agent("anonpy", "0.1.0", false);
        assert_eq!(agent.split(' ').count(), 3);
        assert!(agent.starts_with("anonpy/0.1.0 "));
    }

    #[test]
    fn build_user_agent_with_username_has_four_tokens() {
        let agent = build_user_agent("anonpy", "0.1.0", true);
        assert_eq!(agent.split(' ').count(), 4);
    }
}
