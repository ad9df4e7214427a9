use console::style;

/// Two-line diff of `actual` against `expected` with a caret line under the
/// positions that differ.
pub fn render_diff(actual: &str, expected: &str) -> String {
    let a: Vec<char> = actual.chars().collect();
    let b: Vec<char> = expected.chars().collect();
    let markers: String = (0..a.len().max(b.len()))
        .map(|i| if a.get(i) == b.get(i) { ' ' } else { '^' })
        .collect();

    format!("- {actual}\n+ {expected}\n? {}\n", markers.trim_end())
}

pub fn print_diff(actual: &str, expected: &str) {
    for line in render_diff(actual, expected).lines() {
        let styled = match line.as_bytes().first() {
            Some(b'-') => style(line).red(),
            Some(b'+') => style(line).green(),
            _ => style(line).yellow(),
        };
        eprintln!("{styled}");
    }
}
