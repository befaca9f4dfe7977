/// Heading that introduces the vulnerability list in a review completion
pub const VULNERABILITIES_MARKER: &str = "# Vulnerabilities:";

/// Pull the vulnerability list out of a completion.
///
/// Everything after the first marker is split into lines, list markers and
/// whitespace are stripped, and blank lines dropped. No marker, no findings.
pub fn extract_vulnerabilities(completion: &str) -> Vec<String> {
    let Some((_, tail)) = completion.split_once(VULNERABILITIES_MARKER) else {
        return Vec::new();
    };

    tail.lines()
        .map(strip_list_marker)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Text before the marker, or all of it when there is none
pub fn source_section(completion: &str) -> &str {
    completion
        .split_once(VULNERABILITIES_MARKER)
        .map(|(head, _)| head)
        .unwrap_or(completion)
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();

    // "- foo" and "* foo", but not "**bold**"
    let mut chars = line.chars();
    if let Some('-' | '*' | '+' | '•') = chars.next() {
        let rest = chars.as_str();
        if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            return rest.trim();
        }
    }

    // "1. foo" and "2) foo", but not "1.5 MB"
    let after_digits = line.trim_start_matches(|c: char| c.is_ascii_digit());
    if after_digits.len() < line.len() {
        let rest = after_digits
            .strip_prefix('.')
            .or_else(|| after_digits.strip_prefix(')'));
        if let Some(rest) = rest {
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                return rest.trim();
            }
        }
    }

    line.trim()
}
