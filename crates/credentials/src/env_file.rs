//! Minimal `.env`-style key/value parsing
//!
//! The secrets file is a flat list of `KEY=VALUE` lines. Blank lines and
//! `#` comments are skipped, an optional `export ` prefix is accepted,
//! and single or double quotes around a value are removed. No
//! interpolation or escaping is performed.

use std::collections::BTreeMap;

/// Parse the contents of a secrets file into a key/value map.
///
/// Later occurrences of a key override earlier ones.
#[must_use]
pub fn parse_env_file(content: &str) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        vars.insert(key.to_string(), unquote(value).to_string());
    }
    vars
}

fn unquote(value: &str) -> &str {
    let value = value.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_pairs() {
        let vars = parse_env_file("A=1\nB=two\n");
        assert_eq!(vars.get("A"), Some(&"1".to_string()));
        assert_eq!(vars.get("B"), Some(&"two".to_string()));
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let vars = parse_env_file("# comment\n\nA=1\n  # indented comment\n");
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn strips_export_prefix_and_quotes() {
        let vars = parse_env_file("export TOKEN=\"?sig=abc\"\nNAME='account'\n");
        assert_eq!(vars.get("TOKEN"), Some(&"?sig=abc".to_string()));
        assert_eq!(vars.get("NAME"), Some(&"account".to_string()));
    }

    #[test]
    fn value_may_contain_equals_signs() {
        let vars = parse_env_file("TOKEN=sv=2024&sig=abc\n");
        assert_eq!(vars.get("TOKEN"), Some(&"sv=2024&sig=abc".to_string()));
    }

    #[test]
    fn last_occurrence_wins() {
        let vars = parse_env_file("A=1\nA=2\n");
        assert_eq!(vars.get("A"), Some(&"2".to_string()));
    }

    #[test]
    fn lines_without_equals_are_ignored() {
        let vars = parse_env_file("not a pair\nA=1\n");
        assert_eq!(vars.len(), 1);
    }
}
