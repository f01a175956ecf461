use regex::Regex;
use std::sync::LazyLock;

use crate::domain::model::ClassNames;

static NAME_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"['"]?(\d+)['"]?\s*:\s*(?:'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)")"#)
        .expect("class-name entry regex is valid")
});

/// Parses the `names` custom metadata entry written by Ultralytics ONNX exports.
///
/// The value is a Python dict literal, e.g. `{0: 'person', 1: "tv's remote"}`.
/// JSON objects with quoted keys are accepted as well. Returns an empty table when
/// nothing matches.
pub fn parse_class_names(raw: &str) -> ClassNames {
    NAME_ENTRY
        .captures_iter(raw)
        .filter_map(|caps| {
            let id = caps.get(1)?.as_str().parse::<usize>().ok()?;
            let name = caps.get(2).or_else(|| caps.get(3))?.as_str();
            Some((id, unescape(name)))
        })
        .collect()
}

fn unescape(s: &str) -> String {
    s.replace("\\'", "'").replace("\\\"", "\"").replace("\\\\", "\\")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_python_dict_literal() {
        let names = parse_class_names("{0: 'person', 1: 'bicycle', 2: 'car'}");
        assert_eq!(names.len(), 3);
        assert_eq!(names[&0], "person");
        assert_eq!(names[&2], "car");
    }

    #[test]
    fn handles_mixed_quotes_and_commas() {
        let names = parse_class_names(r#"{0: "tv's remote", 1: 'a, b', 2: 'it\'s'}"#);
        assert_eq!(names[&0], "tv's remote");
        assert_eq!(names[&1], "a, b");
        assert_eq!(names[&2], "it's");
    }

    #[test]
    fn parses_json_object() {
        let names = parse_class_names(r#"{"0": "Persona X", "1": "Persona Y"}"#);
        assert_eq!(names[&1], "Persona Y");
    }

    #[test]
    fn garbage_gives_empty_table() {
        assert!(parse_class_names("not a dict").is_empty());
        assert!(parse_class_names("").is_empty());
    }
}
