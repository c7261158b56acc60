//! Small utility helpers used across modules.

use crate::error::CoachError;

/// Strict string templating.
/// Replaces every `{key}` placeholder in the template with its bound value.
/// A placeholder without a binding fails with `MissingVariable`.
///
/// Substitution is single-pass: values are copied verbatim, so a value that
/// itself contains `{...}` is never expanded again. Braces that do not enclose
/// a plain identifier (letters, digits, `_`) are copied as-is.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> Result<String, CoachError> {
  let mut out = String::with_capacity(tpl.len());
  let mut rest = tpl;

  while let Some(open) = rest.find('{') {
    out.push_str(&rest[..open]);
    let after = &rest[open + 1..];
    match after.find('}') {
      Some(close) if is_placeholder_name(&after[..close]) => {
        let key = &after[..close];
        let value = pairs
          .iter()
          .find(|(k, _)| *k == key)
          .map(|(_, v)| *v)
          .ok_or_else(|| CoachError::MissingVariable(key.to_string()))?;
        out.push_str(value);
        rest = &after[close + 1..];
      }
      _ => {
        out.push('{');
        rest = after;
      }
    }
  }
  out.push_str(rest);
  Ok(out)
}

fn is_placeholder_name(s: &str) -> bool {
  !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Case-insensitive substring test.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
  haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with whole prompts or completions.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    s.to_string()
  } else {
    let head: String = s.chars().take(max).collect();
    format!("{}… ({} bytes total)", head, s.len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fills_all_placeholders() {
    let out = fill_template(
      "Standard {ccss} on \"{topic}\" for grade {grade}.",
      &[("ccss", "W.4.9"), ("topic", "baseball"), ("grade", "4")],
    )
    .unwrap();
    assert_eq!(out, "Standard W.4.9 on \"baseball\" for grade 4.");
  }

  #[test]
  fn unbound_placeholder_is_missing_variable() {
    let err = fill_template("Grade {grade}, topic {topic}", &[("grade", "4")]).unwrap_err();
    match err {
      CoachError::MissingVariable(name) => assert_eq!(name, "topic"),
      other => panic!("unexpected error: {other:?}"),
    }
  }

  #[test]
  fn values_are_not_expanded_twice() {
    let out = fill_template("Q: {question}", &[("question", "What is {topic}?")]).unwrap();
    assert_eq!(out, "Q: What is {topic}?");
  }

  #[test]
  fn non_identifier_braces_are_literal() {
    let out = fill_template("json {\"a\": 1} and {x}", &[("x", "y")]).unwrap();
    assert_eq!(out, "json {\"a\": 1} and y");
    assert_eq!(fill_template("open { only", &[]).unwrap(), "open { only");
  }

  #[test]
  fn contains_ci_ignores_case() {
    assert!(contains_ci("Total 85. QC Succeeded", "qc succeeded"));
    assert!(!contains_ci("qc failed", "qc succeeded"));
  }

  #[test]
  fn trunc_keeps_short_strings() {
    assert_eq!(trunc_for_log("abc", 10), "abc");
    assert!(trunc_for_log("abcdefghij", 3).starts_with("abc…"));
  }
}
