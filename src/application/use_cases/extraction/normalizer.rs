use once_cell::sync::Lazy;
use regex::Regex;

/// A line holding nothing but a code fence: an opening marker (optionally
/// tagged `json`) or a bare closing marker. Padding is any whitespace
/// except the line break, so it agrees with `str::trim`.
static FENCE_LINE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^[^\S\n]*```[^\S\n]*(?:json)?[^\S\n]*$").unwrap());

/// Isolates the candidate JSON document inside a model response.
///
/// Fence lines are dropped, the rest is trimmed, and the result is cut down to
/// the span from the first `{` to the last `}` when such a span exists.
/// Text without a usable brace pair comes back trimmed but otherwise intact.
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let unfenced = FENCE_LINE_PATTERN.replace_all(raw, "");
    let trimmed = unfenced.trim();

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if end > start => trimmed[start..=end].to_string(),
        _ => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_json_fence() {
        let input = "```json\n{\"TestCases\": []}\n```";
        assert_eq!(normalize(input), "{\"TestCases\": []}");
    }

    #[test]
    fn test_strips_fence_case_and_whitespace_tolerant() {
        let input = "  ```JSON  \r\n{\"a\": 1}\r\n   ```   \r\n";
        assert_eq!(normalize(input), "{\"a\": 1}");
    }

    #[test]
    fn test_trims_surrounding_prose() {
        let input = "Here are your test cases:\n{\"a\": {\"b\": 2}}\nLet me know if you need more.";
        assert_eq!(normalize(input), "{\"a\": {\"b\": 2}}");
    }

    #[test]
    fn test_keeps_inner_fence_free_content() {
        let input = "{\"note\": \"use ``` for code\"}";
        assert_eq!(normalize(input), input);
    }

    #[test]
    fn test_without_braces_returns_trimmed_text() {
        assert_eq!(normalize("  ```\nno json here\n```  "), "no json here");
    }

    #[test]
    fn test_reversed_braces_return_trimmed_text() {
        assert_eq!(normalize(" } oops { "), "} oops {");
    }

    #[test]
    fn test_truncated_document_keeps_last_closing_brace() {
        let input = "```json\n{\"TestCases\":[{\"TestCaseID\":\"a\"},{\"TestCaseID\":\"b\",\"TestSte";
        assert_eq!(normalize(input), "{\"TestCases\":[{\"TestCaseID\":\"a\"}");
    }

    #[test]
    fn test_unicode_padding_around_fence() {
        assert_eq!(normalize("\u{2003}```\nabc"), "abc");
        assert_eq!(normalize("\u{a0}```json\u{a0}\n{\"a\": 1}\n```\u{3000}"), "{\"a\": 1}");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\t"), "");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "",
            "plain text",
            "```json\n{\"a\": 1}\n```",
            "prefix {\"a\": [1, 2]} suffix",
            "{\n```\n\"a\": 1\n}",
            "} {",
            "```\n```json\n  {x}  \n```\n",
            "\u{feff}  {\"ünïcödé\": \"✓\"}  trailing",
            "\u{2003}```\nabc",
            "\u{a0}```json\u{a0}\r\nabc\n\u{2003}```",
            "\u{2003}\n```\u{85}",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {:?}", input);
        }
    }
}
