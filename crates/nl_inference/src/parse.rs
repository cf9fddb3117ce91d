//! Parsing for the scorer's JSON-in-prose replies. Models are asked for bare
//! JSON but routinely wrap it in chatter, so the first `{...}` substring is
//! fished out and anything unusable maps to `None` for the caller to handle.

/// Fallback score used whenever the model's verdict is unusable.
pub const DEFAULT_SCORE: i64 = 5;

const DEFAULT_REASONING: &str = "Relevant to your interests";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelevanceVerdict {
    pub score: i64,
    pub reasoning: String,
}

/// The first `{...}` substring of `text`, if any.
pub fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = start + text[start..].find('}')?;
    Some(&text[start..=end])
}

/// Parse a relevance verdict out of free-form model output. Missing fields
/// fall back individually; scores are clamped to the 1-10 scale. `None`
/// means no parseable JSON was found at all.
pub fn parse_relevance(text: &str) -> Option<RelevanceVerdict> {
    let raw = first_json_object(text)?;
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    let score = value
        .get("score")
        .and_then(serde_json::Value::as_i64)
        .unwrap_or(DEFAULT_SCORE)
        .clamp(1, 10);
    let reasoning = value
        .get("reasoning")
        .and_then(serde_json::Value::as_str)
        .unwrap_or(DEFAULT_REASONING)
        .to_string();
    Some(RelevanceVerdict { score, reasoning })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_json_object() {
        assert_eq!(
            first_json_object("Sure! {\"score\": 8} Hope that helps."),
            Some("{\"score\": 8}")
        );
        assert_eq!(first_json_object("no json here"), None);
        assert_eq!(first_json_object("{unclosed"), None);
    }

    #[test]
    fn test_parse_full_verdict() {
        let verdict =
            parse_relevance(r#"{"score": 9, "reasoning": "Directly about your topic"}"#).unwrap();
        assert_eq!(verdict.score, 9);
        assert_eq!(verdict.reasoning, "Directly about your topic");
    }

    #[test]
    fn test_missing_fields_fall_back() {
        let verdict = parse_relevance(r#"{"reasoning": "ok"}"#).unwrap();
        assert_eq!(verdict.score, DEFAULT_SCORE);

        let verdict = parse_relevance(r#"{"score": 3}"#).unwrap();
        assert_eq!(verdict.reasoning, DEFAULT_REASONING);
    }

    #[test]
    fn test_out_of_range_scores_clamped() {
        assert_eq!(parse_relevance(r#"{"score": 42}"#).unwrap().score, 10);
        assert_eq!(parse_relevance(r#"{"score": 0}"#).unwrap().score, 1);
        assert_eq!(parse_relevance(r#"{"score": -3}"#).unwrap().score, 1);
    }

    #[test]
    fn test_garbage_is_none() {
        assert!(parse_relevance("the article is great").is_none());
        assert!(parse_relevance("{score: broken}").is_none());
    }

    #[test]
    fn test_chatter_around_json() {
        let verdict = parse_relevance(
            "Here's my rating: {\"score\": 6, \"reasoning\": \"Tangential\"} as requested",
        )
        .unwrap();
        assert_eq!(verdict.score, 6);
    }
}
