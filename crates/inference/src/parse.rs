use crate::types::EndpointPair;
use once_cell::sync::Lazy;
use regex::Regex;

/// Locates the first JSON array of objects anywhere in a response.
static JSON_ARRAY_PROBE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\[\s*\{.*\}\s*\]").expect("probe pattern must compile"));

/// Salvage patterns for responses that are not valid JSON, tried in order.
/// All of them are same-line: `.` never crosses a newline here.
static FALLBACK_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // `"method": "GET", ... "path": "/users"` with any quoting, or none
        r#"(?:"|')?method(?:"|')?:\s*(?:"|')?([A-Z]+)(?:"|')?.*?(?:"|')?path(?:"|')?:\s*(?:"|')?([^"'}\s]+)"#,
        // `GET "/users"` prose mentions
        r#"([A-Z]+)\s+(?:"|')([/][^"'}\s]+)"#,
        // bare `method: GET ... path: /users`
        r"method:\s*([A-Z]+).*?path:\s*([/][^,}\s]+)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("fallback pattern must compile"))
    .collect()
});

/// Pull `{method, path}` pairs out of a model response.
///
/// The happy path is a JSON array of objects; entries missing either field,
/// or with a non-string or empty path, are dropped. When the probe finds an
/// array that does not parse, or no array at all, the fallback patterns
/// scrape what they can. Pairs are returned raw and may repeat; the
/// reconciler owns normalization and dedup.
pub fn parse_endpoint_pairs(response: &str) -> Vec<EndpointPair> {
    if let Some(found) = JSON_ARRAY_PROBE.find(response) {
        match serde_json::from_str::<Vec<serde_json::Value>>(found.as_str()) {
            Ok(entries) => return pairs_from_json(&entries),
            Err(err) => {
                log::debug!("Response array is not valid JSON ({err}); trying fallback patterns");
            }
        }
    }
    fallback_pairs(response)
}

fn pairs_from_json(entries: &[serde_json::Value]) -> Vec<EndpointPair> {
    let mut pairs = Vec::new();
    for entry in entries {
        let Some(method) = entry.get("method").and_then(serde_json::Value::as_str) else {
            continue;
        };
        let Some(path) = entry.get("path").and_then(serde_json::Value::as_str) else {
            continue;
        };
        if path.is_empty() {
            continue;
        }
        pairs.push(EndpointPair::new(method, path));
    }
    pairs
}

fn fallback_pairs(response: &str) -> Vec<EndpointPair> {
    let mut pairs = Vec::new();
    for pattern in FALLBACK_PATTERNS.iter() {
        for caps in pattern.captures_iter(response) {
            if let (Some(method), Some(path)) = (caps.get(1), caps.get(2)) {
                pairs.push(EndpointPair::new(method.as_str(), path.as_str()));
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_a_json_array_with_surrounding_prose() {
        let response = r#"Here are the endpoints I found:

[
  {"method": "GET", "path": "/api/users"},
  {"method": "post", "path": "/api/users"}
]

Let me know if you need more detail."#;
        let pairs = parse_endpoint_pairs(response);
        assert_eq!(
            pairs,
            vec![
                EndpointPair::new("GET", "/api/users"),
                EndpointPair::new("post", "/api/users"),
            ]
        );
    }

    #[test]
    fn empty_array_response_yields_no_pairs() {
        assert_eq!(parse_endpoint_pairs("[]"), vec![]);
        assert_eq!(parse_endpoint_pairs("No endpoints found."), vec![]);
    }

    #[test]
    fn entries_missing_fields_are_dropped() {
        let response = r#"[
  {"method": "GET"},
  {"path": "/half"},
  {"method": "PUT", "path": ""},
  {"method": "DELETE", "path": 42},
  {"method": "POST", "path": "/ok"}
]"#;
        let pairs = parse_endpoint_pairs(response);
        assert_eq!(pairs, vec![EndpointPair::new("POST", "/ok")]);
    }

    #[test]
    fn single_quoted_pseudo_json_falls_back_to_scraping() {
        let response = "[{'method': 'GET', 'path': '/users'}]";
        let pairs = parse_endpoint_pairs(response);
        assert_eq!(pairs, vec![EndpointPair::new("GET", "/users")]);
    }

    #[test]
    fn prose_mentions_are_scraped() {
        let response = "The handler registers GET \"/orders\" on startup.";
        let pairs = parse_endpoint_pairs(response);
        assert_eq!(pairs, vec![EndpointPair::new("GET", "/orders")]);
    }

    #[test]
    fn bare_method_path_lines_are_scraped_by_two_patterns() {
        // The first and third fallback patterns both hit this shape; the
        // duplicate is deliberate and collapses at reconciliation.
        let response = "method: GET, path: /users";
        let pairs = parse_endpoint_pairs(response);
        assert_eq!(
            pairs,
            vec![
                EndpointPair::new("GET", "/users"),
                EndpointPair::new("GET", "/users"),
            ]
        );
    }

    #[test]
    fn invalid_json_with_no_scrapable_text_yields_nothing() {
        let response = "[{broken";
        assert_eq!(parse_endpoint_pairs(response), vec![]);
    }
}
