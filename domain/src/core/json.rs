//! JSON extraction from free-form model output.

/// Find the JSON object embedded in a model response.
///
/// Looks, in order, for:
/// 1. A ` ```json ` (or bare ` ``` `) fenced block whose body starts with `{`
/// 2. The span from the first `{` to the last `}`
pub fn extract_json_object(response: &str) -> Option<&str> {
    let mut offset = 0;
    let mut in_block = false;
    let mut block_start = 0;

    for line in response.split_inclusive('\n') {
        let trimmed = line.trim();
        if !in_block && (trimmed == "```json" || trimmed == "```") {
            in_block = true;
            block_start = offset + line.len();
        } else if in_block && trimmed == "```" {
            let body = response[block_start..offset].trim();
            if body.starts_with('{') {
                return Some(body);
            }
            in_block = false;
        }
        offset += line.len();
    }

    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (end > start).then(|| &response[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_block() {
        let text = "Here you go:\n```json\n{\"a\": 1}\n```\nThanks";
        assert_eq!(extract_json_object(text), Some("{\"a\": 1}"));
    }

    #[test]
    fn test_bare_object() {
        let text = "Result: {\"a\": {\"b\": 2}} done";
        assert_eq!(extract_json_object(text), Some("{\"a\": {\"b\": 2}}"));
    }

    #[test]
    fn test_no_object() {
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("} reversed {"), None);
    }

    #[test]
    fn test_fence_without_object_falls_back() {
        let text = "```\nnot json\n```\n{\"x\": true}";
        assert_eq!(extract_json_object(text), Some("{\"x\": true}"));
    }
}
