use serde_json::{Map, Value};

/// Remove a surrounding markdown code fence.
/// Only the first line (if it opens a fence) and the last line (if it is a bare
/// closing fence) are dropped; text that does not start with a fence is only trimmed.
pub fn strip_fences(text: &str) -> String {
    let cleaned = text.trim();
    if !cleaned.starts_with("```") {
        return cleaned.to_string();
    }

    let mut lines: Vec<&str> = cleaned.lines().collect();
    if lines.first().is_some_and(|l| l.starts_with("```")) {
        lines.remove(0);
    }
    if lines.last().is_some_and(|l| l.trim() == "```") {
        lines.pop();
    }
    lines.join("\n").trim().to_string()
}

/// Parse one reply fragment as a JSON object, tolerating fences and chatter
pub fn parse_object(fragment: &str) -> Option<Map<String, Value>> {
    let cleaned = strip_fences(fragment);

    // First try: the whole fragment is an object
    if let Some(map) = as_object(&cleaned) {
        return Some(map);
    }

    // Second try: a fenced block somewhere inside the fragment
    let re = regex::Regex::new(r"```(?:json)?\s*\n?([\s\S]*?)\n?```").ok()?;
    for cap in re.captures_iter(&cleaned) {
        if let Some(map) = cap.get(1).and_then(|m| as_object(m.as_str().trim())) {
            return Some(map);
        }
    }

    // Third try: the first balanced object
    balanced_object(&cleaned).and_then(as_object)
}

fn as_object(s: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(s) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => None,
        Err(e) => {
            tracing::trace!("Fragment is not JSON: {}", e);
            None
        }
    }
}

/// Slice of `s` from the first `{` to its matching `}`, skipping braces inside strings
fn balanced_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in s[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }

    None
}
