//! Request payload for one batch of dialogues.

use crate::rubric::{CRITERIA, EMPTY_MARK, PRESENT_MARK};
use sha2::{Digest, Sha256};

/// Marks used in the worked example, one per criterion
const EXAMPLE_MARKS: [&str; 8] = [
    PRESENT_MARK,
    EMPTY_MARK,
    PRESENT_MARK,
    PRESENT_MARK,
    PRESENT_MARK,
    EMPTY_MARK,
    PRESENT_MARK,
    EMPTY_MARK,
];

fn preamble(delimiter: &str) -> String {
    let criteria = CRITERIA.join("\n");
    let example = CRITERIA
        .iter()
        .zip(EXAMPLE_MARKS)
        .map(|(criterion, mark)| format!("\"{}\": \"{}\"", criterion, mark))
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        "You are a customer service quality analyst. \
        Assess each chat message based on the following criteria:\n\
        {criteria}\n\n\
        For each chat log, return a JSON response with each criterion as a key \
        ({PRESENT_MARK} for yes, blank for no).\n\
        Separate JSON responses with: {delimiter}\n\
        Ensure that the response is strictly formatted as valid JSON.\n\
        Example Response Format:\n\
        ```json\n\
        {{\n\
        {example}\n\
        }}\n\
        ```\n"
    )
}

/// Build the payload for a batch: rubric instructions, then the texts
/// separated by the delimiter on its own line. Deterministic.
pub fn build_batch_prompt<S: AsRef<str>>(texts: &[S], delimiter: &str) -> String {
    let separator = format!("\n{}\n", delimiter);
    let batch = texts
        .iter()
        .map(|t| t.as_ref())
        .collect::<Vec<_>>()
        .join(separator.as_str());

    format!("{}\n\n{}", preamble(delimiter), batch)
}

/// Short stable digest for matching a logged batch to its replay
pub fn fingerprint(payload: &str) -> String {
    let hash = Sha256::digest(payload.as_bytes());
    format!("{:x}", hash)[..12].to_string()
}
