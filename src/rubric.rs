//! The fixed evaluation rubric every dialogue is judged against.

/// Criterion names in canonical column order. Matched case-sensitively.
pub const CRITERIA: [&str; 8] = [
    "Greeting & Introduction",
    "Understanding the Issue",
    "Empathy",
    "Clarity of Response",
    "Resolution Provided",
    "Response Time",
    "Professionalism & Politeness",
    "Follow-up Provided",
];

pub const PRESENT_MARK: &str = "1";
pub const EMPTY_MARK: &str = "";

/// Position of a criterion in [`CRITERIA`]
pub fn criterion_index(name: &str) -> Option<usize> {
    CRITERIA.iter().position(|c| *c == name)
}
