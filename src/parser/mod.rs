mod json;
mod judgment;

pub use judgment::{Judgment, Mark};

use tracing::debug;

/// Per-record judgments recovered from one reply, plus what had to be repaired
#[derive(Debug, Clone, PartialEq)]
pub struct SplitOutcome {
    /// Exactly as many entries as records in the batch
    pub judgments: Vec<Judgment>,
    /// Non-empty fragments found in the reply
    pub fragments: usize,
    /// Fragments that could not be parsed and were replaced by empty judgments
    pub malformed: usize,
}

impl SplitOutcome {
    /// Reply needed no repair
    pub fn is_clean(&self) -> bool {
        self.malformed == 0 && self.fragments == self.judgments.len()
    }
}

/// Split a delimited reply into exactly `expected` judgments.
///
/// Never fails: unparseable fragments become empty judgments, surplus
/// fragments are dropped from the end and missing ones are padded with
/// empty judgments, so the result zips positionally onto the batch.
pub fn split_and_repair(raw: &str, delimiter: &str, expected: usize) -> SplitOutcome {
    let cleaned = json::strip_fences(raw);

    let mut malformed = 0;
    let mut judgments: Vec<Judgment> = cleaned
        .split(delimiter)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| match json::parse_object(part) {
            Some(object) => Judgment::from_object(object),
            None => {
                debug!("Unparseable fragment: {}", part);
                malformed += 1;
                Judgment::empty()
            }
        })
        .collect();

    let fragments = judgments.len();
    if fragments != expected {
        debug!(
            "Reply has {} fragments for {} records; {}",
            fragments,
            expected,
            if fragments > expected {
                "truncating"
            } else {
                "padding"
            }
        );
    }
    judgments.resize_with(expected, Judgment::empty);

    SplitOutcome {
        judgments,
        fragments,
        malformed,
    }
}

/// Stand-in result for a batch whose request failed outright
pub fn default_judgments(expected: usize) -> Vec<Judgment> {
    vec![Judgment::empty(); expected]
}
