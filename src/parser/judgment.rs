use crate::rubric::{criterion_index, CRITERIA, EMPTY_MARK, PRESENT_MARK};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Present/absent signal for one criterion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mark {
    Present,
    #[default]
    Absent,
}

impl Mark {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mark::Present => PRESENT_MARK,
            Mark::Absent => EMPTY_MARK,
        }
    }

    /// Models answer "1", 1, true or "yes" interchangeably; anything else is absent
    pub fn from_value(value: &Value) -> Self {
        let present = match value {
            Value::String(s) => matches!(
                s.trim().to_lowercase().as_str(),
                "1" | "yes" | "y" | "true"
            ),
            Value::Number(n) => n.as_f64() == Some(1.0),
            Value::Bool(b) => *b,
            _ => false,
        };
        if present {
            Mark::Present
        } else {
            Mark::Absent
        }
    }
}

impl std::fmt::Display for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One dialogue's verdict. Always carries a mark for every criterion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Judgment {
    marks: [Mark; CRITERIA.len()],
    /// Keys the model returned that are not part of the rubric
    extra: BTreeMap<String, Value>,
}

impl Judgment {
    /// All criteria absent; stands in for anything that could not be parsed
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_object(object: Map<String, Value>) -> Self {
        let mut judgment = Self::empty();
        for (key, value) in object {
            match criterion_index(&key) {
                Some(idx) => judgment.marks[idx] = Mark::from_value(&value),
                None => {
                    judgment.extra.insert(key, value);
                }
            }
        }
        judgment
    }

    #[cfg(test)]
    pub fn with_mark(mut self, criterion: &str, mark: Mark) -> Self {
        if let Some(idx) = criterion_index(criterion) {
            self.marks[idx] = mark;
        }
        self
    }

    #[cfg(test)]
    pub fn get(&self, criterion: &str) -> Option<Mark> {
        criterion_index(criterion).map(|idx| self.marks[idx])
    }

    /// (criterion, mark) pairs in column order
    pub fn marks(&self) -> impl Iterator<Item = (&'static str, Mark)> + '_ {
        CRITERIA.iter().copied().zip(self.marks.iter().copied())
    }

    /// Cell values in column order
    pub fn cells(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.marks.iter().map(Mark::as_str)
    }

    pub fn extra(&self) -> &BTreeMap<String, Value> {
        &self.extra
    }

    pub fn is_empty(&self) -> bool {
        self.marks.iter().all(|m| *m == Mark::Absent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_missing_criteria_are_filled() {
        let judgment = Judgment::from_object(object(json!({"Empathy": "1"})));
        assert_eq!(judgment.get("Empathy"), Some(Mark::Present));
        assert_eq!(judgment.marks().count(), CRITERIA.len());
        assert_eq!(judgment.get("Response Time"), Some(Mark::Absent));
    }

    #[test]
    fn test_unknown_keys_kept_aside() {
        let judgment = Judgment::from_object(object(json!({
            "Empathy": "1",
            "Tone": "warm"
        })));
        assert_eq!(judgment.extra().get("Tone"), Some(&json!("warm")));
        assert!(judgment.cells().all(|c| c == "1" || c.is_empty()));
    }

    #[test]
    fn test_mark_normalisation() {
        assert_eq!(Mark::from_value(&json!("1")), Mark::Present);
        assert_eq!(Mark::from_value(&json!(" Yes ")), Mark::Present);
        assert_eq!(Mark::from_value(&json!(1)), Mark::Present);
        assert_eq!(Mark::from_value(&json!(true)), Mark::Present);
        assert_eq!(Mark::from_value(&json!("")), Mark::Absent);
        assert_eq!(Mark::from_value(&json!(0)), Mark::Absent);
        assert_eq!(Mark::from_value(&json!("no")), Mark::Absent);
        assert_eq!(Mark::from_value(&Value::Null), Mark::Absent);
    }

    #[test]
    fn test_criterion_names_are_case_sensitive() {
        let judgment = Judgment::from_object(object(json!({"empathy": "1"})));
        assert_eq!(judgment.get("Empathy"), Some(Mark::Absent));
        assert!(judgment.extra().contains_key("empathy"));
    }

    #[test]
    fn test_empty_judgment() {
        let judgment = Judgment::empty();
        assert!(judgment.is_empty());
        assert!(judgment.cells().all(str::is_empty));
        assert!(!judgment.with_mark("Empathy", Mark::Present).is_empty());
    }
}
