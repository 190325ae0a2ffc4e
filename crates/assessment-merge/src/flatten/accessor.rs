//! Safe-get access into a loosely structured JSON document.

use crate::types::Cell;
use crate::utils::parse_numeric_string;
use serde_json::{Map, Value};

/// Read-only view over a record document.
///
/// Every lookup walks a path of object keys. A missing key, a `null`, or a
/// node of the wrong type all resolve to the neutral default of the
/// accessor, so callers never branch on absence.
#[derive(Debug, Clone, Copy)]
pub struct RecordView<'a> {
    root: &'a Value,
}

impl<'a> RecordView<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self { root }
    }

    /// The node at `path`, if every step along it is an object key.
    pub fn get(&self, path: &[&str]) -> Option<&'a Value> {
        path.iter()
            .try_fold(self.root, |node, key| node.as_object()?.get(*key))
    }

    /// The scalar at `path`, copied verbatim. Default: [`Cell::Empty`].
    pub fn scalar(&self, path: &[&str]) -> Cell {
        self.get(path).map(Cell::from_json).unwrap_or_default()
    }

    /// The number at `path`. Default: `0.0`.
    ///
    /// Numeric strings are accepted as well.
    pub fn number(&self, path: &[&str]) -> f64 {
        self.get(path).and_then(value_as_number).unwrap_or(0.0)
    }

    /// The length of the array at `path`. Default: `0`.
    pub fn len(&self, path: &[&str]) -> usize {
        self.get(path)
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// The object at `path`, if there is one.
    pub fn object(&self, path: &[&str]) -> Option<&'a Map<String, Value>> {
        self.get(path).and_then(Value::as_object)
    }
}

/// Interpret a JSON value as a finite number.
pub(crate) fn value_as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_numeric_string(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_lookup() {
        let doc = json!({"results": {"probabilities": {"AD": 0.4}}});
        let view = RecordView::new(&doc);
        assert_eq!(view.number(&["results", "probabilities", "AD"]), 0.4);
        assert!(view.object(&["results", "probabilities"]).is_some());
    }

    #[test]
    fn test_missing_sections_default() {
        let doc = json!({});
        let view = RecordView::new(&doc);
        assert_eq!(view.scalar(&["patientInfo", "gender"]), Cell::Empty);
        assert_eq!(view.number(&["results", "adlImpairment"]), 0.0);
        assert_eq!(view.len(&["abnormalSymptoms"]), 0);
        assert!(view.object(&["responses"]).is_none());
    }

    #[test]
    fn test_wrong_types_default() {
        let doc = json!({
            "patientInfo": "not an object",
            "results": {"adlImpairment": [1, 2]},
            "recommendations": {"a": 1}
        });
        let view = RecordView::new(&doc);
        assert_eq!(view.scalar(&["patientInfo", "name"]), Cell::Empty);
        assert_eq!(view.number(&["results", "adlImpairment"]), 0.0);
        assert_eq!(view.len(&["recommendations"]), 0);
    }

    #[test]
    fn test_null_is_empty() {
        let doc = json!({"patientInfo": {"education": null}});
        let view = RecordView::new(&doc);
        assert_eq!(view.scalar(&["patientInfo", "education"]), Cell::Empty);
    }

    #[test]
    fn test_numeric_string_accepted() {
        let doc = json!({"results": {"adlImpairment": " 2.5 "}});
        let view = RecordView::new(&doc);
        assert_eq!(view.number(&["results", "adlImpairment"]), 2.5);
    }
}
