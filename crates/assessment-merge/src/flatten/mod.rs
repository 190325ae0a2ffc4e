//! Row flattening.
//!
//! Turns one nested assessment record into one [`FlatRow`]. Flattening never
//! fails: every lookup goes through [`RecordView`], which falls back to an
//! empty or zero value when a section or leaf is missing.

mod accessor;
pub mod columns;

pub use accessor::RecordView;

use crate::category::DementiaType;
use crate::loader::RawRecord;
use crate::types::{Cell, FlatRow};
use crate::utils::round_to;
use accessor::value_as_number;
use columns::*;
use serde_json::{Map, Value};

/// Text fields copied verbatim, as (column, section, key).
const COPIED_FIELDS: [(&str, &str, &str); 11] = [
    (EXPORT_DATE, "metadata", "exportDate"),
    (TOOL_VERSION, "metadata", "toolVersion"),
    (PATIENT_NAME, "patientInfo", "name"),
    (CHART_NUMBER, "patientInfo", "chartNumber"),
    (BIRTH_DATE, "patientInfo", "birthDate"),
    (AGE, "patientInfo", "age"),
    (GENDER, "patientInfo", "gender"),
    (EDUCATION, "patientInfo", "education"),
    (ASSESSMENT_DATE, "patientInfo", "assessmentDate"),
    (INFORMANT_NAME, "patientInfo", "informantName"),
    (INFORMANT_RELATION, "patientInfo", "informantRelation"),
];

/// Flatten a record into a row.
///
/// Fixed columns come first in [`FIXED_COLUMNS`] order, followed by one
/// `response_<id>` column per questionnaire answer.
pub fn flatten_record(record: &RawRecord) -> FlatRow {
    let view = RecordView::new(&record.document);
    let mut row = FlatRow::new();

    row.insert(FILE_NAME, Cell::Text(record.file_name.clone()));
    for (column, section, key) in COPIED_FIELDS {
        row.insert(column, view.scalar(&[section, key]));
    }

    row.insert(OVERALL_RISK, view.scalar(&["results", "overallRisk"]));
    row.insert(
        ADL_IMPAIRMENT,
        Cell::Number(round_to(view.number(&["results", "adlImpairment"]), 2)),
    );

    for t in DementiaType::ALL {
        let value = view.number(&["results", "percentages", t.code()]);
        row.insert(t.percentage_column(), Cell::Number(round_to(value, 2)));
    }
    for t in DementiaType::ALL {
        let value = view.number(&["results", "probabilities", t.code()]);
        row.insert(t.probability_column(), Cell::Number(round_to(value, 2)));
    }

    let (most_likely, max_probability) =
        match most_likely_type(view.object(&["results", "probabilities"])) {
            Some((code, probability)) => (Cell::Text(code), round_to(probability, 2)),
            None => (Cell::Empty, 0.0),
        };
    row.insert(MOST_LIKELY_TYPE, most_likely);
    row.insert(MAX_PROBABILITY, Cell::Number(max_probability));

    row.insert(SYMPTOM_COUNT, Cell::Number(view.len(&["abnormalSymptoms"]) as f64));
    row.insert(
        RECOMMENDATION_COUNT,
        Cell::Number(view.len(&["recommendations"]) as f64),
    );

    if let Some(responses) = view.object(&["responses"]) {
        for (question_id, answer) in responses {
            row.insert(response_column(question_id), Cell::from_json(answer));
        }
    }

    row
}

/// Pick the subtype with the highest relative probability.
///
/// Candidates are visited in a fixed order: the known subtypes in
/// [`DementiaType::ALL`] order, then any other keys sorted by name. Only a
/// strictly greater value replaces the current best, so a tie goes to the
/// candidate visited first. Non-numeric entries are ignored.
///
/// Returns `None` when the mapping is absent or holds no numeric entry.
pub fn most_likely_type(probabilities: Option<&Map<String, Value>>) -> Option<(String, f64)> {
    let probabilities = probabilities?;

    let mut extra_keys: Vec<&String> = probabilities
        .keys()
        .filter(|k| DementiaType::from_code(k).is_none())
        .collect();
    extra_keys.sort();

    let mut candidates: Vec<&str> = DementiaType::ALL.iter().map(|t| t.code()).collect();
    candidates.extend(extra_keys.into_iter().map(String::as_str));

    let mut best: Option<(&str, f64)> = None;
    for code in candidates {
        let Some(value) = probabilities.get(code).and_then(value_as_number) else {
            continue;
        };
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((code, value)),
        }
    }

    best.map(|(code, value)| (code.to_string(), value))
}
