//! Names of the flattened table columns.

pub const FILE_NAME: &str = "file_name";
pub const EXPORT_DATE: &str = "export_date";
pub const TOOL_VERSION: &str = "tool_version";
pub const PATIENT_NAME: &str = "patient_name";
pub const CHART_NUMBER: &str = "chart_number";
pub const BIRTH_DATE: &str = "birth_date";
pub const AGE: &str = "age";
pub const GENDER: &str = "gender";
pub const EDUCATION: &str = "education";
pub const ASSESSMENT_DATE: &str = "assessment_date";
pub const INFORMANT_NAME: &str = "informant_name";
pub const INFORMANT_RELATION: &str = "informant_relation";
pub const OVERALL_RISK: &str = "overall_risk";
pub const ADL_IMPAIRMENT: &str = "adl_impairment";
pub const MOST_LIKELY_TYPE: &str = "most_likely_type";
pub const MAX_PROBABILITY: &str = "max_probability";
pub const SYMPTOM_COUNT: &str = "abnormal_symptom_count";
pub const RECOMMENDATION_COUNT: &str = "recommendation_count";

/// Prefix of the columns holding raw questionnaire answers.
pub const RESPONSE_PREFIX: &str = "response_";

/// Every fixed column, in the order they lead the table.
pub const FIXED_COLUMNS: [&str; 28] = [
    FILE_NAME,
    EXPORT_DATE,
    TOOL_VERSION,
    PATIENT_NAME,
    CHART_NUMBER,
    BIRTH_DATE,
    AGE,
    GENDER,
    EDUCATION,
    ASSESSMENT_DATE,
    INFORMANT_NAME,
    INFORMANT_RELATION,
    OVERALL_RISK,
    ADL_IMPAIRMENT,
    "AD_percentage",
    "DLB_percentage",
    "VaD_percentage",
    "FTD_percentage",
    "PPA_percentage",
    "AD_probability",
    "DLB_probability",
    "VaD_probability",
    "FTD_probability",
    "PPA_probability",
    MOST_LIKELY_TYPE,
    MAX_PROBABILITY,
    SYMPTOM_COUNT,
    RECOMMENDATION_COUNT,
];

/// Column name for a questionnaire answer.
pub fn response_column(question_id: &str) -> String {
    format!("{RESPONSE_PREFIX}{question_id}")
}
