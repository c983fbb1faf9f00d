//! Names and columns of the AACT tables read by the pipeline.

/// A table and the columns requested from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

pub const STUDY_ID_COLUMN: &str = "nct_id";

pub const DROP_WITHDRAWALS: TableSpec = TableSpec {
    name: "drop_withdrawals",
    columns: &["nct_id", "count"],
};

pub const STUDY_ENROLLMENT: TableSpec = TableSpec {
    name: "studies",
    columns: &["nct_id", "enrollment", "enrollment_type"],
};

pub const MILESTONES: TableSpec = TableSpec {
    name: "milestones",
    columns: &["nct_id", "title", "count"],
};

pub const BASELINE_MEASUREMENTS: TableSpec = TableSpec {
    name: "baseline_measurements",
    columns: &["nct_id", "category", "classification", "param_value_num"],
};

pub const BROWSE_CONDITIONS: TableSpec = TableSpec {
    name: "browse_conditions",
    columns: &["nct_id", "mesh_term"],
};

pub const BROWSE_INTERVENTIONS: TableSpec = TableSpec {
    name: "browse_interventions",
    columns: &["nct_id", "mesh_term"],
};

pub const CALCULATED_VALUES: TableSpec = TableSpec {
    name: "calculated_values",
    columns: &[
        "nct_id",
        "number_of_facilities",
        "registered_in_calendar_year",
        "actual_duration",
        "has_us_facility",
        "minimum_age_num",
        "maximum_age_num",
        "minimum_age_unit",
        "maximum_age_unit",
    ],
};

pub const INTERVENTIONS: TableSpec = TableSpec {
    name: "interventions",
    columns: &["nct_id", "intervention_type"],
};

pub const KEYWORDS: TableSpec = TableSpec {
    name: "keywords",
    columns: &["nct_id", "name"],
};

pub const STUDY_DESIGN: TableSpec = TableSpec {
    name: "studies",
    columns: &[
        "nct_id",
        "study_type",
        "overall_status",
        "phase",
        "number_of_arms",
    ],
};
