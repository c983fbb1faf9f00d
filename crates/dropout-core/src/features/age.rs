use dropout_model::AgeUnit;

/// Converts an eligibility age limit to years.
///
/// Missing values, missing units and unrecognized units all give `None`.
pub fn age_in_years(value: Option<f64>, unit: Option<&str>) -> Option<f64> {
    let unit = AgeUnit::from_label(unit?)?;
    Some(value? * unit.years_per_unit())
}
