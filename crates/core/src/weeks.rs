//! Challenge-week rules.
//!
//! Each challenge year runs weeks `1..=16`. Works name the weeks they were
//! made for; the same work can count for several weeks.

/// First week number of a challenge year.
pub const MIN_WEEK: u32 = 1;

/// Last week number of a challenge year.
pub const MAX_WEEK: u32 = 16;

/// Earliest accepted challenge year.
pub const MIN_YEAR: i32 = 2000;

/// Latest accepted challenge year.
pub const MAX_YEAR: i32 = 2100;

/// Validate a single week number.
pub fn validate_week_number(week: u32) -> Result<(), String> {
    if (MIN_WEEK..=MAX_WEEK).contains(&week) {
        Ok(())
    } else {
        Err(format!(
            "Invalid week {week}. Must be between {MIN_WEEK} and {MAX_WEEK}"
        ))
    }
}

/// Validate the week list of a work: non-empty, in range, no repeats.
pub fn validate_week_numbers(weeks: &[u32]) -> Result<(), String> {
    if weeks.is_empty() {
        return Err("At least one week number is required".to_string());
    }
    for (i, week) in weeks.iter().enumerate() {
        validate_week_number(*week)?;
        if weeks[..i].contains(week) {
            return Err(format!("Week {week} is listed more than once"));
        }
    }
    Ok(())
}

/// Validate a challenge year.
pub fn validate_year(year: i32) -> Result<(), String> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(format!(
            "Invalid year {year}. Must be between {MIN_YEAR} and {MAX_YEAR}"
        ))
    }
}
