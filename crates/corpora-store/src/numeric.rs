//! The numeric domain shared by range filters and type inference

use chrono::{Datelike, NaiveDate, NaiveDateTime};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Read a value as a point in the common numeric domain
///
/// Integer and float literals map to themselves; dates map to days since
/// 0001-01-01. Anything else has no quantity.
///
/// # Examples
///
/// ```
/// use corpora_store::quantity;
///
/// assert_eq!(quantity("42"), Some(42.0));
/// assert_eq!(quantity("0001-01-02"), Some(2.0));
/// assert_eq!(quantity("cat"), None);
/// ```
pub fn quantity(token: &str) -> Option<f64> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    if let Ok(i) = token.parse::<i64>() {
        return Some(i as f64);
    }
    if let Ok(x) = token.parse::<f64>() {
        return x.is_finite().then_some(x);
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(token, format) {
            return Some(date.num_days_from_ce() as f64);
        }
    }
    NaiveDateTime::parse_from_str(token, DATETIME_FORMAT)
        .ok()
        .map(|dt| dt.date().num_days_from_ce() as f64)
}
