//! Conversions between filter values and BSON.

use bson::Bson;
use lucent_query::FilterValue;

/// Convert a cast filter value to BSON.
pub fn filter_value_to_bson(value: &FilterValue) -> Bson {
    match value {
        FilterValue::Null => Bson::Null,
        FilterValue::Bool(b) => Bson::Boolean(*b),
        FilterValue::Int(i) => Bson::Int64(*i),
        FilterValue::Float(f) => Bson::Double(*f),
        FilterValue::Timestamp(ts) => Bson::DateTime(bson::DateTime::from_chrono(*ts)),
        FilterValue::String(s) => Bson::String(s.clone()),
    }
}

/// Render a scalar BSON value as suggestion text. Documents, arrays,
/// binary data and nulls have no text form.
pub fn bson_to_text(value: &Bson) -> Option<String> {
    Some(match value {
        Bson::String(s) => s.clone(),
        Bson::Int32(i) => i.to_string(),
        Bson::Int64(i) => i.to_string(),
        Bson::Double(f) => f.to_string(),
        Bson::Boolean(b) => b.to_string(),
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::DateTime(dt) => dt.to_chrono().to_rfc3339(),
        Bson::Symbol(s) => s.clone(),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_filter_value_to_bson() {
        assert_eq!(filter_value_to_bson(&FilterValue::Int(3)), Bson::Int64(3));
        assert_eq!(filter_value_to_bson(&FilterValue::Null), Bson::Null);
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(
            filter_value_to_bson(&FilterValue::Timestamp(ts)),
            Bson::DateTime(bson::DateTime::from_chrono(ts))
        );
    }

    #[test]
    fn test_bson_to_text() {
        assert_eq!(bson_to_text(&Bson::String("x".into())), Some("x".into()));
        assert_eq!(bson_to_text(&Bson::Int32(7)), Some("7".into()));
        assert_eq!(bson_to_text(&Bson::Boolean(true)), Some("true".into()));
        assert_eq!(bson_to_text(&Bson::Null), None);
        assert_eq!(bson_to_text(&Bson::Array(vec![])), None);
    }
}
