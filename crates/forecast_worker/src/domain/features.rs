use serde_json::{Map, Value};

/// Current feature layout version
/// MUST be incremented when the layout changes
pub const FEATURE_VERSION: u16 = 1;

pub const FEATURE_COUNT: usize = 26;

/// Feature names in the exact order the model was trained with.
///
/// This is the SINGLE SOURCE OF TRUTH for the model input layout: the
/// extractor builds vectors in this order and the model provider probes the
/// loaded artifact against this width. Reordering silently corrupts every
/// prediction, so any change here requires a retrained artifact and a
/// FEATURE_VERSION bump.
pub const FEATURE_ORDER: [&str; FEATURE_COUNT] = [
    "Temperature",
    "Humidity",
    "WindSpeed",
    "GeneralDiffuseFlows",
    "DiffuseFlows",
    "hour",
    "minute",
    "dayofweek",
    "quarter",
    "month",
    "day",
    "year",
    "season",
    "dayofyear",
    "dayofmonth",
    "weekofyear",
    "is_weekend",
    "is_month_start",
    "is_month_end",
    "is_quarter_start",
    "is_quarter_end",
    "is_working_day",
    "is_business_hours",
    "is_peak_hour",
    "minute_of_day",
    "minute_of_week",
];

/// Free-form timestamp field carried alongside the features
pub const TIMESTAMP_FIELD: &str = "Datetime";
const TIMESTAMP_FALLBACK: &str = "unknown_date";

const ENRICHED_KEY_PREFIX: &str = "test/";
const RESULT_KEY_PREFIX: &str = "results/";
const KEY_SUFFIX: &str = ".json";

/// One model input row, in FEATURE_ORDER
pub type FeatureRow = [f32; FEATURE_COUNT];

/// Output of feature extraction for a single inbound reading
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFeatures {
    /// All 26 recognized fields, value or null, in feature order
    pub enriched: Map<String, Value>,
    /// Numeric view of the same fields; absent/null degrade to zero
    pub vector: FeatureRow,
    /// Object key for the enriched record
    pub data_key: String,
    /// Object key for the forecast result
    pub result_key: String,
}

/// Map an inbound reading onto the fixed feature layout.
///
/// Pure and infallible: unknown fields are ignored, recognized fields pass
/// through verbatim into the enriched record (null when absent), and the
/// vector takes the numeric coercion of each value. The storage keys embed
/// the raw timestamp string verbatim.
pub fn extract(raw: &Map<String, Value>) -> ExtractedFeatures {
    let mut enriched = Map::with_capacity(FEATURE_COUNT);
    let mut vector = [0.0f32; FEATURE_COUNT];

    for (slot, name) in FEATURE_ORDER.iter().enumerate() {
        let value = raw.get(*name).cloned().unwrap_or(Value::Null);
        vector[slot] = numeric(&value);
        enriched.insert((*name).to_string(), value);
    }

    let timestamp = timestamp(raw);
    let data_key = format!("{ENRICHED_KEY_PREFIX}{timestamp}{KEY_SUFFIX}");
    let result_key = format!("{RESULT_KEY_PREFIX}{timestamp}{KEY_SUFFIX}");

    ExtractedFeatures {
        enriched,
        vector,
        data_key,
        result_key,
    }
}

fn numeric(value: &Value) -> f32 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0) as f32,
        Value::Bool(true) => 1.0,
        _ => 0.0,
    }
}

fn timestamp(raw: &Map<String, Value>) -> String {
    match raw.get(TIMESTAMP_FIELD) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => TIMESTAMP_FALLBACK.to_string(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_reading() -> Map<String, Value> {
        let mut raw = Map::new();
        raw.insert("Datetime".to_string(), json!("2024-05-01T10:00:00"));
        for (i, name) in FEATURE_ORDER.iter().enumerate() {
            raw.insert((*name).to_string(), json!(i as f64 + 0.5));
        }
        raw
    }

    #[test]
    fn test_feature_order_has_26_distinct_names() {
        let mut names: Vec<&str> = FEATURE_ORDER.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_extract_full_reading_passes_through_unchanged() {
        let raw = full_reading();

        let extracted = extract(&raw);

        assert_eq!(extracted.enriched.len(), FEATURE_COUNT);
        for (i, name) in FEATURE_ORDER.iter().enumerate() {
            assert_eq!(extracted.enriched.get(*name), Some(&json!(i as f64 + 0.5)));
            assert_eq!(extracted.vector[i], i as f32 + 0.5);
        }
    }

    #[test]
    fn test_extract_missing_field_is_null_and_zero() {
        let mut raw = full_reading();
        raw.remove("WindSpeed");

        let extracted = extract(&raw);

        let slot = FEATURE_ORDER
            .iter()
            .position(|name| *name == "WindSpeed")
            .unwrap();
        assert_eq!(extracted.enriched.get("WindSpeed"), Some(&Value::Null));
        assert_eq!(extracted.vector[slot], 0.0);

        // All other positions are untouched
        for (i, name) in FEATURE_ORDER.iter().enumerate() {
            if i != slot {
                assert_eq!(extracted.enriched.get(*name), Some(&json!(i as f64 + 0.5)));
                assert_eq!(extracted.vector[i], i as f32 + 0.5);
            }
        }
    }

    #[test]
    fn test_extract_boolean_flags_coerce_without_rewriting() {
        let mut raw = full_reading();
        raw.insert("is_weekend".to_string(), json!(true));
        raw.insert("is_peak_hour".to_string(), json!(false));

        let extracted = extract(&raw);

        let weekend = FEATURE_ORDER
            .iter()
            .position(|name| *name == "is_weekend")
            .unwrap();
        let peak = FEATURE_ORDER
            .iter()
            .position(|name| *name == "is_peak_hour")
            .unwrap();
        assert_eq!(extracted.vector[weekend], 1.0);
        assert_eq!(extracted.vector[peak], 0.0);
        // Enriched record keeps the original values
        assert_eq!(extracted.enriched.get("is_weekend"), Some(&json!(true)));
        assert_eq!(extracted.enriched.get("is_peak_hour"), Some(&json!(false)));
    }

    #[test]
    fn test_storage_keys_embed_timestamp_verbatim() {
        let raw = full_reading();

        let extracted = extract(&raw);

        assert_eq!(extracted.data_key, "test/2024-05-01T10:00:00.json");
        assert_eq!(extracted.result_key, "results/2024-05-01T10:00:00.json");
    }

    #[test]
    fn test_storage_keys_preserve_adversarial_timestamp() {
        let mut raw = full_reading();
        raw.insert("Datetime".to_string(), json!("../escape/..\\2024"));

        let extracted = extract(&raw);

        // Path separators flow through unsanitized, matching the permissive
        // key contract
        assert_eq!(extracted.data_key, "test/../escape/..\\2024.json");
        assert_eq!(extracted.result_key, "results/../escape/..\\2024.json");
    }

    #[test]
    fn test_missing_timestamp_uses_fallback_placeholder() {
        let mut raw = full_reading();
        raw.remove("Datetime");

        let extracted = extract(&raw);

        assert_eq!(extracted.data_key, "test/unknown_date.json");
        assert_eq!(extracted.result_key, "results/unknown_date.json");
    }

    #[test]
    fn test_extract_is_idempotent() {
        let raw = full_reading();

        let first = extract(&raw);
        let second = extract(&raw);

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first.enriched).unwrap(),
            serde_json::to_string(&second.enriched).unwrap()
        );
    }
}
