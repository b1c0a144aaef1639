use common::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Number of power-consumption zones the model predicts
pub const PREDICTION_ZONES: usize = 3;

/// One invocation event: an ordered batch of inbound records
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct IngestEvent {
    #[serde(default)]
    pub records: Vec<IngestRecord>,
}

/// Record descriptor wrapping a base64-encoded reading payload
///
/// The payload decodes to a UTF-8 JSON object with the sensor fields and the
/// free-form `Datetime` string.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct IngestRecord {
    pub data: String,
}

/// One model output row: a predicted value per zone, in model output order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionTriple {
    pub zone1: f32,
    pub zone2: f32,
    pub zone3: f32,
}

impl PredictionTriple {
    /// Checked conversion from a raw model output row.
    ///
    /// A row of any width other than three is an invariant violation and
    /// fails the enclosing record's processing.
    pub fn from_row(row: &[f32]) -> DomainResult<Self> {
        if row.len() != PREDICTION_ZONES {
            return Err(DomainError::PredictionShapeMismatch {
                expected: PREDICTION_ZONES,
                actual: row.len(),
            });
        }
        Ok(Self {
            zone1: row[0],
            zone2: row[1],
            zone3: row[2],
        })
    }
}

/// The persisted forecast: the prediction triple plus the temporal fields
/// copied from the enriched record
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ForecastResult {
    #[serde(rename = "PowerConsumption_Zone1")]
    pub zone1: f32,
    #[serde(rename = "PowerConsumption_Zone2")]
    pub zone2: f32,
    #[serde(rename = "PowerConsumption_Zone3")]
    pub zone3: f32,
    pub hour: Value,
    pub minute: Value,
    pub month: Value,
    pub day: Value,
    pub year: Value,
}

/// Combine a prediction with the temporal context of its enriched record.
///
/// Temporal fields are copied verbatim; nulls from upstream propagate.
pub fn assemble(prediction: PredictionTriple, enriched: &Map<String, Value>) -> ForecastResult {
    let temporal = |name: &str| enriched.get(name).cloned().unwrap_or(Value::Null);

    ForecastResult {
        zone1: prediction.zone1,
        zone2: prediction.zone2,
        zone3: prediction.zone3,
        hour: temporal("hour"),
        minute: temporal("minute"),
        month: temporal("month"),
        day: temporal("day"),
        year: temporal("year"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prediction_triple_from_row() {
        let triple = PredictionTriple::from_row(&[1.5, 2.5, 3.5]).unwrap();
        assert_eq!(triple.zone1, 1.5);
        assert_eq!(triple.zone2, 2.5);
        assert_eq!(triple.zone3, 3.5);
    }

    #[test]
    fn test_prediction_triple_rejects_wrong_width() {
        let result = PredictionTriple::from_row(&[1.0, 2.0]);
        assert!(matches!(
            result,
            Err(DomainError::PredictionShapeMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_assemble_copies_prediction_and_temporal_fields() {
        let mut enriched = Map::new();
        enriched.insert("Temperature".to_string(), json!(21.4));
        enriched.insert("hour".to_string(), json!(10));
        enriched.insert("minute".to_string(), json!(30));
        enriched.insert("month".to_string(), json!(5));
        enriched.insert("day".to_string(), json!(1));
        enriched.insert("year".to_string(), json!(2024));

        let prediction = PredictionTriple::from_row(&[1.5, 2.5, 3.5]).unwrap();
        let result = assemble(prediction, &enriched);

        assert_eq!(result.zone1, 1.5);
        assert_eq!(result.zone2, 2.5);
        assert_eq!(result.zone3, 3.5);
        assert_eq!(result.hour, json!(10));
        assert_eq!(result.minute, json!(30));
        assert_eq!(result.month, json!(5));
        assert_eq!(result.day, json!(1));
        assert_eq!(result.year, json!(2024));
    }

    #[test]
    fn test_assemble_propagates_missing_temporal_fields_as_null() {
        let enriched = Map::new();

        let prediction = PredictionTriple::from_row(&[0.1, 0.2, 0.3]).unwrap();
        let result = assemble(prediction, &enriched);

        assert_eq!(result.hour, Value::Null);
        assert_eq!(result.year, Value::Null);
    }

    #[test]
    fn test_forecast_result_serialized_field_names() {
        let mut enriched = Map::new();
        enriched.insert("hour".to_string(), json!(7));

        let prediction = PredictionTriple::from_row(&[1.5, 2.5, 3.5]).unwrap();
        let result = assemble(prediction, &enriched);

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["PowerConsumption_Zone1"], json!(1.5));
        assert_eq!(value["PowerConsumption_Zone2"], json!(2.5));
        assert_eq!(value["PowerConsumption_Zone3"], json!(3.5));
        assert_eq!(value["hour"], json!(7));
        assert_eq!(value["minute"], Value::Null);
    }

    #[test]
    fn test_ingest_event_decodes_with_defaulted_records() {
        let event: IngestEvent = serde_json::from_str("{}").unwrap();
        assert!(event.records.is_empty());

        let event: IngestEvent =
            serde_json::from_str(r#"{"records":[{"data":"eyJ9"}]}"#).unwrap();
        assert_eq!(event.records.len(), 1);
        assert_eq!(event.records[0].data, "eyJ9");
    }
}
