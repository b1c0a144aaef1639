use crate::domain::{FeatureRow, PredictionTriple, FEATURE_COUNT, PREDICTION_ZONES};
use common::{DomainError, DomainResult};
use ndarray::Array2;
use ort::session::Session;
use ort::value::Value;
use parking_lot::Mutex;

/// Trait for running the regression model over feature rows
///
/// Returns one prediction triple per input row, in input order.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait Forecaster: Send + Sync {
    fn predict(&self, rows: &[FeatureRow]) -> DomainResult<Vec<PredictionTriple>>;
}

/// ONNX Runtime implementation of the forecaster
///
/// The session is guarded by a mutex; inference takes a mutable session
/// handle and callers are sequential per invocation anyway.
pub struct OnnxForecaster {
    session: Mutex<Session>,
    output_name: String,
}

impl OnnxForecaster {
    pub fn new(session: Session) -> DomainResult<Self> {
        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| DomainError::PredictionError("model defines no output".to_string()))?;

        Ok(Self {
            session: Mutex::new(session),
            output_name,
        })
    }
}

impl Forecaster for OnnxForecaster {
    fn predict(&self, rows: &[FeatureRow]) -> DomainResult<Vec<PredictionTriple>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut flat = Vec::with_capacity(rows.len() * FEATURE_COUNT);
        for row in rows {
            flat.extend_from_slice(row);
        }

        let input = Array2::<f32>::from_shape_vec((rows.len(), FEATURE_COUNT), flat)
            .map_err(|e| DomainError::PredictionError(format!("failed to shape input: {e}")))?;

        let input_tensor = Value::from_array(input).map_err(|e| {
            DomainError::PredictionError(format!("failed to build input tensor: {e}"))
        })?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| DomainError::PredictionError(format!("inference failed: {e}")))?;

        let output = outputs.get(&self.output_name).ok_or_else(|| {
            DomainError::PredictionError(format!("model output {} missing", self.output_name))
        })?;

        let (_, data) = output.try_extract_tensor::<f32>().map_err(|e| {
            DomainError::PredictionError(format!("failed to read output tensor: {e}"))
        })?;

        let width = data.len() / rows.len();
        if width * rows.len() != data.len() || width != PREDICTION_ZONES {
            return Err(DomainError::PredictionShapeMismatch {
                expected: PREDICTION_ZONES,
                actual: width,
            });
        }

        data.chunks_exact(PREDICTION_ZONES)
            .map(PredictionTriple::from_row)
            .collect()
    }
}
