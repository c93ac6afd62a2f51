//! Object detection pipeline.

use crate::pipeline::{Pipeline, PipelineOptions, Task};
use crate::record;
use crate::tokenizer::Tokenizer;
use hfbridge_core::tensor::narrow;
use hfbridge_core::{BridgeError, Result};
use pyo3::prelude::*;
use pyo3::types::PyDict;
use serde::{Deserialize, Serialize};

/// Bounding box in image pixel coordinates. `xmin <= xmax` and
/// `ymin <= ymax` hold for every box the facade returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionBox {
    pub xmin: i32,
    pub ymin: i32,
    pub xmax: i32,
    pub ymax: i32,
}

/// One detected object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub score: f64,
    pub bounds: DetectionBox,
}

/// Detection parameters; absent values defer to the runtime.
#[derive(Debug, Clone, Default)]
pub struct DetectionParams {
    pub threshold: Option<f64>,
    /// Advisory fetch timeout (seconds) forwarded to the runtime
    pub timeout: Option<f64>,
}

impl DetectionParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum confidence threshold
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Set the fetch timeout in seconds
    pub fn with_timeout(mut self, timeout: f64) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Pipeline bound to the `object-detection` task.
#[derive(Debug)]
pub struct ObjectDetectionPipeline {
    inner: Pipeline,
}

impl ObjectDetectionPipeline {
    pub fn from_model(model: &str, options: &PipelineOptions) -> Result<Self> {
        Ok(Self {
            inner: Pipeline::load(Task::ObjectDetection, model, options)?,
        })
    }

    /// Detect objects in an image addressed by local path or URL.
    ///
    /// Box coordinates narrow from the runtime's wide integers with checked
    /// conversion; overflow is reported, never truncated.
    pub fn detect(&self, image: &str, params: &DetectionParams) -> Result<Vec<Detection>> {
        if image.trim().is_empty() {
            return Err(BridgeError::invalid_argument(
                "image path or URL must not be empty",
            ));
        }
        let operation = "object_detection.detect";
        self.inner.with(operation, |py, pipeline| {
            let kwargs = PyDict::new(py);
            if let Some(threshold) = params.threshold {
                kwargs.set_item("threshold", threshold)?;
            }
            if let Some(timeout) = params.timeout {
                kwargs.set_item("timeout", timeout)?;
            }

            let result = pipeline.call((image,), Some(&kwargs))?;
            let records = record::as_record_list(operation, &result)?;
            records
                .iter()
                .map(|item| {
                    let label = record::require_str(operation, &item, "label")?;
                    let score = record::require_f64(operation, &item, "score")?;
                    let raw = record::require(operation, &item, "box")?;
                    let bounds = DetectionBox {
                        xmin: narrow("xmin", record::require_i64(operation, &raw, "xmin")?)?,
                        ymin: narrow("ymin", record::require_i64(operation, &raw, "ymin")?)?,
                        xmax: narrow("xmax", record::require_i64(operation, &raw, "xmax")?)?,
                        ymax: narrow("ymax", record::require_i64(operation, &raw, "ymax")?)?,
                    };
                    validate_box(operation, &bounds)?;
                    Ok(Detection {
                        label,
                        score,
                        bounds,
                    })
                })
                .collect()
        })
    }

    pub fn device(&self) -> &str {
        self.inner.device()
    }

    pub fn tokenizer(&self) -> Result<&Tokenizer> {
        self.inner.tokenizer()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }

    pub fn dispose(&mut self) -> Result<()> {
        self.inner.dispose()
    }
}

fn validate_box(operation: &'static str, bounds: &DetectionBox) -> Result<()> {
    if bounds.xmin > bounds.xmax || bounds.ymin > bounds.ymax {
        return Err(BridgeError::contract(
            operation,
            format!(
                "degenerate box: xmin={} xmax={} ymin={} ymax={}",
                bounds.xmin, bounds.xmax, bounds.ymin, bounds.ymax
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_boxes_pass_validation() {
        let bounds = DetectionBox {
            xmin: 10,
            ymin: 20,
            xmax: 110,
            ymax: 220,
        };
        assert!(validate_box("detect", &bounds).is_ok());

        // Zero-area boxes are still ordered
        let point = DetectionBox {
            xmin: 5,
            ymin: 5,
            xmax: 5,
            ymax: 5,
        };
        assert!(validate_box("detect", &point).is_ok());
    }

    #[test]
    fn inverted_boxes_are_contract_violations() {
        let bounds = DetectionBox {
            xmin: 100,
            ymin: 0,
            xmax: 10,
            ymax: 50,
        };
        assert!(matches!(
            validate_box("detect", &bounds).unwrap_err(),
            BridgeError::Contract { .. }
        ));
    }

    #[test]
    fn empty_image_reference_is_rejected() {
        let pipeline = ObjectDetectionPipeline {
            inner: Pipeline::stub_disposed(),
        };
        let err = pipeline.detect("", &DetectionParams::new());
        assert!(matches!(
            err.unwrap_err(),
            BridgeError::InvalidArgument(_)
        ));
    }
}
