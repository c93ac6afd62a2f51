//! Image classification pipeline.

use crate::pipeline::{Pipeline, PipelineOptions, Task};
use crate::text_classification::{extract_classifications, Classification};
use crate::tokenizer::Tokenizer;
use hfbridge_core::{BridgeError, ImageInput, Result};
use pyo3::prelude::*;
use pyo3::types::{PyBytes, PyDict};

/// Image classification parameters; absent values defer to the runtime.
#[derive(Debug, Clone, Default)]
pub struct ImageClassificationParams {
    /// Post-processing function: "sigmoid", "softmax" or "none"
    pub function_to_apply: Option<String>,
    pub top_k: Option<i64>,
    /// Advisory fetch timeout (seconds) forwarded to the runtime
    pub timeout: Option<f64>,
}

impl ImageClassificationParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_function_to_apply(mut self, function_to_apply: impl Into<String>) -> Self {
        self.function_to_apply = Some(function_to_apply.into());
        self
    }

    pub fn with_top_k(mut self, top_k: i64) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_timeout(mut self, timeout: f64) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Pipeline bound to the `image-classification` task.
#[derive(Debug)]
pub struct ImageClassificationPipeline {
    inner: Pipeline,
}

impl ImageClassificationPipeline {
    pub fn from_model(model: &str, options: &PipelineOptions) -> Result<Self> {
        Ok(Self {
            inner: Pipeline::load(Task::ImageClassification, model, options)?,
        })
    }

    /// Classify an image addressed by local path or URL.
    pub fn classify(
        &self,
        image: &str,
        params: &ImageClassificationParams,
    ) -> Result<Vec<Classification>> {
        if image.trim().is_empty() {
            return Err(BridgeError::invalid_argument(
                "image path or URL must not be empty",
            ));
        }
        let operation = "image_classification.classify";
        self.inner.with(operation, |py, pipeline| {
            let kwargs = classification_kwargs(py, params)?;
            let result = pipeline.call((image,), Some(&kwargs))?;
            extract_classifications(operation, &result)
        })
    }

    /// Classify a raw image buffer. The byte layout is described by the
    /// input's explicit width, height, and pixel mode.
    pub fn classify_image(
        &self,
        image: &ImageInput,
        params: &ImageClassificationParams,
    ) -> Result<Vec<Classification>> {
        if image.bytes.is_empty() {
            return Err(BridgeError::invalid_argument(
                "image buffer must not be empty",
            ));
        }
        if image.width == 0 || image.height == 0 {
            return Err(BridgeError::invalid_argument(
                "image dimensions must be non-zero",
            ));
        }
        let operation = "image_classification.classify_image";
        self.inner.with(operation, |py, pipeline| {
            let pil = py.import("PIL.Image")?;
            let data = PyBytes::new(py, &image.bytes);
            let decoded = pil.getattr("frombytes")?.call1((
                image.pixel_mode.as_channel_mode(),
                (image.width, image.height),
                data,
            ))?;

            let kwargs = classification_kwargs(py, params)?;
            let result = pipeline.call((decoded,), Some(&kwargs))?;
            extract_classifications(operation, &result)
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

fn classification_kwargs<'py>(
    py: Python<'py>,
    params: &ImageClassificationParams,
) -> Result<Bound<'py, PyDict>> {
    let kwargs = PyDict::new(py);
    if let Some(function_to_apply) = &params.function_to_apply {
        kwargs.set_item("function_to_apply", function_to_apply.as_str())?;
    }
    if let Some(top_k) = params.top_k {
        kwargs.set_item("top_k", top_k)?;
    }
    if let Some(timeout) = params.timeout {
        kwargs.set_item("timeout", timeout)?;
    }
    Ok(kwargs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hfbridge_core::PixelMode;

    #[test]
    fn zero_sized_images_are_rejected() {
        let pipeline = ImageClassificationPipeline {
            inner: Pipeline::stub_disposed(),
        };
        let image = ImageInput::new(vec![0u8; 12], 0, 4, PixelMode::Rgb);
        let err = pipeline.classify_image(&image, &ImageClassificationParams::new());
        assert!(matches!(
            err.unwrap_err(),
            BridgeError::InvalidArgument(_)
        ));
    }

    #[test]
    fn empty_image_buffer_is_rejected() {
        let pipeline = ImageClassificationPipeline {
            inner: Pipeline::stub_disposed(),
        };
        let image = ImageInput::new(Vec::new(), 2, 2, PixelMode::Greyscale);
        let err = pipeline.classify_image(&image, &ImageClassificationParams::new());
        assert!(matches!(
            err.unwrap_err(),
            BridgeError::InvalidArgument(_)
        ));
    }
}
