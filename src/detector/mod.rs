//! Binding between an inference backend and the decoder.
//!
//! Network loading and execution live outside this crate. A backend only has
//! to turn one input image into a raw record buffer plus the original image
//! size; [`Detector`] runs it once per call and decodes the result.

use crate::decode::{decode, DecodeConfig, Detections};
use crate::trace::{trace_event, trace_span};
use crate::util::DetResult;

/// Raw output of one forward pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawOutput {
    /// Row-major detection records.
    pub data: Vec<f32>,
    /// Width of the original image in pixels.
    pub image_width: u32,
    /// Height of the original image in pixels.
    pub image_height: u32,
}

/// Produces raw detection buffers from input images.
///
/// Implementations block until the output is ready. Failures should be
/// reported as [`DetError::Backend`](crate::DetError::Backend).
pub trait InferenceBackend {
    /// Image type accepted by the backend.
    type Input: ?Sized;

    /// Runs one forward pass.
    fn infer(&mut self, input: &Self::Input) -> DetResult<RawOutput>;
}

impl<B: InferenceBackend + ?Sized> InferenceBackend for &mut B {
    type Input = B::Input;

    fn infer(&mut self, input: &Self::Input) -> DetResult<RawOutput> {
        (**self).infer(input)
    }
}

/// Runs a backend and decodes its output.
pub struct Detector<B> {
    backend: B,
    cfg: DecodeConfig,
}

impl<B: InferenceBackend> Detector<B> {
    /// Creates a detector with the default decode configuration.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            cfg: DecodeConfig::default(),
        }
    }

    /// Replaces the decode configuration.
    pub fn with_config(mut self, cfg: DecodeConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn config(&self) -> &DecodeConfig {
        &self.cfg
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Runs inference on `input` and returns suppressed detections.
    pub fn detect(&mut self, input: &B::Input) -> DetResult<Detections> {
        let _span = trace_span!("detect").entered();
        self.cfg.validate()?;
        let output = self.backend.infer(input)?;
        trace_event!("inference_done", values = output.data.len());
        decode(
            &output.data,
            output.image_width,
            output.image_height,
            &self.cfg,
        )
    }

    /// Like [`detect`](Self::detect) but with per-call thresholds.
    pub fn detect_with(
        &mut self,
        input: &B::Input,
        score_threshold: f32,
        nms_threshold: f32,
    ) -> DetResult<Detections> {
        let cfg = DecodeConfig {
            score_threshold,
            nms: crate::nms::NmsConfig {
                iou_threshold: nms_threshold,
                ..self.cfg.nms.clone()
            },
            ..self.cfg.clone()
        };
        cfg.validate()?;
        let output = self.backend.infer(input)?;
        decode(&output.data, output.image_width, output.image_height, &cfg)
    }
}
