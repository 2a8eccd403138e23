// src/session.rs
use chrono::{DateTime, Local};
use log::{info, warn};
use serde_json::Value;

use crate::error::AppError;
use crate::render::export::export_json;
use crate::render::plan::{classify, RenderPlan};
use crate::upload::image::UploadedImage;

/// Where the interaction currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    ImageSelected,
    Submitting,
    ResultAvailable,
    Failed,
}

#[derive(Debug, Clone)]
pub struct ProcessingResult {
    pub value: Value,
    pub plan: RenderPlan,
    pub received_at: DateTime<Local>,
}

impl ProcessingResult {
    pub fn new(value: Value) -> Self {
        let plan = classify(&value);
        Self { value, plan, received_at: Local::now() }
    }

    pub fn export(&self) -> String {
        export_json(&self.value)
    }
}

/// State of one user's interaction: the selected image and at most one result
#[derive(Debug)]
pub struct Session {
    phase: Phase,
    image: Option<UploadedImage>,
    result: Option<ProcessingResult>,
    last_error: Option<AppError>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self { phase: Phase::Idle, image: None, result: None, last_error: None }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn image(&self) -> Option<&UploadedImage> {
        self.image.as_ref()
    }

    pub fn result(&self) -> Option<&ProcessingResult> {
        self.result.as_ref()
    }

    pub fn last_error(&self) -> Option<&AppError> {
        self.last_error.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == Phase::Submitting
    }

    /// Replace the selected image. Not allowed while a request is pending.
    pub fn select_image(&mut self, image: UploadedImage) -> Result<(), AppError> {
        if self.is_submitting() {
            return Err(AppError::Busy);
        }
        info!("Image selected: {}", image.filename());
        self.image = Some(image);
        self.last_error = None;
        if self.result.is_none() {
            self.phase = Phase::ImageSelected;
        }
        Ok(())
    }

    /// Record an error that happened outside a submission (e.g. a bad file)
    pub fn report(&mut self, err: AppError) {
        warn!("Reported error [{}]: {}", err.category(), err);
        self.last_error = Some(err);
    }

    /// Move to `Submitting` and hand out the image to send
    pub fn begin_submit(&mut self) -> Result<UploadedImage, AppError> {
        if self.is_submitting() {
            return Err(AppError::Busy);
        }
        let image = self.image.clone().ok_or(AppError::NoImageSelected)?;
        self.phase = Phase::Submitting;
        self.last_error = None;
        Ok(image)
    }

    pub fn finish_submit(&mut self, outcome: Result<Value, AppError>) {
        match outcome {
            Ok(value) => {
                let result = ProcessingResult::new(value);
                info!("Result available, rendering as {}", result.plan.kind());
                self.result = Some(result);
                self.phase = Phase::ResultAvailable;
            }
            Err(err) => {
                warn!("Submission failed [{}]: {}", err.category(), err);
                self.last_error = Some(err);
                self.phase = Phase::Failed;
            }
        }
    }

    pub fn reset(&mut self) {
        info!("Session reset");
        *self = Self::new();
    }

    pub fn export(&self) -> Option<String> {
        self.result.as_ref().map(ProcessingResult::export)
    }
}
