//! Demographic capture
//!
//! Produces the (age group, gender) pair forwarded on order creation. The
//! kiosk calls [`DemographicCapture::capture`] exactly once per entry into
//! attribute capture; any timeout belongs to the implementation.

use std::time::Duration;

use async_trait::async_trait;
use shared::{Demographics, Gender};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("Capture device unavailable")]
    Unavailable,

    #[error("Capture failed: {0}")]
    Failed(String),
}

#[async_trait]
pub trait DemographicCapture: Send + Sync {
    async fn capture(&self) -> Result<Demographics, CaptureError>;
}

/// Answers the customer typed in on the survey screen
#[derive(Debug, Clone, Copy)]
pub struct SurveyCapture {
    answers: Demographics,
}

impl SurveyCapture {
    pub fn new(answers: Demographics) -> Self {
        Self { answers }
    }
}

#[async_trait]
impl DemographicCapture for SurveyCapture {
    async fn capture(&self) -> Result<Demographics, CaptureError> {
        Ok(self.answers)
    }
}

/// One frame's worth of face estimation
#[async_trait]
pub trait AgeGenderEstimator: Send + Sync {
    /// Raw (age in years, gender) of the first detected face, if any
    async fn detect(&self) -> Result<Option<(f32, Gender)>, CaptureError>;
}

/// Frames tried before giving up: 30 s at the default interval
pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;

/// Polls an estimator until a face shows up or the attempts run out
pub struct CameraCapture<E> {
    estimator: E,
    interval: Duration,
    max_attempts: u32,
}

impl<E: AgeGenderEstimator> CameraCapture<E> {
    pub fn new(estimator: E) -> Self {
        Self {
            estimator,
            interval: Duration::from_millis(500),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Give up after `attempts` frames without a face
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }
}

#[async_trait]
impl<E: AgeGenderEstimator> DemographicCapture for CameraCapture<E> {
    async fn capture(&self) -> Result<Demographics, CaptureError> {
        let mut attempts = 0u32;
        loop {
            if let Some((age, gender)) = self.estimator.detect().await? {
                let demographics = Demographics::from_estimate(age, gender);
                tracing::debug!(age, age_group = %demographics.age_group, %gender, "Face detected");
                return Ok(demographics);
            }
            attempts += 1;
            if attempts >= self.max_attempts {
                return Err(CaptureError::Failed(format!(
                    "No face detected after {} attempts",
                    attempts
                )));
            }
            tokio::time::sleep(self.interval).await;
        }
    }
}
