pub mod artifact_writer;
pub mod captcha_service;
pub mod export_service;
pub mod gpa_service;

pub use artifact_writer::ArtifactWriter;
pub use captcha_service::{CaptchaClassifier, CaptchaResolver, CaptchaSource, VisionCaptchaClassifier};
pub use gpa_service::{CourseInfluence, GpaReport};
