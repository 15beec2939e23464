pub mod codec;
pub mod course;
pub mod credentials;
pub mod loaders;
pub mod point_scale;
pub mod transcript;

pub use course::{Course, CourseEdit, PointMode};
pub use credentials::Credentials;
pub use loaders::{load_courses, load_credentials, load_ignore_words};
pub use point_scale::{point_from_score, score_from_point};
pub use transcript::{ScrapedTab, TranscriptRow, TranscriptSection};
