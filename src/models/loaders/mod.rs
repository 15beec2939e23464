pub mod record_loader;

pub use record_loader::{load_courses, load_credentials, load_ignore_words, read_lines};
