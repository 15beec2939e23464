pub mod launcher;

pub use launcher::ChromiumLauncher;
