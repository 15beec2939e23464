pub mod login_flow;
pub mod scrape_flow;

pub use login_flow::{LoginFlow, LoginOutcome, LoginSettings, LoginState};
pub use scrape_flow::{ScrapeFlow, ScrapeOutcome, ScrapeSettings};
