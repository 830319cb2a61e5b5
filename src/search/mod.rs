pub mod engine;
pub mod matcher;

pub use engine::{search, SearchEngine};
pub use matcher::TextMatcher;
