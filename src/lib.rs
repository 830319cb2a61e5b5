pub mod classify;
pub mod config;
pub mod document;
pub mod errors;
pub mod filters;
pub mod library;
pub mod results;
pub mod search;

pub use crate::config::{SearchCriteria, SearchPreset};
pub use crate::document::{Document, ElementId, ElementKind, InputProperty};
pub use crate::errors::{SearchError, SearchResult};
pub use crate::filters::{FilterContext, FilterMatch, NodeTypeFilter};
pub use crate::library::{LibraryEntry, LibraryIndex};
pub use crate::results::{PathNode, SearchResults};
pub use crate::search::search;
