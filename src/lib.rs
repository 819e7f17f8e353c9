// Library exports for desprite

pub mod app;
pub mod config;
pub mod css;
pub mod error;
pub mod model;
pub mod pipeline;

// Re-export commonly used types
pub use error::{CssParseError, DeclarationError, FindError, ScaleError, SplitError};
pub use model::part::{Part, Rect};
pub use pipeline::{find, parts, splitter};
