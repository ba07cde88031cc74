// The markdown module turns raw note text into classified blocks.
// It knows nothing about Google Docs - the docs module consumes its output.

pub mod line_classifier;
pub mod markdown_models;

pub use line_classifier::classify_text;
pub use markdown_models::{Block, BlockKind, ListMarker};
