// The core module contains all conversion logic.
// Each concern gets its own submodule.

#[path = "markdown/mod.rs"]
pub mod markdown;

#[path = "docs/mod.rs"]
pub mod docs;

#[path = "conversion/mod.rs"]
pub mod conversion;
