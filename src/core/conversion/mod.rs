pub mod conversion_config;
pub mod conversion_service;

pub use conversion_config::{ConversionConfig, RunMode, ServiceAccountKey};
pub use conversion_service::{plan_note, read_note, ConversionService};
