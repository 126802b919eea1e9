pub mod config;
pub mod error;
pub mod geocoder;
pub mod layers;
pub mod loader;
pub mod pipeline;
pub mod placer;
pub mod records;

pub use error::{PipelineError, Result};
pub use records::{AddressRecord, LayerKind};
