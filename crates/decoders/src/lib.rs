pub mod presets;
pub mod record;

pub use presets::{bench_config, environmental_config};
pub use record::{DecodeError, RecordDecoder};
