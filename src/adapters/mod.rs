// Adapters layer: concrete rate strategies for the remote provider and the local dataset.

pub mod fallback;
pub mod live;

pub use fallback::{FallbackDataset, FallbackStrategy};
pub use live::{LiveSettings, LiveStrategy};
