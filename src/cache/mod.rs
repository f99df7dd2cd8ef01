pub mod gaps;
pub mod store;
pub mod sync;

pub use gaps::missing_spans;
pub use store::{JsonFileStore, SeriesStore};
pub use sync::{augment_bounds, augment_bounds_at, CandleCache};
