pub mod candle;
pub mod granularity;
pub mod span;

pub use candle::{Candle, CandleSeries};
pub use granularity::Granularity;
pub use span::{display_time, parse_bound, TimeSpan, DISPLAY_FORMAT};
