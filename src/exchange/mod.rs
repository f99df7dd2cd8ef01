pub mod auth;
pub mod candles;
pub mod client;
pub mod pagination;
pub mod transport;

pub use auth::ApiCredentials;
pub use candles::{fill_span, max_request_window, plan_chunks, MAX_POINTS_PER_REQUEST};
pub use client::ExchangeClient;
pub use pagination::fetch_all_pages;
pub use transport::{ApiResponse, HttpTransport, Transport};
