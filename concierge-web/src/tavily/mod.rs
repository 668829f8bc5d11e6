mod client;
mod types;

pub use client::TavilyClient;
pub use types::{TavilySearchRequest, normalize};
