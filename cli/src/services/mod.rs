pub mod export;
pub mod historical_news;
pub mod market_data;
pub mod memo;
pub mod news_service;

pub use export::*;
pub use historical_news::*;
pub use market_data::*;
pub use memo::*;
pub use news_service::*;
