pub mod chart;
pub mod metrics;
pub mod news;
pub mod price;
pub mod ticker;
pub mod time_range;

pub use chart::*;
pub use metrics::*;
pub use news::*;
pub use price::*;
pub use ticker::*;
pub use time_range::*;
