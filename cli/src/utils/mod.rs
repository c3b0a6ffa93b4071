pub mod date;
pub mod format;
pub mod indicators;
pub mod logger;
pub mod returns;

pub use date::*;
pub use format::*;
pub use indicators::*;
pub use logger::*;
pub use returns::*;
