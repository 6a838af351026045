pub mod logger;
pub mod summary;

pub use logger::*;
pub use summary::*;
