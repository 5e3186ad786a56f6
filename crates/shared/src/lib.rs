mod date;
mod error;
mod meal;

pub use date::*;
pub use error::*;
pub use meal::*;
