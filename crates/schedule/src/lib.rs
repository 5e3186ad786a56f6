mod cutoff;
mod menu;
mod window;

pub use cutoff::*;
pub use menu::*;
pub use window::*;
