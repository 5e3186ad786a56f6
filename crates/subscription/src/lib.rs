mod ledger;
mod lifecycle;
mod pricing;

pub use ledger::*;
pub use lifecycle::*;
pub use pricing::*;
