pub mod calendar;
pub mod quote;
pub mod server;
