pub mod combine;
pub mod dispatch;
pub mod info;
pub mod merge;
pub mod plans;
pub mod plot;
pub mod run;
pub mod sweep;

pub use dispatch::dispatch;
