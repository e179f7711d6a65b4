pub mod console;
pub mod progress;

pub use progress::{ProgressEvent, ProgressSink};
