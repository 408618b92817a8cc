pub mod classifier;
pub mod tailer;
