pub mod client;
pub mod segmenter;

pub use client::*;
pub use segmenter::*;
