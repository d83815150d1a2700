mod clip_source;

pub use clip_source::{ClipSource, FetchError, HttpClipSource};
