//! Tubely Processing Library
//!
//! Media inspection and preparation: orientation probing with `ffprobe`,
//! faststart normalization with `ffmpeg`, and content type validation for
//! uploaded parts. The external tools sit behind the `MediaProbe` and
//! `MediaNormalizer` traits so callers can substitute them.

pub mod content_type;
pub mod normalize;
pub mod probe;

pub use content_type::{ContentTypeDescriptor, ContentTypeError};
pub use normalize::{FfmpegNormalizer, MediaNormalizer, NormalizeError};
pub use probe::{aspect_ratio, FfprobeProbe, MediaProbe, Orientation, ProbeError};
