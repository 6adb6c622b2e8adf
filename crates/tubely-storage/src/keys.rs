//! Shared key generation for storage backends.
//!
//! Keys are unguessable: 32 bytes from the thread-local CSPRNG, encoded as
//! unpadded URL-safe base64 (43 characters). No collision check is made.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use uuid::Uuid;

/// Number of random bytes behind every generated key.
pub const KEY_ENTROPY_BYTES: usize = 32;

/// Extension used for video objects.
pub const VIDEO_EXTENSION: &str = "mp4";

/// Generate `[{prefix}/]{random}.{extension}`.
///
/// An empty prefix is treated as no prefix.
pub fn generate_key(prefix: Option<&str>, extension: &str) -> String {
    let mut raw = [0u8; KEY_ENTROPY_BYTES];
    rand::rng().fill_bytes(&mut raw);
    let name = URL_SAFE_NO_PAD.encode(raw);

    match prefix.map(|p| p.trim_matches('/')).filter(|p| !p.is_empty()) {
        Some(prefix) => format!("{}/{}.{}", prefix, name, extension),
        None => format!("{}.{}", name, extension),
    }
}

/// Generate a video key, partitioned by orientation when one is given.
pub fn generate_video_key(orientation: Option<&str>) -> String {
    generate_key(orientation, VIDEO_EXTENSION)
}

/// Key of a video's thumbnail: `{video_id}.{extension}`.
///
/// Re-uploading with the same extension overwrites the previous file.
pub fn thumbnail_key(video_id: Uuid, extension: &str) -> String {
    format!("{}.{}", video_id, extension)
}
