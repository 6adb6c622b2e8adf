//! Test fixtures: small media blobs.

/// Ten bytes starting with the PNG signature.
pub fn png_bytes() -> Vec<u8> {
    vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x01]
}

pub fn jpeg_bytes() -> Vec<u8> {
    vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46]
}

/// Bytes standing in for an MP4; the media tools are faked in tests.
pub fn mp4_bytes() -> Vec<u8> {
    let mut data = vec![0x00, 0x00, 0x00, 0x18];
    data.extend_from_slice(b"ftypmp42");
    data.extend((0..4096u32).map(|i| (i % 251) as u8));
    data
}
