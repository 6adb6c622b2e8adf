/// Largest accepted video upload request body (1 GiB).
pub const MAX_VIDEO_UPLOAD_BYTES: usize = 1 << 30;

/// Largest accepted thumbnail upload request body (10 MiB).
pub const MAX_THUMBNAIL_UPLOAD_BYTES: usize = 10 << 20;

/// Body limit for JSON endpoints.
pub const MAX_JSON_BODY_BYTES: usize = 1 << 20;

pub const VIDEO_FORM_FIELD: &str = "video";
pub const THUMBNAIL_FORM_FIELD: &str = "thumbnail";

/// Prefix and suffix of the temp file an upload is spooled to.
pub const UPLOAD_TEMP_PREFIX: &str = "tubely-upload";
pub const UPLOAD_TEMP_SUFFIX: &str = ".mp4";

/// Upper bound on in-flight requests across the server.
pub const HTTP_CONCURRENCY_LIMIT: usize = 1024;
