/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Reference to a stored image (URL or storage path).
pub type ImageRef = String;

/// Monotonically increasing token identifying one upload attempt.
pub type UploadAttempt = u64;
