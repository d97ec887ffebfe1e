use crate::env::{parse_or, string_or};

#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub dir: String,
    pub public_base_url: String,
    pub max_file_size: usize,
}

impl UploadConfig {
    pub fn from_env() -> Self {
        Self {
            dir: string_or("UPLOAD_DIR", "storage/uploads"),
            public_base_url: string_or("UPLOAD_BASE_URL", "http://localhost:8000/uploads"),
            max_file_size: parse_or("UPLOAD_MAX_BYTES", 5 * 1024 * 1024),
        }
    }
}
