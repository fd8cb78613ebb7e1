use std::{ffi::OsStr, str::FromStr};

use error::{StoreError, StoreResult};
use time::{OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};
use tracing::debug;

pub mod error;
pub mod file_store;

const IMAGES_PATH_PREFIX: &str = "images";

const MAX_PATH_LEN: usize = 4095;
const MAX_SEGMENT_LEN: usize = 255;
const MAX_PATH_DEPTH: usize = 10;
const PATH_INVALID_CHARS: &str = r#"\:"#;

pub enum StorePrefix {
    Images,
}

impl StorePrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorePrefix::Images => IMAGES_PATH_PREFIX,
        }
    }
}

fn is_segment_invalid(s: &str) -> bool {
    s.is_empty()
        || s.starts_with(".")
        || s.len() > MAX_SEGMENT_LEN
        || s.chars()
            .any(|c| PATH_INVALID_CHARS.contains(c) || c.is_ascii_control())
}

fn validate_path(path: &str) -> StoreResult<()> {
    if path.is_empty() {
        return Err(StoreError::InvalidPath);
    }
    if path.starts_with("/") || path.ends_with("/") {
        return Err(StoreError::InvalidPath);
    }
    if path.len() > MAX_PATH_LEN {
        return Err(StoreError::InvalidPath);
    }
    let segments = path.split('/').collect::<Vec<_>>();
    if segments.len() > MAX_PATH_DEPTH {
        return Err(StoreError::InvalidPath);
    }
    let invalid_path = segments.into_iter().any(is_segment_invalid);
    if invalid_path {
        Err(StoreError::InvalidPath)
    } else {
        Ok(())
    }
}

const IMAGE_NAME_STAMP: &[BorrowedFormatItem] =
    format_description!("[year][month][day]_[hour][minute][second]");

pub fn image_file_name(disc_id: i64, ext: &str, at: OffsetDateTime) -> String {
    let stamp = at.format(&IMAGE_NAME_STAMP).unwrap(); // safe - const description
    format!("disc_{disc_id}_{stamp}.{ext}")
}

/// Store path for a newly attached disc image, stamped with the current UTC time.
pub fn image_path(disc_id: i64, ext: &str) -> StoreResult<ValidPath> {
    let name = image_file_name(disc_id, ext, OffsetDateTime::now_utc());
    Ok(ValidPath::new(name)?.with_prefix(StorePrefix::Images))
}

pub fn file_ext(path: impl AsRef<OsStr>) -> Option<String> {
    std::path::Path::new(path.as_ref())
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
}

/// relative path, utf8, validated not to escape root and use . segments and some special chars
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidPath(String);

impl ValidPath {
    pub fn new(path: impl Into<String>) -> StoreResult<Self> {
        let path = path.into();
        validate_path(path.as_str()).inspect_err(|_| debug!("Invalid path: {path}"))?;
        Ok(ValidPath(path))
    }
    pub fn with_prefix(self, prefix: StorePrefix) -> Self {
        ValidPath(format!("{}/{}", prefix.as_str(), self.0))
    }

    pub fn without_prefix(self, expected_prefix: StorePrefix) -> StoreResult<Self> {
        match self.0.split_once('/') {
            Some((prefix, path)) => {
                if prefix == expected_prefix.as_str() {
                    Ok(ValidPath(path.into()))
                } else {
                    Err(StoreError::InvalidPath)
                }
            }
            None => Err(StoreError::InvalidPath),
        }
    }
}

impl FromStr for ValidPath {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValidPath::new(s)
    }
}

impl AsRef<str> for ValidPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<ValidPath> for String {
    fn from(path: ValidPath) -> Self {
        path.0
    }
}

#[derive(Debug)]
pub struct StoreInfo {
    /// final path where the file is stored, relative to the store root
    pub final_path: ValidPath,
    pub size: u64,
    /// SHA256 hash
    pub hash: String,
}
