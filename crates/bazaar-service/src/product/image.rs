//! Uploaded product image checks.

use bytes::Bytes;
use uuid::Uuid;

/// One image file from a listing form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Client-supplied file name, informational only.
    pub file_name: Option<String>,
    /// Declared MIME type.
    pub content_type: String,
    /// File contents.
    pub data: Bytes,
}

impl ImageUpload {
    /// Problem with this file, if any.
    pub fn check(&self, max_bytes: usize) -> Option<String> {
        let label = self.file_name.as_deref().unwrap_or("image");
        if !self.content_type.starts_with("image/") {
            return Some(format!("{label}: only image files are accepted"));
        }
        if self.data.is_empty() {
            return Some(format!("{label}: file is empty"));
        }
        if self.data.len() > max_bytes {
            return Some(format!("{label}: file exceeds {max_bytes} bytes"));
        }
        None
    }

    /// A fresh object name; client file names are never reused.
    pub fn object_name(&self) -> String {
        format!("{}.{}", Uuid::new_v4(), extension_for(&self.content_type))
    }
}

/// File extension for an image MIME type. Only raster formats keep
/// their own extension, so nothing uploaded is served as markup.
fn extension_for(content_type: &str) -> String {
    let subtype = content_type
        .strip_prefix("image/")
        .unwrap_or_default()
        .split(['+', ';'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match subtype.as_str() {
        "jpeg" | "pjpeg" => "jpg".to_string(),
        "png" | "gif" | "webp" | "avif" | "bmp" | "tiff" => subtype,
        _ => "bin".to_string(),
    }
}
