//! The raw file a user hands to the pipeline.

/// Filename used when the source carries none.
pub const FALLBACK_FILE_NAME: &str = "image.jpg";

const HEIF_EXTENSIONS: [&str; 2] = ["heic", "heif"];
const HEIF_MIME_TYPES: [&str; 2] = ["image/heic", "image/heif"];

/// A selected or dropped file: bytes, declared MIME type and filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    bytes: Vec<u8>,
    mime_type: String,
    name: String,
}

impl SourceFile {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            bytes,
            mime_type: mime_type.into(),
            name: if name.is_empty() {
                FALLBACK_FILE_NAME.to_string()
            } else {
                name
            },
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lowercased text after the last `.` in the filename.
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.name)
    }

    /// True when either the extension or the declared type names HEIC/HEIF.
    pub fn is_heif(&self) -> bool {
        let by_extension = self
            .extension()
            .is_some_and(|ext| HEIF_EXTENSIONS.contains(&ext.as_str()));
        let mime = self.mime_type.to_ascii_lowercase();
        by_extension || HEIF_MIME_TYPES.contains(&mime.as_str())
    }

    /// Drag-and-drop only accepts files declared as images.
    pub fn accepts_drop(&self) -> bool {
        self.mime_type.to_ascii_lowercase().starts_with("image/")
    }
}

pub(crate) fn extension_of(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

/// Swap a trailing `.heic`/`.heif` (any case) for `.jpg`.
pub fn heif_name_as_jpeg(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if HEIF_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) => {
            format!("{stem}.jpg")
        }
        _ => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_name_falls_back() {
        let file = SourceFile::new(vec![1], "image/jpeg", "");
        assert_eq!(file.name(), FALLBACK_FILE_NAME);
    }

    #[test]
    fn test_heif_by_extension_or_mime() {
        assert!(SourceFile::new(vec![], "", "IMG_0001.HEIC").is_heif());
        assert!(SourceFile::new(vec![], "", "photo.heif").is_heif());
        assert!(SourceFile::new(vec![], "image/heic", "upload.bin").is_heif());
        assert!(!SourceFile::new(vec![], "image/jpeg", "photo.jpg").is_heif());
        assert!(!SourceFile::new(vec![], "", "heic").is_heif());
    }

    #[test]
    fn test_extension_is_lowercased_last_segment() {
        let file = SourceFile::new(vec![], "", "holiday.final.PNG");
        assert_eq!(file.extension().as_deref(), Some("png"));
        assert_eq!(SourceFile::new(vec![], "", "README").extension(), None);
    }

    #[test]
    fn test_drop_acceptance() {
        assert!(SourceFile::new(vec![], "image/png", "a.png").accepts_drop());
        assert!(!SourceFile::new(vec![], "text/plain", "a.jpg").accepts_drop());
        assert!(!SourceFile::new(vec![], "", "a.jpg").accepts_drop());
    }

    #[test]
    fn test_heif_name_as_jpeg() {
        assert_eq!(heif_name_as_jpeg("IMG_0001.HEIC"), "IMG_0001.jpg");
        assert_eq!(heif_name_as_jpeg("a.b.heif"), "a.b.jpg");
        assert_eq!(heif_name_as_jpeg("photo.png"), "photo.png");
    }
}
