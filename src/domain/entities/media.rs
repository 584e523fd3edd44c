use actix_multipart::form::{tempfile::TempFile, MultipartForm};

use crate::errors::AppError;

/// Media categories accepted by the admin upload endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Pdf,
}

impl MediaKind {
    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Pdf => "PDF",
        }
    }

    fn accepts(&self, mime_type: &str) -> bool {
        match self {
            MediaKind::Image => mime_type.starts_with("image/"),
            MediaKind::Pdf => mime_type == "application/pdf",
        }
    }
}

#[derive(Debug, MultipartForm)]
pub struct ProjectImageUpload {
    #[multipart(limit = "5MB")]
    pub image: TempFile,
}

/// A file received from an upload, read into memory and type-checked.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Sniffs the content instead of trusting the client-declared type.
    pub fn new(file_name: Option<String>, bytes: Vec<u8>, kind: MediaKind) -> Result<Self, AppError> {
        if bytes.is_empty() {
            return Err(AppError::InvalidInput("Uploaded file is empty".into()));
        }

        let mime_type = infer::get(&bytes)
            .map(|t| t.mime_type().to_string())
            .filter(|mime| kind.accepts(mime))
            .ok_or_else(|| {
                AppError::InvalidInput(format!("Uploaded file must be a valid {}", kind.label()))
            })?;

        let file_name = file_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("upload.{}", default_extension(&mime_type)));

        Ok(UploadedFile { file_name, mime_type, bytes })
    }

    /// Reads a multipart temp file; the handle is dropped before returning.
    pub async fn from_temp_file(temp: TempFile, kind: MediaKind) -> Result<Self, AppError> {
        let bytes = tokio::fs::read(temp.file.path()).await?;
        Self::new(temp.file_name, bytes, kind)
    }
}

fn default_extension(mime_type: &str) -> &str {
    mime_type.rsplit('/').next().unwrap_or("bin")
}
