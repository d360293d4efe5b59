//! Image upload pipeline: validate, resize to a fixed canvas, write to disk.

use axum::body::Bytes;
use axum::extract::Multipart;
use image::{imageops::FilterType, DynamicImage, ImageFormat, ImageReader, Limits};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const IMAGE_SIZE: u32 = 200;
/// Largest width or height accepted for decoding
pub const MAX_IMAGE_DIMENSION: u32 = 4096;
const FILE_FIELD: &str = "file";
const NAME_BYTES: usize = 10;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file was uploaded")]
    MissingFile,

    #[error("File extension not allowed: {0}")]
    ExtensionNotAllowed(String),

    #[error("File content does not match its extension")]
    ContentMismatch,

    #[error("File could not be read as an image: {0}")]
    Decode(String),

    #[error("File exceeds the {0} byte limit")]
    TooLarge(usize),

    #[error("Malformed upload: {0}")]
    Multipart(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Accepted upload formats, keyed by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
}

impl ImageKind {
    /// Classify by extension; only `png` and `jpg` are accepted
    pub fn from_filename(filename: &str) -> Result<Self, UploadError> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "png" => Ok(ImageKind::Png),
            "jpg" => Ok(ImageKind::Jpeg),
            _ => Err(UploadError::ExtensionNotAllowed(ext)),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageKind::Png => "png",
            ImageKind::Jpeg => "jpg",
        }
    }

    fn format(self) -> ImageFormat {
        match self {
            ImageKind::Png => ImageFormat::Png,
            ImageKind::Jpeg => ImageFormat::Jpeg,
        }
    }
}

/// Raw file part pulled out of a multipart body
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Bytes,
}

/// An upload that passed validation and is safe to persist
#[derive(Debug)]
pub struct ValidatedImage {
    kind: ImageKind,
    bytes: Bytes,
}

/// Read the `file` field from a multipart body
pub async fn read_file_field(multipart: &mut Multipart) -> Result<UploadedFile, UploadError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::Multipart(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| UploadError::Multipart(e.body_text()))?;
        return Ok(UploadedFile { filename, bytes });
    }
    Err(UploadError::MissingFile)
}

/// Random hex name with the given extension
pub fn generate_filename(kind: ImageKind) -> String {
    let bytes: [u8; NAME_BYTES] = rand::random();
    format!("{}.{}", hex::encode(bytes), kind.extension())
}

/// Writes resized images into one directory
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Check extension, size and content signature. Nothing is written.
    pub fn validate(&self, upload: UploadedFile) -> Result<ValidatedImage, UploadError> {
        let kind = ImageKind::from_filename(&upload.filename)?;

        if upload.bytes.len() > self.max_bytes {
            return Err(UploadError::TooLarge(self.max_bytes));
        }

        let sniffed = image::guess_format(&upload.bytes).map_err(|_| UploadError::ContentMismatch)?;
        if sniffed != kind.format() {
            return Err(UploadError::ContentMismatch);
        }

        Ok(ValidatedImage {
            kind,
            bytes: upload.bytes,
        })
    }

    /// Resize to `IMAGE_SIZE`x`IMAGE_SIZE` and write under a fresh random name.
    /// Returns the stored filename.
    pub async fn save(&self, image: ValidatedImage) -> Result<String, UploadError> {
        let kind = image.kind;
        let encoded = tokio::task::spawn_blocking(move || resize_and_encode(&image.bytes, kind))
            .await
            .map_err(|e| UploadError::Encode(e.to_string()))??;

        tokio::fs::create_dir_all(&self.dir).await?;

        let filename = generate_filename(kind);
        let final_path = self.dir.join(&filename);
        let partial_path = self.dir.join(format!("{}.part", filename));

        tokio::fs::write(&partial_path, &encoded).await?;
        if let Err(e) = tokio::fs::rename(&partial_path, &final_path).await {
            let _ = tokio::fs::remove_file(&partial_path).await;
            return Err(e.into());
        }

        tracing::info!("Stored image {} ({} bytes)", final_path.display(), encoded.len());
        Ok(filename)
    }

    /// Best-effort removal of a stored file
    pub async fn remove(&self, filename: &str) {
        let path = self.dir.join(filename);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!("Failed to remove {}: {}", path.display(), e);
        }
    }
}

fn resize_and_encode(bytes: &[u8], kind: ImageKind) -> Result<Vec<u8>, UploadError> {
    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_IMAGE_DIMENSION);
    limits.max_image_height = Some(MAX_IMAGE_DIMENSION);

    let mut reader = ImageReader::with_format(Cursor::new(bytes), kind.format());
    reader.limits(limits);
    let decoded = reader.decode().map_err(|e| UploadError::Decode(e.to_string()))?;

    let resized = decoded.resize_exact(IMAGE_SIZE, IMAGE_SIZE, FilterType::Lanczos3);

    // JPEG has no alpha channel
    let resized = match kind {
        ImageKind::Jpeg => DynamicImage::ImageRgb8(resized.to_rgb8()),
        ImageKind::Png => resized,
    };

    let mut out = Cursor::new(Vec::new());
    resized
        .write_to(&mut out, kind.format())
        .map_err(|e| UploadError::Encode(e.to_string()))?;
    Ok(out.into_inner())
}
