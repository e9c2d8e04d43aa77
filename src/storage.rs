use std::{
    fs,
    path::{Component, Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to create upload directory {0:?}: {1}")]
    CreateDir(PathBuf, std::io::Error),
    #[error("failed to write upload: {0}")]
    Write(std::io::Error),
    #[error("failed to read upload: {0}")]
    Read(std::io::Error),
    #[error("upload not found: {0}")]
    NotFound(String),
    #[error("invalid upload filename: {0}")]
    InvalidName(String),
}

/// On-disk store for uploaded images. Each upload gets a unique name
/// (millisecond timestamp plus a random suffix) so concurrent requests never
/// clobber each other's file. Files are kept after the request, matching the
/// serving contract of `GET /uploads/{filename}`; there is no cleanup.
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| StorageError::CreateDir(root.clone(), e))?;
        Ok(Self { root })
    }

    pub fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, StorageError> {
        let extension = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| e.chars().all(char::is_alphanumeric))
            .unwrap_or("jpg")
            .to_ascii_lowercase();

        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let name = format!("upload_{}_{:08x}.{}", millis, rand::random::<u32>(), extension);

        fs::write(self.root.join(&name), bytes).map_err(StorageError::Write)?;

        Ok(name)
    }

    pub fn read(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(name)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(StorageError::Read(e)),
        }
    }

    // Containment check: a served name must be a single plain path component.
    fn resolve(&self, name: &str) -> Result<PathBuf, StorageError> {
        let candidate = Path::new(name);
        let mut components = candidate.components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.root.join(candidate)),
            _ => Err(StorageError::InvalidName(name.to_string())),
        }
    }
}
