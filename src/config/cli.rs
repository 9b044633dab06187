use crate::core::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

pub const PROJECT_FILE_NAME: &str = "soapui-project.xml";

/// Filesystem storage for generated project documents.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    /// Writes the project document under the default file name and
    /// returns the full path written.
    pub async fn write_project(&self, document: &str) -> Result<PathBuf> {
        self.write_file(PROJECT_FILE_NAME, document.as_bytes())
            .await?;
        Ok(Path::new(&self.base_path).join(PROJECT_FILE_NAME))
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}
