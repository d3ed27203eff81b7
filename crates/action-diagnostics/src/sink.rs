use async_trait::async_trait;
use page_adapter::{AdapterError, AdapterErrorKind, ArtifactRef, ArtifactSink};
use parking_lot::Mutex;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes artifacts as files under one directory.
#[derive(Debug, Clone)]
pub struct FsArtifactSink {
    root: PathBuf,
}

impl FsArtifactSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ArtifactSink for FsArtifactSink {
    async fn attach_artifact(
        &self,
        name: &str,
        bytes: Vec<u8>,
        mime_type: &str,
    ) -> Result<ArtifactRef, AdapterError> {
        let file_name: String = name
            .chars()
            .map(|ch| if ch == '/' || ch == '\\' { '_' } else { ch })
            .collect();
        let path = self.root.join(&file_name);
        let size_bytes = bytes.len();

        let written = tokio::task::spawn_blocking(move || write_atomic(path, &bytes))
            .await
            .map_err(|err| AdapterError::new(AdapterErrorKind::Internal).with_hint(err.to_string()))?
            .map_err(|err| {
                AdapterError::new(AdapterErrorKind::ArtifactStore).with_hint(err.to_string())
            })?;

        debug!(path = %written.display(), size_bytes, "artifact written");
        Ok(ArtifactRef {
            name: file_name,
            mime_type: mime_type.to_string(),
            size_bytes,
            location: Some(written),
        })
    }
}

fn write_atomic(path: PathBuf, data: &[u8]) -> io::Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&tmp)?;
    file.write_all(data)?;
    file.sync_all()?;
    fs::rename(tmp, &path)?;
    Ok(path)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtifact {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Keeps artifacts in memory.
#[derive(Debug, Default)]
pub struct MemoryArtifactSink {
    stored: Mutex<Vec<StoredArtifact>>,
    reject: bool,
}

impl MemoryArtifactSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that refuses every artifact.
    pub fn rejecting() -> Self {
        Self {
            stored: Mutex::new(Vec::new()),
            reject: true,
        }
    }

    pub fn len(&self) -> usize {
        self.stored.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.stored.lock().is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.stored.lock().iter().map(|a| a.name.clone()).collect()
    }

    pub fn artifacts(&self) -> Vec<StoredArtifact> {
        self.stored.lock().clone()
    }
}

#[async_trait]
impl ArtifactSink for MemoryArtifactSink {
    async fn attach_artifact(
        &self,
        name: &str,
        bytes: Vec<u8>,
        mime_type: &str,
    ) -> Result<ArtifactRef, AdapterError> {
        if self.reject {
            return Err(AdapterError::new(AdapterErrorKind::ArtifactStore)
                .with_hint(format!("sink rejected '{}'", name)));
        }
        let size_bytes = bytes.len();
        self.stored.lock().push(StoredArtifact {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            bytes,
        });
        Ok(ArtifactRef {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            size_bytes,
            location: None,
        })
    }
}
