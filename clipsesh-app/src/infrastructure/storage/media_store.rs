use std::path::{Path, PathBuf};

/// A file written by [`MediaStore::save`].
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub name: String,
    pub path: PathBuf,
    pub url: String,
}

/// A local directory exposed over HTTP at `{public_base}/{mount}/`.
#[derive(Debug, Clone)]
pub struct MediaStore {
    dir: PathBuf,
    public_base: String,
    mount: String,
}

impl MediaStore {
    pub fn new(dir: impl Into<PathBuf>, public_base: &str, mount: &str) -> Self {
        Self {
            dir: dir.into(),
            public_base: public_base.trim_end_matches('/').to_string(),
            mount: mount.trim_matches('/').to_string(),
        }
    }

    pub fn url_for(&self, name: &str) -> String {
        format!("{}/{}/{}", self.public_base, self.mount, name)
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// File name behind a URL this store handed out, if it is one of ours.
    pub fn name_from_url(&self, url: &str) -> Option<String> {
        let prefix = format!("{}/{}/", self.public_base, self.mount);
        let name = url.strip_prefix(&prefix)?;
        if name.is_empty() || name.contains('/') || name.contains('\\') || name.starts_with('.') {
            return None;
        }
        Some(name.to_string())
    }

    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Store bytes under a fresh `{uuid}.{ext}` name, extension taken from the
    /// client-supplied file name.
    pub async fn save(&self, original_name: Option<&str>, data: &[u8]) -> std::io::Result<StoredFile> {
        self.ensure_dir().await?;
        let name = format!("{}.{}", uuid::Uuid::new_v4(), extension_of(original_name));
        let path = self.path_for(&name);
        tokio::fs::write(&path, data).await?;
        Ok(StoredFile {
            url: self.url_for(&name),
            name,
            path,
        })
    }

    /// Best-effort removal of a file this store served. Failures are logged.
    pub async fn remove_by_url(&self, url: &str) {
        let Some(name) = self.name_from_url(url) else {
            return;
        };
        self.remove(&name).await;
    }

    pub async fn remove(&self, name: &str) {
        let path = self.path_for(name);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove {}: {}", path.display(), e);
            }
        }
    }

    /// Best-effort removal of every file in the directory.
    pub async fn clear(&self) {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to list {}: {}", self.dir.display(), e);
                }
                return;
            }
        };

        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let path = entry.path();
                    if path.is_file() {
                        if let Err(e) = tokio::fs::remove_file(&path).await {
                            tracing::warn!("Failed to remove {}: {}", path.display(), e);
                        }
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", self.dir.display(), e);
                    break;
                }
            }
        }
    }
}

fn extension_of(original_name: Option<&str>) -> String {
    original_name
        .and_then(|n| Path::new(n).extension())
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_else(|| "mp4".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_then_remove_by_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path(), "http://localhost:5000/", "uploads");

        let stored = store.save(Some("My Clip.MOV"), b"frames").await.unwrap();
        assert!(stored.name.ends_with(".mov"));
        assert_eq!(stored.url, format!("http://localhost:5000/uploads/{}", stored.name));
        assert!(stored.path.exists());

        store.remove_by_url(&stored.url).await;
        assert!(!stored.path.exists());
    }

    #[test]
    fn foreign_urls_are_ignored() {
        let store = MediaStore::new("uploads", "http://localhost:5000", "uploads");
        assert_eq!(store.name_from_url("https://clips.twitch.tv/abc"), None);
        assert_eq!(store.name_from_url("http://localhost:5000/uploads/../x"), None);
        assert_eq!(
            store.name_from_url("http://localhost:5000/uploads/a.mp4").as_deref(),
            Some("a.mp4")
        );
    }

    #[tokio::test]
    async fn clear_empties_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path(), "http://localhost:5000", "uploads");
        store.save(None, b"a").await.unwrap();
        store.save(None, b"b").await.unwrap();

        store.clear().await;
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
