use crate::domain::{ClipDescriptor, SeasonArchive};
use crate::infrastructure::db::SeasonZipRepository;
use crate::infrastructure::fetch::ClipSource;
use crate::infrastructure::storage::{ArchiveError, MediaStore, ZipSink};
use clipsesh_errors::AppError;
use std::fs::File;
use std::io::{Seek, Write};
use std::sync::Arc;
use uuid::Uuid;

/// Result of folding clips into an archive: what made it in, what did not.
pub struct ArchiveBuild<W: Write + Seek> {
    sink: ZipSink<W>,
    pub archived: Vec<String>,
    pub failed: Vec<String>,
}

impl<W: Write + Seek + Send + 'static> ArchiveBuild<W> {
    pub fn new(inner: W) -> Self {
        Self {
            sink: ZipSink::new(inner),
            archived: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Fetch one clip and append it. A failed fetch is recorded and skipped;
    /// a failed write aborts the build.
    pub async fn push(mut self, source: &dyn ClipSource, clip: &ClipDescriptor) -> Result<Self, AppError> {
        let data = match source.fetch(&clip.url).await {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Skipping clip {}: {}", clip.url, e);
                self.failed.push(clip.url.clone());
                return Ok(self);
            }
        };

        let name = clip.entry_name();
        let mut sink = self.sink;
        let (sink, written) = tokio::task::spawn_blocking(move || {
            let written = sink.append(&name, &data);
            (sink, written)
        })
        .await
        .map_err(AppError::internal)?;

        self.sink = sink;
        self.archived.push(written.map_err(AppError::internal)?);
        Ok(self)
    }

    pub async fn finish(self) -> Result<(W, Vec<String>, Vec<String>), AppError> {
        let sink = self.sink;
        let inner = tokio::task::spawn_blocking(move || sink.finish())
            .await
            .map_err(AppError::internal)?
            .map_err(AppError::internal)?;
        Ok((inner, self.archived, self.failed))
    }
}

#[derive(Clone)]
pub struct SeasonArchiver {
    zips: SeasonZipRepository,
    downloads: MediaStore,
    source: Arc<dyn ClipSource>,
}

impl SeasonArchiver {
    pub fn new(zips: SeasonZipRepository, downloads: MediaStore, source: Arc<dyn ClipSource>) -> Self {
        Self {
            zips,
            downloads,
            source,
        }
    }

    /// Bundle every non-denied clip into `processed-{millis}.zip` and record it.
    pub async fn process_season(
        &self,
        clips: Vec<ClipDescriptor>,
        season: &str,
    ) -> Result<SeasonArchive, AppError> {
        let season = require_season(season)?;
        let wanted: Vec<ClipDescriptor> = clips.into_iter().filter(|c| !c.rating.is_deny()).collect();

        self.downloads.ensure_dir().await.map_err(AppError::internal)?;
        let name = format!("processed-{}.zip", chrono::Utc::now().timestamp_millis());
        let path = self.downloads.path_for(&name);

        tracing::info!("Building {} for season {} from {} clips", name, season, wanted.len());

        let built = self.build(&path, &wanted).await;
        let (archived, failed, size) = match built {
            Ok(done) => done,
            Err(e) => {
                self.downloads.remove(&name).await;
                return Err(e);
            }
        };

        if !failed.is_empty() {
            tracing::warn!("{} of {} clips could not be fetched", failed.len(), wanted.len());
        }

        let created = self
            .zips
            .create(
                self.downloads.url_for(&name),
                season,
                name.clone(),
                size,
                clamp_count(archived.len()),
            )
            .await;
        let record = match created {
            Ok(record) => record,
            Err(e) => {
                self.downloads.remove(&name).await;
                return Err(AppError::internal(e));
            }
        };

        tracing::info!("Stored {} ({} bytes, {} clips)", name, size, archived.len());
        Ok(record.into())
    }

    async fn build(
        &self,
        path: &std::path::Path,
        clips: &[ClipDescriptor],
    ) -> Result<(Vec<String>, Vec<String>, i64), AppError> {
        let create_path = path.to_path_buf();
        let file = tokio::task::spawn_blocking(move || File::create(create_path))
            .await
            .map_err(AppError::internal)?
            .map_err(AppError::internal)?;

        let mut build = ArchiveBuild::new(file);
        for clip in clips {
            build = build.push(self.source.as_ref(), clip).await?;
        }
        let (mut file, archived, failed) = build.finish().await?;

        let size = tokio::task::spawn_blocking(move || -> Result<u64, ArchiveError> {
            file.flush()?;
            Ok(file.seek(std::io::SeekFrom::End(0))?)
        })
        .await
        .map_err(AppError::internal)?
        .map_err(AppError::internal)?;

        Ok((archived, failed, i64::try_from(size).unwrap_or(i64::MAX)))
    }

    /// Record an archive assembled elsewhere and uploaded as-is.
    pub async fn register_upload(
        &self,
        file_name: Option<String>,
        data: bytes::Bytes,
        season: &str,
        clip_amount: i32,
    ) -> Result<SeasonArchive, AppError> {
        let season = require_season(season)?;
        if clip_amount < 0 {
            return Err(AppError::Validation("clipAmount must not be negative".to_string()));
        }
        if data.is_empty() {
            return Err(AppError::Validation("A zip file is required".to_string()));
        }

        let stored = self
            .downloads
            .save(Some(file_name.as_deref().unwrap_or("archive.zip")), &data)
            .await
            .map_err(AppError::internal)?;

        let created = self
            .zips
            .create(
                stored.url,
                season,
                stored.name.clone(),
                i64::try_from(data.len()).unwrap_or(i64::MAX),
                clip_amount,
            )
            .await;
        match created {
            Ok(record) => Ok(record.into()),
            Err(e) => {
                self.downloads.remove(&stored.name).await;
                Err(AppError::internal(e))
            }
        }
    }

    pub async fn list(&self) -> Result<Vec<SeasonArchive>, AppError> {
        let rows = self.zips.list().await.map_err(AppError::internal)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let record = self
            .zips
            .find_by_id(id)
            .await
            .map_err(AppError::internal)?
            .ok_or_else(|| AppError::not_found("Zip"))?;
        self.zips.delete(id).await.map_err(AppError::internal)?;
        self.downloads.remove_by_url(&record.url).await;
        tracing::info!("Deleted archive {}", record.name);
        Ok(())
    }
}

fn require_season(season: &str) -> Result<String, AppError> {
    let season = season.trim();
    if season.is_empty() {
        return Err(AppError::Validation("Season is required".to_string()));
    }
    Ok(season.to_string())
}

fn clamp_count(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}
