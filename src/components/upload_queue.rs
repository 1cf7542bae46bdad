//! Batch upload queue for the wallpaper create screen.

use log::{error, info};
use serde::Serialize;

use crate::domain::file::UploadFile;
use crate::domain::types::{EntryId, WallpaperId, WallpaperTitle};
use crate::domain::wallpaper::{NewWallpaper, WallpaperSettings};
use crate::repository::WallpaperWriter;
use crate::repository::errors::RepositoryError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum UploadStatus {
    Pending,
    Uploading,
    Done,
    Error(String),
}

/// One selected file and its upload progress.
#[derive(Debug, Clone, Serialize)]
pub struct UploadEntry {
    pub id: EntryId,
    pub file_name: String,
    pub title: String,
    pub status: UploadStatus,
    /// 0 to 100.
    pub progress: u8,
    #[serde(skip)]
    pub file: UploadFile,
    pub wallpaper_id: Option<WallpaperId>,
}

impl UploadEntry {
    /// Queues `file`; a blank `title` falls back to the file stem.
    pub fn new(file: UploadFile, title: Option<&str>) -> Self {
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| file.stem())
            .to_string();

        Self {
            id: EntryId::new(),
            file_name: file.file_name.clone(),
            title,
            status: UploadStatus::Pending,
            progress: 0,
            file,
            wallpaper_id: None,
        }
    }
}

/// Counts reported once a batch finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    pub done: usize,
    pub failed: usize,
    pub pending: usize,
}

fn failure_message(err: &RepositoryError) -> String {
    match err {
        RepositoryError::Rejected(message) => message.clone(),
        RepositoryError::Request { message, .. } if !message.is_empty() => message.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Default)]
pub struct UploadQueue {
    entries: Vec<UploadEntry>,
}

impl UploadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[UploadEntry] {
        &self.entries
    }

    /// Queues a file behind the ones already selected.
    pub fn push(&mut self, file: UploadFile, title: Option<&str>) {
        self.entries.push(UploadEntry::new(file, title));
    }

    pub fn summary(&self) -> UploadSummary {
        self.entries
            .iter()
            .fold(UploadSummary::default(), |mut summary, entry| {
                match entry.status {
                    UploadStatus::Done => summary.done += 1,
                    UploadStatus::Error(_) => summary.failed += 1,
                    UploadStatus::Pending | UploadStatus::Uploading => summary.pending += 1,
                }
                summary
            })
    }

    /// Uploads every pending entry one after another with the shared
    /// `settings`. A failed entry is marked and the batch moves on.
    pub async fn upload_all<W>(&mut self, repo: &W, settings: &WallpaperSettings) -> UploadSummary
    where
        W: WallpaperWriter + ?Sized,
    {
        for entry in &mut self.entries {
            if entry.status != UploadStatus::Pending {
                continue;
            }

            let title = match WallpaperTitle::new(entry.title.as_str()) {
                Ok(title) => title,
                Err(e) => {
                    entry.status = UploadStatus::Error(e.to_string());
                    continue;
                }
            };

            entry.status = UploadStatus::Uploading;
            entry.progress = 0;

            let wallpaper = NewWallpaper {
                title,
                settings: settings.clone(),
                image: entry.file.clone(),
            };

            match repo.create_wallpaper(&wallpaper).await {
                Ok(created) => {
                    info!("Uploaded {} as wallpaper {}", entry.file_name, created.id);
                    entry.status = UploadStatus::Done;
                    entry.progress = 100;
                    entry.wallpaper_id = Some(created.id);
                }
                Err(e) => {
                    error!("Failed to upload {}: {e}", entry.file_name);
                    entry.status = UploadStatus::Error(failure_message(&e));
                    entry.progress = 0;
                }
            }
        }

        self.summary()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::types::{CategoryId, Tags};
    use crate::domain::wallpaper::{
        UpdateWallpaper, Wallpaper, WallpaperFormat, WallpaperStatus,
    };
    use crate::repository::errors::RepositoryResult;

    /// Records created titles and rejects the ones listed in `reject`.
    struct RecordingWriter {
        reject: Vec<&'static str>,
        created: Mutex<Vec<String>>,
    }

    impl RecordingWriter {
        fn new(reject: Vec<&'static str>) -> Self {
            Self {
                reject,
                created: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl WallpaperWriter for RecordingWriter {
        async fn create_wallpaper(&self, wallpaper: &NewWallpaper) -> RepositoryResult<Wallpaper> {
            let title = wallpaper.title.as_str().to_string();
            self.created.lock().unwrap().push(title.clone());
            if self.reject.contains(&title.as_str()) {
                return Err(RepositoryError::Rejected("Image too large".to_string()));
            }
            Ok(Wallpaper {
                id: WallpaperId::new(format!("id-{title}")).unwrap(),
                title,
                image: wallpaper.image.file_name.clone(),
                thumbnail: None,
                category: None,
                tags: wallpaper.settings.tags.as_slice().to_vec(),
                format: Some(wallpaper.settings.format),
                status: wallpaper.settings.status,
                created_at: None,
            })
        }

        async fn update_wallpaper(
            &self,
            _id: &WallpaperId,
            _updates: &UpdateWallpaper,
        ) -> RepositoryResult<Wallpaper> {
            Err(RepositoryError::NotFound)
        }

        async fn delete_wallpaper(&self, _id: &WallpaperId) -> RepositoryResult<()> {
            Ok(())
        }
    }

    fn settings() -> WallpaperSettings {
        WallpaperSettings {
            category: CategoryId::new("c1").unwrap(),
            tags: Tags::parse("nature, sky"),
            format: WallpaperFormat::Jpg,
            status: WallpaperStatus::Active,
        }
    }

    fn file(name: &str) -> UploadFile {
        UploadFile::new(name, Some("image/jpeg".to_string()), vec![1, 2, 3])
    }

    #[test]
    fn selected_files_become_entries_in_order() {
        let mut queue = UploadQueue::new();
        for name in ["a.jpg", "b.png", "c.webp"] {
            queue.push(file(name), None);
        }

        let titles: Vec<_> = queue.entries().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
        assert!(queue
            .entries()
            .iter()
            .all(|e| e.status == UploadStatus::Pending && e.progress == 0));
    }

    #[test]
    fn explicit_title_overrides_file_stem() {
        let entry = UploadEntry::new(file("IMG_001.jpg"), Some("  Sunset  "));
        assert_eq!(entry.title, "Sunset");

        let entry = UploadEntry::new(file("IMG_001.jpg"), Some("   "));
        assert_eq!(entry.title, "IMG_001");
    }

    #[tokio::test]
    async fn failure_is_isolated_to_its_entry() {
        let repo = RecordingWriter::new(vec!["two"]);
        let mut queue = UploadQueue::new();
        for name in ["one.jpg", "two.jpg", "three.jpg"] {
            queue.push(file(name), None);
        }

        let summary = queue.upload_all(&repo, &settings()).await;

        let statuses: Vec<_> = queue.entries().iter().map(|e| e.status.clone()).collect();
        assert_eq!(
            statuses,
            vec![
                UploadStatus::Done,
                UploadStatus::Error("Image too large".to_string()),
                UploadStatus::Done,
            ]
        );
        assert_eq!(queue.entries()[0].progress, 100);
        assert_eq!(queue.entries()[1].progress, 0);
        assert_eq!(
            summary,
            UploadSummary {
                done: 2,
                failed: 1,
                pending: 0
            }
        );
        assert_eq!(
            *repo.created.lock().unwrap(),
            vec!["one".to_string(), "two".to_string(), "three".to_string()]
        );
    }
}
