use std::fs;
use std::path::Path;

use comicfeed_engine::AtomicFileWriter;
use feed_logging::{feed_error, feed_info, feed_warn};
use serde::{Deserialize, Serialize};

const PROGRESS_FILENAME: &str = ".comicfeed_progress.ron";

/// Snapshot of how far the last session got through a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingProgress {
    pub resource_id: String,
    pub items_seen: usize,
    pub updated_at: String,
}

pub fn load_progress(dir: &Path) -> Option<ReadingProgress> {
    let path = dir.join(PROGRESS_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return None;
        }
        Err(err) => {
            feed_warn!("Failed to read progress from {:?}: {}", path, err);
            return None;
        }
    };

    match ron::from_str(&content) {
        Ok(progress) => {
            feed_info!("Loaded reading progress from {:?}", path);
            Some(progress)
        }
        Err(err) => {
            feed_warn!("Failed to parse progress from {:?}: {}", path, err);
            None
        }
    }
}

pub fn save_progress(dir: &Path, progress: &ReadingProgress) {
    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(progress, pretty) {
        Ok(text) => text,
        Err(err) => {
            feed_error!("Failed to serialize reading progress: {}", err);
            return;
        }
    };

    let writer = AtomicFileWriter::new(dir.to_path_buf());
    if let Err(err) = writer.write(PROGRESS_FILENAME, content.as_bytes()) {
        feed_error!("Failed to write progress to {:?}: {}", dir, err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_round_trips_through_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let progress = ReadingProgress {
            resource_id: "comic-7".to_string(),
            items_seen: 25,
            updated_at: "2026-08-25T00:00:00Z".to_string(),
        };

        save_progress(dir.path(), &progress);
        let loaded = load_progress(dir.path()).expect("progress present");
        assert_eq!(loaded, progress);
    }

    #[test]
    fn missing_progress_file_is_none() {
        let dir = tempfile::TempDir::new().unwrap();
        assert_eq!(load_progress(dir.path()), None);
    }

    #[test]
    fn corrupt_progress_file_is_tolerated() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join(PROGRESS_FILENAME), "not ron at all").unwrap();
        assert_eq!(load_progress(dir.path()), None);
    }
}
