//! Media library screen.
//!
//! Lists a folder of the media bucket, uploads and removes files, and
//! resolves public URLs. A path that isn't in the bucket resolves to
//! [`PLACEHOLDER_URL`] so galleries render a stand-in instead of a broken
//! image.

use vanguard_content::MediaItem;

use crate::backend::{Storage, StoredObject};
use crate::error::{AdminError, AdminResult};
use crate::service::ServiceHandle;

/// Image shown for media that can't be found.
pub const PLACEHOLDER_URL: &str = "/images/placeholder.svg";

/// MIME type for a file name, by extension.
#[must_use]
pub fn content_type_for(path: &str) -> &'static str {
    let extension = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        _ => "application/octet-stream",
    }
}

/// Storage-backed media screen for one folder.
#[derive(Debug)]
pub struct MediaScreen<B> {
    service: ServiceHandle<B>,
    folder: String,
    objects: Vec<StoredObject>,
    error: Option<String>,
}

impl<B: Storage> MediaScreen<B> {
    /// Creates an empty screen for `folder` (empty for the bucket root).
    #[must_use]
    pub fn new(service: ServiceHandle<B>, folder: &str) -> Self {
        Self {
            service,
            folder: folder.trim_matches('/').to_string(),
            objects: Vec::new(),
            error: None,
        }
    }

    /// Objects from the last successful listing.
    #[must_use]
    pub fn objects(&self) -> &[StoredObject] {
        &self.objects
    }

    /// Message for the last failed action.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Lists the folder. On failure the previous listing stays.
    pub async fn refresh(&mut self) -> bool {
        let prefix = self.prefix();
        match self.service.backend().list_objects(&prefix).await {
            Ok(objects) => {
                self.objects = objects;
                self.error = None;
                true
            }
            Err(e) => {
                self.fail("list media", &e);
                false
            }
        }
    }

    /// Uploads `bytes` as `name` inside the folder, then re-lists whether
    /// or not it succeeded.
    pub async fn upload(&mut self, name: &str, bytes: Vec<u8>) -> bool {
        let name = name.trim_matches('/');
        if name.is_empty() {
            self.error = Some("Choose a file name first.".to_string());
            return false;
        }

        let path = format!("{}{name}", self.prefix());
        let content_type = content_type_for(name);
        let uploaded = self.service.backend().upload(&path, bytes, content_type).await;
        self.complete(&format!("upload `{name}`"), uploaded).await
    }

    /// Removes an object, then re-lists whether or not it succeeded.
    pub async fn remove(&mut self, path: &str) -> bool {
        let removed = self.service.backend().remove(path).await;
        self.complete(&format!("remove `{path}`"), removed).await
    }

    /// Public URL for `path`, or the placeholder if it isn't listed.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if self.objects.iter().any(|o| o.path == path) {
            self.service.backend().public_url(path)
        } else {
            tracing::debug!(path, "media missing, using placeholder");
            PLACEHOLDER_URL.to_string()
        }
    }

    /// Public URL for a gallery entry.
    #[must_use]
    pub fn resolve(&self, item: &MediaItem) -> String {
        self.url_for(&item.path)
    }

    fn prefix(&self) -> String {
        if self.folder.is_empty() {
            String::new()
        } else {
            format!("{}/", self.folder)
        }
    }

    /// Shared tail of every mutation: re-list, keeping a mutation error
    /// visible over the resync.
    async fn complete(&mut self, action: &str, result: AdminResult<()>) -> bool {
        self.refresh().await;
        match result {
            Ok(()) => true,
            Err(e) => {
                self.fail(action, &e);
                false
            }
        }
    }

    fn fail(&mut self, action: &str, error: &AdminError) {
        tracing::warn!(%action, %error, "media action failed");
        self.error = Some(format!("Could not {action}: {error}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryBackend, Operation};

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for("a/B.PNG"), "image/png");
        assert_eq!(content_type_for("clip.webm"), "video/webm");
        assert_eq!(content_type_for("README"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_upload_lists_and_resolves() {
        let mut screen = MediaScreen::new(ServiceHandle::new(MemoryBackend::new()), "/images/");
        assert!(screen.upload("hero.png", vec![7; 4]).await);

        assert_eq!(screen.objects().len(), 1);
        assert_eq!(screen.objects()[0].path, "images/hero.png");
        assert_eq!(screen.objects()[0].content_type.as_deref(), Some("image/png"));
        assert_eq!(screen.url_for("images/hero.png"), "memory://media/images/hero.png");
        assert_eq!(screen.url_for("images/missing.png"), PLACEHOLDER_URL);
    }

    #[tokio::test]
    async fn test_failed_upload_resyncs_and_keeps_error() {
        let backend = MemoryBackend::new();
        backend.put_object("images/a.png", vec![1], "image/png");
        let mut screen = MediaScreen::new(ServiceHandle::new(backend), "images");
        assert!(screen.refresh().await);
        let lists_before = screen.service.backend().calls(Operation::ListObjects);

        screen.service.backend().fail_next(
            Operation::Upload,
            AdminError::Backend {
                status: 413,
                message: "payload too large".into(),
            },
        );
        assert!(!screen.upload("big.png", vec![0; 16]).await);

        assert_eq!(screen.objects().len(), 1);
        assert_eq!(screen.objects()[0].path, "images/a.png");
        assert!(screen.error().unwrap().contains("payload too large"));
        assert_eq!(screen.service.backend().calls(Operation::ListObjects), lists_before + 1);
    }

    #[tokio::test]
    async fn test_failed_upload_with_failed_resync_keeps_listing() {
        let backend = MemoryBackend::new();
        backend.put_object("images/a.png", vec![1], "image/png");
        let mut screen = MediaScreen::new(ServiceHandle::new(backend), "images");
        assert!(screen.refresh().await);

        screen.service.backend().set_offline(true);
        assert!(!screen.upload("b.png", vec![2]).await);
        assert_eq!(screen.objects().len(), 1);
        assert!(screen.error().unwrap().starts_with("Could not upload"));
    }

    #[tokio::test]
    async fn test_failed_remove_keeps_error_after_resync() {
        let backend = MemoryBackend::new();
        backend.put_object("images/a.png", vec![1], "image/png");
        let mut screen = MediaScreen::new(ServiceHandle::new(backend), "images");
        assert!(screen.refresh().await);

        screen.service.backend().fail_next(
            Operation::Remove,
            AdminError::Backend {
                status: 403,
                message: "not allowed".into(),
            },
        );
        assert!(!screen.remove("images/a.png").await);
        assert_eq!(screen.objects().len(), 1);
        assert!(screen.error().unwrap().contains("not allowed"));
        assert_eq!(screen.service.backend().calls(Operation::ListObjects), 2);
    }
}
