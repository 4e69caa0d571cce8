//! # Admin Table Screens
//!
//! One [`AdminScreen`] per content table. The screen owns what the admin
//! sees: the last fetched list, the search box, and the last error.
//!
//! ## Mutation flow
//!
//! 1. Send the mutation to the backend
//! 2. On success re-fetch the table once (the backend is the source of truth)
//! 3. On failure keep the displayed list, show the error, then re-fetch to
//!    resync; a failing resync leaves the list untouched
//!
//! There are no timed re-fetches. Every re-fetch is triggered by a
//! completed mutation or an explicit refresh.

use vanguard_content::{search, Record, UserRole};

use crate::backend::{fetch_records, insert_record, update_record, Backend};
use crate::error::{AdminError, AdminResult};
use crate::service::ServiceHandle;

/// CRUD screen for records of type `R`.
#[derive(Debug)]
pub struct AdminScreen<R, B> {
    service: ServiceHandle<B>,
    role: UserRole,
    items: Vec<R>,
    query: String,
    loading: bool,
    error: Option<String>,
    notice: Option<String>,
}

impl<R: Record, B: Backend> AdminScreen<R, B> {
    /// Creates an empty screen for an admin account. Call
    /// [`AdminScreen::refresh`] to load it.
    #[must_use]
    pub fn new(service: ServiceHandle<B>) -> Self {
        Self {
            service,
            role: UserRole::Admin,
            items: Vec::new(),
            query: String::new(),
            loading: false,
            error: None,
            notice: None,
        }
    }

    /// Sets the signed-in account's role. Viewers can't mutate.
    #[must_use]
    pub fn with_role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }

    /// Backend table this screen edits.
    #[must_use]
    pub fn table(&self) -> &'static str {
        R::TABLE
    }

    /// Every loaded record.
    #[must_use]
    pub fn items(&self) -> &[R] {
        &self.items
    }

    /// Records matching the search box.
    #[must_use]
    pub fn visible(&self) -> Vec<&R> {
        search(&self.items, &self.query)
    }

    /// Updates the search box. Filtering is local; nothing is fetched.
    pub fn search(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Current search text.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// True while a fetch is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message for the last failed action.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Message for the last successful mutation.
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Hides the error banner.
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Fetches the table. On failure the previous list stays on screen.
    ///
    /// Returns true on success.
    pub async fn refresh(&mut self) -> bool {
        match self.reload().await {
            Ok(()) => {
                self.error = None;
                true
            }
            Err(e) => {
                self.fail("load", &e);
                false
            }
        }
    }

    /// Deletes a record, then re-fetches.
    ///
    /// Returns true if the backend accepted the delete.
    pub async fn delete(&mut self, id: &str) -> bool {
        if !self.check_can_edit() {
            return false;
        }

        let result = self.service.backend().delete(R::TABLE, id).await;
        self.complete(&format!("delete `{id}`"), format!("Deleted `{id}`"), result)
            .await
    }

    /// Inserts a record whose id isn't loaded yet, updates it otherwise,
    /// then re-fetches.
    ///
    /// Returns true if the backend accepted the write.
    pub async fn save(&mut self, record: &R) -> bool {
        if !self.check_can_edit() {
            return false;
        }

        let exists = self.items.iter().any(|r| r.id() == record.id());
        let backend = self.service.backend();
        let result = if exists {
            update_record(backend, record).await
        } else {
            insert_record(backend, record).await
        };
        let id = record.id().to_string();
        self.complete(&format!("save `{id}`"), format!("Saved `{id}`"), result.map(|_| ()))
            .await
    }

    async fn reload(&mut self) -> AdminResult<()> {
        self.loading = true;
        let result = fetch_records::<R, B>(self.service.backend()).await;
        self.loading = false;

        let items = result?;
        tracing::debug!(table = R::TABLE, count = items.len(), "table loaded");
        self.items = items;
        Ok(())
    }

    /// Shared tail of every mutation: report, then resync.
    async fn complete(&mut self, action: &str, notice: String, result: AdminResult<()>) -> bool {
        match result {
            Ok(()) => {
                self.error = None;
                self.notice = Some(notice);
                if let Err(e) = self.reload().await {
                    self.fail("reload", &e);
                }
                true
            }
            Err(e) => {
                self.notice = None;
                self.fail(action, &e);
                if let Err(resync) = self.reload().await {
                    tracing::warn!(table = R::TABLE, error = %resync, "resync after failed mutation also failed");
                }
                false
            }
        }
    }

    fn check_can_edit(&mut self) -> bool {
        if self.role.can_edit() {
            return true;
        }
        self.error = Some("Your account is read-only.".to_string());
        false
    }

    fn fail(&mut self, action: &str, error: &AdminError) {
        tracing::warn!(table = R::TABLE, %action, %error, "admin action failed");
        self.error = Some(format!("Could not {action}: {error}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryBackend, Operation};
    use vanguard_content::GameInfo;

    fn info(id: &str, title: &str) -> GameInfo {
        GameInfo {
            id: id.to_string(),
            title: title.to_string(),
            body: String::new(),
            order: 0,
        }
    }

    async fn loaded() -> AdminScreen<GameInfo, MemoryBackend> {
        let backend = MemoryBackend::new();
        backend.seed(&[info("story", "Story"), info("modes", "Modes")]).unwrap();
        let mut screen = AdminScreen::new(ServiceHandle::new(backend));
        assert!(screen.refresh().await);
        screen
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_list() {
        let mut screen = loaded().await;
        screen.service.backend().set_offline(true);

        assert!(!screen.refresh().await);
        assert_eq!(screen.items().len(), 2);
        assert!(screen.error().unwrap().starts_with("Could not load"));
        assert!(!screen.is_loading());
    }

    #[tokio::test]
    async fn test_search_filters_locally() {
        let mut screen = loaded().await;
        screen.search("MOD");
        assert_eq!(screen.visible().len(), 1);
        screen.search("");
        assert_eq!(screen.visible().len(), 2);
        assert_eq!(screen.service.backend().calls(Operation::List), 1);
    }

    #[tokio::test]
    async fn test_save_inserts_then_updates() {
        let mut screen = loaded().await;
        assert!(screen.save(&info("lore", "Lore")).await);
        assert_eq!(screen.items().len(), 3);

        assert!(screen.save(&info("lore", "Deep Lore")).await);
        assert_eq!(screen.items().len(), 3);
        assert_eq!(screen.service.backend().calls(Operation::Update), 1);
        assert_eq!(screen.notice(), Some("Saved `lore`"));
    }

    #[tokio::test]
    async fn test_invalid_record_never_reaches_backend() {
        let mut screen = loaded().await;
        assert!(!screen.save(&info(" ", "Blank")).await);
        assert!(screen.error().is_some());
        assert_eq!(screen.service.backend().calls(Operation::Insert), 0);
    }

    #[tokio::test]
    async fn test_viewer_cannot_delete() {
        let mut screen = loaded().await.with_role(UserRole::Viewer);
        assert!(!screen.delete("story").await);
        assert_eq!(screen.error(), Some("Your account is read-only."));
        assert_eq!(screen.service.backend().calls(Operation::Delete), 0);
    }
}
