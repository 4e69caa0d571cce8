//! Offline back office run.
//!
//! Seeds an in-memory backend from the catalog and drives the admin screens
//! through a load, a search, a delete and a media lookup. Only the first
//! media item gets a stored file, so the rest resolve to the placeholder.

use anyhow::{bail, Context, Result};
use vanguard_admin::media::content_type_for;
use vanguard_admin::{AdminScreen, MediaScreen, MemoryBackend, ServiceHandle, PLACEHOLDER_URL};
use vanguard_content::{Catalog, Hero, NewsArticle};

/// Catalog shipped with the content crate.
pub const BUNDLED_CATALOG: &str = include_str!("../../vanguard_content/data/catalog.toml");

/// What the offline run saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfflineReport {
    /// Heroes listed by the hero screen.
    pub heroes: usize,
    /// Heroes matching the sample search.
    pub matched: usize,
    /// News articles after deleting the newest one.
    pub news_after_delete: usize,
    /// Media items that resolved to the placeholder.
    pub placeholders: usize,
}

/// Runs the admin screens against a [`MemoryBackend`] seeded from `catalog`.
///
/// # Errors
/// Fails if seeding fails or a screen reports an error.
pub async fn run_back_office(catalog: &Catalog, query: &str) -> Result<OfflineReport> {
    let backend = MemoryBackend::new();
    backend.seed(catalog.heroes()).context("failed to seed heroes")?;
    let news: Vec<NewsArticle> = catalog.news(None).into_iter().cloned().collect();
    backend.seed(&news).context("failed to seed news")?;
    if let Some(item) = catalog.media().first() {
        backend.put_object(&item.path, Vec::new(), content_type_for(&item.path));
    }
    let service = ServiceHandle::new(backend);

    let mut heroes = AdminScreen::<Hero, _>::new(service.clone());
    if !heroes.refresh().await {
        bail!("hero screen: {}", heroes.error().unwrap_or("load failed"));
    }
    heroes.search(query);
    let matched = heroes.visible().len();

    let mut articles = AdminScreen::<NewsArticle, _>::new(service.clone());
    if !articles.refresh().await {
        bail!("news screen: {}", articles.error().unwrap_or("load failed"));
    }
    if let Some(id) = articles.items().first().map(|a| a.id.clone()) {
        if !articles.delete(&id).await {
            bail!("news screen: {}", articles.error().unwrap_or("delete failed"));
        }
        tracing::info!(%id, "deleted newest article");
    }

    let mut media = MediaScreen::new(service, "");
    if !media.refresh().await {
        bail!("media screen: {}", media.error().unwrap_or("list failed"));
    }
    let placeholders = catalog
        .media()
        .iter()
        .filter(|item| media.resolve(item) == PLACEHOLDER_URL)
        .count();

    Ok(OfflineReport {
        heroes: heroes.items().len(),
        matched,
        news_after_delete: articles.items().len(),
        placeholders,
    })
}
