//! # Content Catalog
//!
//! Read-only snapshot of the public site content, loaded once from TOML:
//!
//! ```toml
//! [[heroes]]
//! id = "bastion"
//! name = "Bastion"
//! role = "tank"
//! description = "..."
//!
//! [[news]]
//! id = "s4-launch"
//! title = "Season 4 is live"
//! category = "announcements"
//! published = "2024-03-09"
//! ```
//!
//! Records are validated and checked for duplicate ids at load time, so
//! queries never fail.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ContentError, ContentResult};
use crate::model::{search, GameInfo, Hero, MediaItem, NewsArticle, Record, Role};

/// All public content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Catalog {
    heroes: Vec<Hero>,
    news: Vec<NewsArticle>,
    game_info: Vec<GameInfo>,
    media: Vec<MediaItem>,
}

impl Catalog {
    /// Builds a catalog from already-loaded records.
    ///
    /// # Errors
    /// Returns [`ContentError::DuplicateId`] or
    /// [`ContentError::InvalidRecord`] for the first bad record.
    pub fn new(
        heroes: Vec<Hero>,
        news: Vec<NewsArticle>,
        game_info: Vec<GameInfo>,
        media: Vec<MediaItem>,
    ) -> ContentResult<Self> {
        let mut catalog = Self {
            heroes,
            news,
            game_info,
            media,
        };
        catalog.prepare()?;
        Ok(catalog)
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    /// Returns [`ContentError::Parse`] for malformed TOML, otherwise as
    /// [`Catalog::new`].
    pub fn from_toml_str(source: &str) -> ContentResult<Self> {
        let mut catalog: Self = toml::from_str(source).map_err(|e| ContentError::Parse(e.to_string()))?;
        catalog.prepare()?;
        Ok(catalog)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    /// Returns [`ContentError::Io`] if the file can't be read, otherwise as
    /// [`Catalog::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> ContentResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| ContentError::Io(format!("{}: {e}", path.display())))?;
        let catalog = Self::from_toml_str(&source)?;
        tracing::info!(
            path = %path.display(),
            heroes = catalog.heroes.len(),
            news = catalog.news.len(),
            game_info = catalog.game_info.len(),
            media = catalog.media.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    fn prepare(&mut self) -> ContentResult<()> {
        check_table(&self.heroes)?;
        check_table(&self.news)?;
        check_table(&self.game_info)?;
        check_table(&self.media)?;

        // Stable sorts keep file order for ties.
        self.news.sort_by_key(|a| std::cmp::Reverse(a.published_on()));
        self.game_info.sort_by_key(|info| info.order);
        Ok(())
    }

    /// Every hero in file order.
    #[must_use]
    pub fn heroes(&self) -> &[Hero] {
        &self.heroes
    }

    /// Heroes with the given role.
    pub fn heroes_by_role(&self, role: Role) -> impl Iterator<Item = &Hero> + '_ {
        self.heroes.iter().filter(move |h| h.role == role)
    }

    /// Hero by id.
    #[must_use]
    pub fn hero(&self, id: &str) -> Option<&Hero> {
        self.heroes.iter().find(|h| h.id == id)
    }

    /// Heroes matching a search box query.
    #[must_use]
    pub fn search_heroes(&self, query: &str) -> Vec<&Hero> {
        search(&self.heroes, query)
    }

    /// News, newest first, optionally limited to one category.
    #[must_use]
    pub fn news(&self, category: Option<&str>) -> Vec<&NewsArticle> {
        self.news
            .iter()
            .filter(|a| category.map_or(true, |c| a.category.eq_ignore_ascii_case(c)))
            .collect()
    }

    /// Distinct news categories in first-seen order.
    #[must_use]
    pub fn news_categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.news
            .iter()
            .map(|a| a.category.as_str())
            .filter(|c| seen.insert(*c))
            .collect()
    }

    /// Game overview sections in display order.
    #[must_use]
    pub fn game_info(&self) -> &[GameInfo] {
        &self.game_info
    }

    /// Every media item.
    #[must_use]
    pub fn media(&self) -> &[MediaItem] {
        &self.media
    }

    /// Media item by id.
    #[must_use]
    pub fn media_item(&self, id: &str) -> Option<&MediaItem> {
        self.media.iter().find(|m| m.id == id)
    }
}

/// Validates every record and rejects repeated ids.
///
/// # Errors
/// Returns the first [`ContentError::InvalidRecord`] or
/// [`ContentError::DuplicateId`].
pub fn check_table<R: Record>(records: &[R]) -> ContentResult<()> {
    let mut ids = HashSet::with_capacity(records.len());
    for record in records {
        record.validate()?;
        if !ids.insert(record.id()) {
            return Err(ContentError::DuplicateId {
                table: R::TABLE,
                id: record.id().to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [[heroes]]
        id = "bastion"
        name = "Bastion"
        role = "tank"
        description = "Holds the line."

        [[heroes]]
        id = "vesper"
        name = "Vesper"
        role = "support"
        description = "Field medic."

        [[news]]
        id = "old"
        title = "Beta opens"
        category = "announcements"
        published = "2023-11-02"

        [[news]]
        id = "new"
        title = "Patch 1.2"
        category = "patch-notes"
        published = "2024-01-15"

        [[game_info]]
        id = "modes"
        title = "Game Modes"
        body = "..."
        order = 2

        [[game_info]]
        id = "story"
        title = "Story"
        body = "..."
        order = 1
    "#;

    #[test]
    fn test_news_is_newest_first() {
        let catalog = Catalog::from_toml_str(SAMPLE).unwrap();
        let ids: Vec<&str> = catalog.news(None).iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);

        let patches = catalog.news(Some("PATCH-NOTES"));
        assert_eq!(patches.len(), 1);
        assert_eq!(catalog.news_categories(), vec!["patch-notes", "announcements"]);
    }

    #[test]
    fn test_impossible_date_rejected_at_load() {
        let source = r#"
            [[news]]
            id = "bad"
            title = "Broken"
            category = "patch-notes"
            published = "2024-13-45"
        "#;
        let err = Catalog::from_toml_str(source).unwrap_err();
        assert!(matches!(err, ContentError::InvalidRecord { table: "news", .. }));
    }

    #[test]
    fn test_news_sorts_by_calendar_date() {
        let source = r#"
            [[news]]
            id = "feb"
            title = "Leap day"
            category = "esports"
            published = "2024-02-29"

            [[news]]
            id = "dec"
            title = "Year end"
            category = "esports"
            published = "2023-12-31"

            [[news]]
            id = "mar"
            title = "Spring"
            category = "esports"
            published = "2024-03-01"
        "#;
        let catalog = Catalog::from_toml_str(source).unwrap();
        let ids: Vec<&str> = catalog.news(None).iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["mar", "feb", "dec"]);
    }

    #[test]
    fn test_game_info_sorted_by_order() {
        let catalog = Catalog::from_toml_str(SAMPLE).unwrap();
        assert_eq!(catalog.game_info()[0].id, "story");
    }

    #[test]
    fn test_role_filter() {
        let catalog = Catalog::from_toml_str(SAMPLE).unwrap();
        let tanks: Vec<&Hero> = catalog.heroes_by_role(Role::Tank).collect();
        assert_eq!(tanks.len(), 1);
        assert_eq!(tanks[0].name, "Bastion");
        assert_eq!(catalog.heroes_by_role(Role::Damage).count(), 0);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let source = r#"
            [[heroes]]
            id = "bastion"
            name = "Bastion"
            role = "tank"
            description = ""

            [[heroes]]
            id = "bastion"
            name = "Again"
            role = "damage"
            description = ""
        "#;
        let err = Catalog::from_toml_str(source).unwrap_err();
        assert_eq!(
            err,
            ContentError::DuplicateId {
                table: "heroes",
                id: "bastion".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_table_is_parse_error() {
        let err = Catalog::from_toml_str("[[villains]]\nid = \"x\"\n").unwrap_err();
        assert!(matches!(err, ContentError::Parse(_)));
    }
}
