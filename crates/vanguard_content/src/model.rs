//! # Content Records
//!
//! Every record is a plain serde struct with a string `id`. The [`Record`]
//! trait ties a type to its backend table and to the fields a search box
//! matches against, so catalog queries and admin screens stay generic.

use std::fmt::Debug;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ContentError, ContentResult};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A row of site content stored in a backend table.
pub trait Record: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Backend table name.
    const TABLE: &'static str;

    /// Primary key.
    fn id(&self) -> &str;

    /// Fields matched by free-text search.
    fn searchable(&self) -> Vec<&str>;

    /// Checks field constraints beyond what the type system expresses.
    ///
    /// # Errors
    /// Returns [`ContentError::InvalidRecord`] describing the first problem.
    fn validate(&self) -> ContentResult<()> {
        if self.id().trim().is_empty() {
            return Err(invalid::<Self>("", "id must not be empty"));
        }
        Ok(())
    }

    /// Case-insensitive substring match over [`Record::searchable`].
    /// An empty or whitespace-only query matches everything.
    fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        needle.is_empty()
            || self
                .searchable()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Records matching `query`, in their original order.
pub fn search<'a, R: Record>(records: &'a [R], query: &str) -> Vec<&'a R> {
    records.iter().filter(|r| r.matches(query)).collect()
}

fn invalid<R: Record>(id: &str, reason: impl Into<String>) -> ContentError {
    ContentError::InvalidRecord {
        table: R::TABLE,
        id: id.to_string(),
        reason: reason.into(),
    }
}

/// Hero combat role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Frontline, absorbs damage.
    Tank,
    /// Deals damage.
    Damage,
    /// Heals and buffs.
    Support,
}

impl Role {
    /// Every role, in display order.
    pub const ALL: [Self; 3] = [Self::Tank, Self::Damage, Self::Support];

    /// Lowercase label used in URLs and search.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Tank => "tank",
            Self::Damage => "damage",
            Self::Support => "support",
        }
    }
}

/// A hero ability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ability {
    /// Ability name.
    pub name: String,
    /// What it does.
    pub description: String,
}

/// A playable hero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hero {
    /// Primary key.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Combat role.
    pub role: Role,
    /// Short bio.
    pub description: String,
    /// Ability list.
    #[serde(default)]
    pub abilities: Vec<Ability>,
    /// Portrait URL.
    #[serde(default)]
    pub image_url: String,
    /// Difficulty rating, 1 to 3.
    #[serde(default)]
    pub difficulty: Option<u8>,
}

impl Record for Hero {
    const TABLE: &'static str = "heroes";

    fn id(&self) -> &str {
        &self.id
    }

    fn searchable(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.role.label(), self.description.as_str()];
        fields.extend(self.abilities.iter().map(|a| a.name.as_str()));
        fields
    }

    fn validate(&self) -> ContentResult<()> {
        if self.id.trim().is_empty() {
            return Err(invalid::<Self>("", "id must not be empty"));
        }
        if let Some(difficulty) = self.difficulty {
            if !(1..=3).contains(&difficulty) {
                return Err(invalid::<Self>(&self.id, format!("difficulty {difficulty} outside 1..=3")));
            }
        }
        Ok(())
    }
}

/// A news post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    /// Primary key.
    pub id: String,
    /// Headline.
    pub title: String,
    /// Teaser shown in lists.
    #[serde(default)]
    pub summary: String,
    /// Full text.
    #[serde(default)]
    pub body: String,
    /// Category tag (`patch-notes`, `esports`, ...).
    pub category: String,
    /// Publication date, `YYYY-MM-DD`.
    pub published: String,
    /// Header image.
    #[serde(default)]
    pub image_url: Option<String>,
}

impl NewsArticle {
    /// `published` as a calendar date, if it is a real `YYYY-MM-DD` date.
    #[must_use]
    pub fn published_on(&self) -> Option<NaiveDate> {
        if self.published.len() != 10 {
            return None;
        }
        NaiveDate::parse_from_str(&self.published, DATE_FORMAT).ok()
    }
}

impl Record for NewsArticle {
    const TABLE: &'static str = "news";

    fn id(&self) -> &str {
        &self.id
    }

    fn searchable(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.summary.as_str(), self.category.as_str()]
    }

    fn validate(&self) -> ContentResult<()> {
        if self.id.trim().is_empty() {
            return Err(invalid::<Self>("", "id must not be empty"));
        }
        if self.published_on().is_none() {
            return Err(invalid::<Self>(
                &self.id,
                format!("published `{}` is not YYYY-MM-DD", self.published),
            ));
        }
        Ok(())
    }
}

/// A section of the game overview page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInfo {
    /// Primary key.
    pub id: String,
    /// Section heading.
    pub title: String,
    /// Section text.
    pub body: String,
    /// Position on the page, ascending.
    #[serde(default)]
    pub order: u32,
}

impl Record for GameInfo {
    const TABLE: &'static str = "game_info";

    fn id(&self) -> &str {
        &self.id
    }

    fn searchable(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.body.as_str()]
    }
}

/// Media kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image.
    Image,
    /// Video clip.
    Video,
}

/// A gallery entry backed by a storage object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Primary key.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Image or video.
    pub kind: MediaKind,
    /// Object path inside the media bucket.
    pub path: String,
    /// Optional caption.
    #[serde(default)]
    pub caption: Option<String>,
}

impl Record for MediaItem {
    const TABLE: &'static str = "media";

    fn id(&self) -> &str {
        &self.id
    }

    fn searchable(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str(), self.path.as_str()];
        fields.extend(self.caption.as_deref());
        fields
    }
}

/// Back-office permission level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full access including user management.
    Admin,
    /// Can edit content.
    Editor,
    /// Read-only.
    Viewer,
}

impl UserRole {
    /// True when the role may create, update or delete content.
    #[must_use]
    pub fn can_edit(self) -> bool {
        matches!(self, Self::Admin | Self::Editor)
    }
}

/// A back-office account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Primary key.
    pub id: String,
    /// Login email.
    pub email: String,
    /// Name shown in the admin header.
    pub display_name: String,
    /// Permission level.
    pub role: UserRole,
}

impl Record for User {
    const TABLE: &'static str = "users";

    fn id(&self) -> &str {
        &self.id
    }

    fn searchable(&self) -> Vec<&str> {
        vec![self.email.as_str(), self.display_name.as_str()]
    }

    fn validate(&self) -> ContentResult<()> {
        if self.id.trim().is_empty() {
            return Err(invalid::<Self>("", "id must not be empty"));
        }
        if !self.email.contains('@') {
            return Err(invalid::<Self>(&self.id, "email must contain `@`"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hero(id: &str, name: &str, role: Role) -> Hero {
        Hero {
            id: id.to_string(),
            name: name.to_string(),
            role,
            description: String::new(),
            abilities: vec![Ability {
                name: "Barrier Field".to_string(),
                description: "Projects a shield.".to_string(),
            }],
            image_url: String::new(),
            difficulty: Some(2),
        }
    }

    #[test]
    fn test_search_is_case_insensitive_over_fields() {
        let heroes = vec![hero("1", "Bastion", Role::Tank), hero("2", "Vesper", Role::Support)];

        assert_eq!(search(&heroes, "VESP").len(), 1);
        assert_eq!(search(&heroes, "support")[0].id, "2");
        assert_eq!(search(&heroes, "barrier").len(), 2);
        assert_eq!(search(&heroes, "   ").len(), 2);
        assert!(search(&heroes, "nobody").is_empty());
    }

    #[test]
    fn test_hero_difficulty_range() {
        let mut h = hero("1", "Bastion", Role::Tank);
        assert!(h.validate().is_ok());
        h.difficulty = Some(4);
        assert!(matches!(
            h.validate(),
            Err(ContentError::InvalidRecord { table: "heroes", .. })
        ));
    }

    #[test]
    fn test_news_date_format() {
        let mut article = NewsArticle {
            id: "n1".to_string(),
            title: "Season 4".to_string(),
            summary: String::new(),
            body: String::new(),
            category: "patch-notes".to_string(),
            published: "2024-03-09".to_string(),
            image_url: None,
        };
        assert!(article.validate().is_ok());
        assert_eq!(article.published_on(), NaiveDate::from_ymd_opt(2024, 3, 9));

        for bad in ["9 March 2024", "2024-13-45", "0000-00-00", "2023-02-29", "2024-3-9"] {
            article.published = bad.to_string();
            assert!(article.validate().is_err(), "{bad} accepted");
        }
        article.published = "2024-02-29".to_string();
        assert!(article.validate().is_ok());
    }

    #[test]
    fn test_empty_id_rejected() {
        let info = GameInfo {
            id: " ".to_string(),
            title: "Modes".to_string(),
            body: String::new(),
            order: 0,
        };
        assert!(info.validate().is_err());
    }

    #[test]
    fn test_user_role_permissions() {
        assert!(UserRole::Admin.can_edit());
        assert!(UserRole::Editor.can_edit());
        assert!(!UserRole::Viewer.can_edit());
    }
}
