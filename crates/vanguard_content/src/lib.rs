//! # VANGUARD Content
//!
//! Site content shared by the public pages and the admin back office.
//!
//! - [`model`] - record types and the [`Record`] trait (table name, id,
//!   searchable fields, validation)
//! - [`catalog`] - a validated, read-only snapshot loaded from TOML
//!
//! Nothing here touches the network; the admin crate moves these records
//! to and from the hosted backend as JSON rows.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod catalog;
pub mod error;
pub mod model;

pub use catalog::{check_table, Catalog};
pub use error::{ContentError, ContentResult};
pub use model::{search, Ability, GameInfo, Hero, MediaItem, MediaKind, NewsArticle, Record, Role, User, UserRole};
