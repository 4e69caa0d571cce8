//! # VANGUARD Admin
//!
//! Back-office client for the hosted backend that stores site content.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      ADMIN PIPELINE                       │
//! ├──────────────────────────────────────────────────────────┤
//! │  BackendConfig → ServiceHandle → AdminScreen / MediaScreen │
//! │                       ↓                 ↓                  │
//! │            RestBackend | MemoryBackend   visible state     │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The handle is created once, explicitly, and cloned into each screen.
//! Screens turn every backend failure into a message on screen; errors
//! never propagate past them.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod backend;
pub mod config;
pub mod error;
pub mod media;
pub mod memory;
pub mod rest;
pub mod screen;
pub mod service;

pub use backend::{fetch_records, insert_record, update_record, Backend, Row, Storage, StoredObject};
pub use config::BackendConfig;
pub use error::{AdminError, AdminResult};
pub use media::{MediaScreen, PLACEHOLDER_URL};
pub use memory::{MemoryBackend, Operation};
pub use rest::RestBackend;
pub use screen::AdminScreen;
pub use service::{ConnectionReport, ServiceHandle};
