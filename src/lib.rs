//! # Atelier
//!
//! Back-office catalog core for a fine art gallery: paintings, artists, hero
//! banner items, and articles, with every image stored on a hosted CDN at
//! four resolutions.
//!
//! # Architecture: Records, Pipelines, Seams
//!
//! The crate is a library driven by a thin admin CLI. Web routing,
//! authentication, the production document database, and page-render caching
//! all live outside; the boundaries to them are explicit seams:
//!
//! ```text
//! ImageBackend   — pixel work (decode / resize / encode)
//! CdnStore       — remote object storage (upload / delete)
//! JsonStore      — versioned document persistence
//! Invalidator    — cache invalidation signals
//! ```
//!
//! Every mutation is a linear pipeline over those seams. The load-bearing
//! one is attaching an image to a painting:
//!
//! ```text
//! decode → resize ×3 (150/300/1000) → upload ×4 → append entry → persist
//! ```
//!
//! Appends are all-or-nothing with respect to persisted state — a record
//! never carries half an image entry — and every record write is guarded by
//! an optimistic version so concurrent edits cannot silently lose updates.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`catalog`] | Record types, image set, document store, forms, CRUD + synchronizer |
//! | [`media`] | Attach / detach / toggle-rendered pipeline over imaging + CDN + store |
//! | [`imaging`] | Pure-Rust raster operations: dimension math, Lanczos3 resize, JPEG encode |
//! | [`cdn`] | CDN client: fresh signed credential per upload, delete by file id |
//! | [`config`] | `config.toml` loading and validation |
//!
//! # Design Decisions
//!
//! ## One Entry, Not Nine Arrays
//!
//! The legacy documents carry a painting's images as nine parallel arrays
//! (URLs and file ids at four resolutions plus a rendered flag), aligned by
//! convention. In memory that is a single `Vec` of
//! [`CatalogImage`](catalog::CatalogImage) — the alignment invariant is
//! structural and cannot drift. The parallel arrays survive only as the
//! serde wire format, and legacy records whose arrays already drifted are
//! repaired on load.
//!
//! ## Business Keys Everywhere
//!
//! Records reference each other by human-assigned identifiers
//! (`painting_id`, `artist_id`), never by storage identity. The store keeps
//! one JSON document per key; moving to a hosted document database changes
//! the seam's implementation, not the callers.
//!
//! ## Single-Use Upload Credentials
//!
//! The CDN only accepts uploads accompanied by a short-lived signed
//! credential from a companion authorization endpoint. The client fetches a
//! fresh triple immediately before every upload and never caches one —
//! reuse risks rejection by the remote service.

pub mod catalog;
pub mod cdn;
pub mod config;
pub mod imaging;
pub mod media;
