//! mcm-core: embedded-literal data store for static site content files
//!
//! Site data lives in source files as `export const NAME: Type = [...];`.
//! This crate keeps a small, well-factored surface around that shape:
//! - Declaration locator and bracket-balance scanner (comment/string aware)
//! - Tolerant literal parser into a generic `Value` tree
//! - Record collection operations (lookup, upsert, delete, id assignment)
//! - Canonical renderer that reattaches the untouched tail
//! - Typed record views, per-kind config, and file load/save
//!
pub mod collection;
pub mod config;
pub mod error;
pub mod json;
pub mod literal;
pub mod locate;
pub mod records;
pub mod render;
pub mod scan;
pub mod store;

pub use collection::{Collection, Position, RecordKey, Upserted};
pub use config::{DEFAULT_INTERFACES_FILE, DataKind, SiteConfig, load_interfaces};
pub use error::{StoreError, StoreResult};
pub use literal::{Value, parse_literal};
pub use locate::{Extracted, Tail, locate, locate_and_extract};
pub use render::{DeclarationHeader, render_document, render_literal};
pub use scan::scan_literal;
pub use store::{DataStore, Session, parse_document};
