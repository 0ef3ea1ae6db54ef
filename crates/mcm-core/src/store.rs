//! Load / edit / save cycle for one data file.
//!
//! A [`Session`] is rebuilt from disk on every load and discarded after it is
//! written back; nothing is cached between operations. Last write wins.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::collection::Collection;
use crate::config::{DataKind, SiteConfig};
use crate::error::{StoreError, StoreResult};
use crate::literal::parse_literal;
use crate::locate::{Tail, locate};
use crate::render::{DeclarationHeader, render_document};

/// One collection held for editing.
#[derive(Debug, Clone)]
pub struct Session {
    pub kind: DataKind,
    pub collection: Collection,
    pub tail: Tail,
    /// Document text preceding the declaration, kept when no interface is configured.
    pub head: String,
}

impl Session {
    pub fn empty(kind: DataKind) -> Self {
        Self {
            kind,
            collection: if kind.is_catalog() {
                Collection::empty_categories()
            } else {
                Collection::empty_sequence()
            },
            tail: Tail::default(),
            head: String::new(),
        }
    }
}

/// Parses a document's declaration for `kind` into a session.
pub fn parse_document(document: &str, kind: DataKind) -> StoreResult<Session> {
    let ex = locate(document, kind.declaration())?;
    let value = parse_literal(ex.literal).map_err(|e| match e {
        // offsets are relative to the literal; report them against the document
        StoreError::Parse { offset, message } => StoreError::Parse {
            offset: offset + ex.span.0,
            message,
        },
        other => other,
    })?;
    let collection = Collection::from_value(kind.declaration(), value)?;
    debug!(kind = %kind, records = collection.len(), "parsed collection");
    Ok(Session {
        kind,
        collection,
        tail: ex.tail,
        head: ex.head.to_string(),
    })
}

#[derive(Debug, Clone)]
pub struct DataStore {
    config: SiteConfig,
}

impl DataStore {
    pub fn new(config: SiteConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn path_of(&self, kind: DataKind) -> PathBuf {
        self.config.data_file(kind)
    }

    fn read(&self, kind: DataKind) -> StoreResult<String> {
        let path = self.path_of(kind);
        fs::read_to_string(&path).map_err(|e| StoreError::io(path, e))
    }

    /// Strict load: every failure is returned.
    pub fn load(&self, kind: DataKind) -> StoreResult<Session> {
        let text = self.read(kind)?;
        parse_document(&text, kind)
    }

    /// Load for display: any failure yields an empty session plus the error to surface.
    pub fn load_or_empty(&self, kind: DataKind) -> (Session, Option<StoreError>) {
        match self.load(kind) {
            Ok(s) => (s, None),
            Err(e) => {
                warn!(kind = %kind, error = %e, "falling back to empty collection");
                (Session::empty(kind), Some(e))
            }
        }
    }

    /// Load for editing: a missing file or declaration starts an empty
    /// collection, but unparseable content is an error so it is never overwritten.
    pub fn load_for_edit(&self, kind: DataKind) -> StoreResult<Session> {
        let text = match self.read(kind) {
            Ok(t) => t,
            Err(e) if e.is_not_found() => {
                info!(kind = %kind, "data file missing, starting empty");
                return Ok(Session::empty(kind));
            }
            Err(e) => return Err(e),
        };
        match parse_document(&text, kind) {
            Ok(s) => Ok(s),
            Err(e) if e.is_not_found() => {
                info!(kind = %kind, "declaration missing, appending a new one");
                let mut s = Session::empty(kind);
                s.head = text;
                Ok(s)
            }
            Err(e) => Err(e),
        }
    }

    pub fn header_for(&self, session: &Session) -> DeclarationHeader {
        let kind = session.kind;
        let preamble = match self.config.interface_for(kind) {
            Some(iface) => iface.to_string(),
            None => session.head.clone(),
        };
        DeclarationHeader::new(kind.declaration(), kind.annotation()).with_preamble(preamble)
    }

    pub fn render(&self, session: &Session) -> String {
        render_document(&session.collection, &self.header_for(session), &session.tail)
    }

    /// Serializes the session and writes it to its data file.
    pub fn save(&self, session: &Session) -> StoreResult<PathBuf> {
        let path = self.path_of(session.kind);
        let text = self.render(session);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
        }
        if self.config.atomic_writes {
            write_atomic(&path, &text)?;
        } else {
            fs::write(&path, &text).map_err(|e| StoreError::io(&path, e))?;
        }
        info!(kind = %session.kind, records = session.collection.len(), path = %path.display(), "saved");
        Ok(path)
    }
}

fn write_atomic(path: &Path, text: &str) -> StoreResult<()> {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("data");
    let tmp = path.with_file_name(format!(".{name}.tmp"));
    fs::write(&tmp, text).map_err(|e| StoreError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| {
        fs::remove_file(&tmp).ok();
        StoreError::io(path, e)
    })
}
