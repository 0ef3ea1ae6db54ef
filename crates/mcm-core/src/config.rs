//! Site layout and the per-kind declaration table.
//!
//! Each [`DataKind`] names one data file under `<root>/src/data/` together with
//! the declaration it holds, its type annotation, and the field identifying
//! its records. Interface blocks written above each declaration come from an
//! optional `interfaces.json` (kind key -> TypeScript source).

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, warn};

use crate::collection::RecordKey;
use crate::error::{StoreError, StoreResult};

pub const DEFAULT_INTERFACES_FILE: &str = "interfaces.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DataKind {
    Diary,
    Friends,
    Projects,
    Timeline,
    Skills,
    Devices,
}

impl DataKind {
    pub const ALL: [DataKind; 6] = [
        DataKind::Diary,
        DataKind::Friends,
        DataKind::Projects,
        DataKind::Timeline,
        DataKind::Skills,
        DataKind::Devices,
    ];

    /// Key used in `interfaces.json` and on the command line.
    pub fn key(self) -> &'static str {
        match self {
            DataKind::Diary => "diary",
            DataKind::Friends => "friends",
            DataKind::Projects => "projects",
            DataKind::Timeline => "timeline",
            DataKind::Skills => "skills",
            DataKind::Devices => "devices",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            DataKind::Diary => "diary.ts",
            DataKind::Friends => "friends.ts",
            DataKind::Projects => "projects.ts",
            DataKind::Timeline => "timeline.ts",
            DataKind::Skills => "skills.ts",
            DataKind::Devices => "devices.ts",
        }
    }

    pub fn declaration(self) -> &'static str {
        match self {
            DataKind::Diary => "diaryData",
            DataKind::Friends => "friendsData",
            DataKind::Projects => "projectsData",
            DataKind::Timeline => "timelineData",
            DataKind::Skills => "skillsData",
            DataKind::Devices => "devicesData",
        }
    }

    pub fn annotation(self) -> &'static str {
        match self {
            DataKind::Diary => "DiaryItem[]",
            DataKind::Friends => "FriendItem[]",
            DataKind::Projects => "Project[]",
            DataKind::Timeline => "TimelineItem[]",
            DataKind::Skills => "Skill[]",
            DataKind::Devices => "DeviceCategory",
        }
    }

    pub fn id_field(self) -> &'static str {
        match self {
            DataKind::Devices => "name",
            _ => "id",
        }
    }

    /// Diary entries and friend links use generated integer ids.
    pub fn numeric_ids(self) -> bool {
        matches!(self, DataKind::Diary | DataKind::Friends)
    }

    /// The device catalog is a map of category -> list.
    pub fn is_catalog(self) -> bool {
        self == DataKind::Devices
    }

    /// Builds a lookup key from user input, typed per kind.
    pub fn key_from(self, raw: &str) -> StoreResult<RecordKey> {
        if self.numeric_ids() {
            raw.trim()
                .parse::<i64>()
                .map(RecordKey::Int)
                .map_err(|_| StoreError::Record {
                    message: format!("{} ids are integers, got `{raw}`", self.key()),
                })
        } else {
            Ok(RecordKey::Str(raw.to_string()))
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DataKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataKind::ALL
            .into_iter()
            .find(|k| k.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown data kind `{s}`"))
    }
}

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub root: PathBuf,
    /// Interface source placed above each declaration, keyed by kind.
    pub interfaces: BTreeMap<String, String>,
    /// Write through a sibling temp file and rename.
    pub atomic_writes: bool,
}

impl SiteConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            interfaces: BTreeMap::new(),
            atomic_writes: true,
        }
    }

    pub fn with_interfaces(mut self, interfaces: BTreeMap<String, String>) -> Self {
        self.interfaces = interfaces;
        self
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join("src").join("data")
    }

    pub fn data_file(&self, kind: DataKind) -> PathBuf {
        self.data_dir().join(kind.file_name())
    }

    pub fn interface_for(&self, kind: DataKind) -> Option<&str> {
        self.interfaces
            .get(kind.key())
            .map(String::as_str)
            .filter(|s| !s.trim().is_empty())
    }
}

/// Reads the interface table. A missing file yields an empty table.
pub fn load_interfaces(path: &Path) -> StoreResult<BTreeMap<String, String>> {
    let data = match fs::read_to_string(path) {
        Ok(d) => d,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "interfaces file not found, using empty definitions");
            return Ok(BTreeMap::new());
        }
        Err(e) => return Err(StoreError::io(path, e)),
    };
    let table: BTreeMap<String, String> =
        serde_json::from_str(&data).map_err(|e| StoreError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    debug!(path = %path.display(), entries = table.len(), "loaded interfaces");
    Ok(table)
}
