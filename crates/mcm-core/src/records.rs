//! Typed views over the generic record values, one per data kind.
//!
//! Records convert through `serde_json` (order-preserving), and fields this
//! crate does not know about are carried in `extra` so they survive a
//! load/normalize/save cycle.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Map;

use crate::collection::RecordKey;
use crate::config::DataKind;
use crate::error::{StoreError, StoreResult};
use crate::literal::Value;

pub const DEFAULT_SKILL_ICON: &str = "material-symbols:construction-rounded";
pub const DIARY_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

type Extra = Map<String, serde_json::Value>;

pub trait Record: Serialize + DeserializeOwned {
    const KIND: DataKind;

    fn key(&self) -> RecordKey;

    /// Fills the defaults an empty form field stands for.
    fn normalize(&mut self) {}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiaryEntry {
    pub id: i64,
    pub content: String,
    pub date: String,
    pub images: Vec<String>,
    pub location: String,
    pub mood: String,
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Record for DiaryEntry {
    const KIND: DataKind = DataKind::Diary;

    fn key(&self) -> RecordKey {
        RecordKey::Int(self.id)
    }

    fn normalize(&mut self) {
        if self.date.trim().is_empty() {
            self.date = chrono::Utc::now().format(DIARY_DATE_FORMAT).to_string();
        }
        self.tags = clean_list(&self.tags);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FriendLink {
    pub id: i64,
    pub title: String,
    pub imgurl: String,
    pub desc: String,
    pub siteurl: String,
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Record for FriendLink {
    const KIND: DataKind = DataKind::Friends;

    fn key(&self) -> RecordKey {
        RecordKey::Int(self.id)
    }

    fn normalize(&mut self) {
        self.tags = clean_list(&self.tags);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub category: String,
    pub tech_stack: Vec<String>,
    pub status: String,
    pub live_demo: String,
    pub source_code: String,
    pub start_date: String,
    pub end_date: String,
    pub featured: bool,
    pub tags: Vec<String>,
    pub visit_url: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Record for Project {
    const KIND: DataKind = DataKind::Projects;

    fn key(&self) -> RecordKey {
        RecordKey::Str(self.id.clone())
    }

    fn normalize(&mut self) {
        self.tech_stack = clean_list(&self.tech_stack);
        self.tags = clean_list(&self.tags);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineKind {
    Education,
    Certificate,
    Project,
    Other,
}

impl TimelineKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "education" => Some(Self::Education),
            "certificate" => Some(Self::Certificate),
            "project" => Some(Self::Project),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Education => "education",
            Self::Certificate => "certificate",
            Self::Project => "project",
            Self::Other => "other",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Education => "material-symbols:school",
            Self::Certificate => "material-symbols:lab-profile",
            Self::Project => "material-symbols:code-blocks",
            Self::Other => "material-symbols:editor-choice",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::Education => "#2A53DD",
            Self::Certificate => "#51F56C",
            Self::Project => "#FF4B63",
            Self::Other => "#FAB83E",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimelineEvent {
    pub id: String,
    pub title: String,
    pub description: String,
    pub start_date: String,
    pub location: String,
    pub organization: String,
    pub skills: Vec<String>,
    pub featured: bool,
    #[serde(rename = "type")]
    pub kind: String,
    pub icon: String,
    pub color: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Record for TimelineEvent {
    const KIND: DataKind = DataKind::Timeline;

    fn key(&self) -> RecordKey {
        RecordKey::Str(self.id.clone())
    }

    fn normalize(&mut self) {
        if let Some(kind) = TimelineKind::parse(&self.kind) {
            self.kind = kind.as_str().to_string();
            if self.icon.trim().is_empty() {
                self.icon = kind.icon().to_string();
            }
            if self.color.trim().is_empty() {
                self.color = kind.color().to_string();
            }
        }
        self.skills = clean_list(&self.skills);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub years: i64,
    pub months: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub category: String,
    pub level: String,
    pub experience: Experience,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Record for Skill {
    const KIND: DataKind = DataKind::Skills;

    fn key(&self) -> RecordKey {
        RecordKey::Str(self.id.clone())
    }

    fn normalize(&mut self) {
        if self.icon.trim().is_empty() {
            self.icon = DEFAULT_SKILL_ICON.to_string();
        }
        if self.color.as_deref().is_some_and(|c| c.trim().is_empty()) {
            self.color = None;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Device {
    pub name: String,
    pub image: String,
    pub specs: String,
    pub description: String,
    pub link: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Record for Device {
    const KIND: DataKind = DataKind::Devices;

    fn key(&self) -> RecordKey {
        RecordKey::Str(self.name.clone())
    }
}

pub fn from_value<R: Record>(v: &Value) -> StoreResult<R> {
    let j: serde_json::Value = v.into();
    serde_json::from_value(j).map_err(|e| StoreError::Record {
        message: format!("{}: {e}", R::KIND),
    })
}

pub fn to_value<R: Record>(r: &R) -> StoreResult<Value> {
    let j = serde_json::to_value(r).map_err(|e| StoreError::Record {
        message: format!("{}: {e}", R::KIND),
    })?;
    Ok((&j).into())
}

fn normalize_as<R: Record>(v: &Value) -> StoreResult<Value> {
    let mut r: R = from_value(v)?;
    r.normalize();
    to_value(&r)
}

/// Runs a raw record through its typed view: checks field types, fills
/// defaults, and lays fields out in the canonical order.
pub fn normalize_value(kind: DataKind, v: &Value) -> StoreResult<Value> {
    if !matches!(v, Value::Object(_)) {
        return Err(StoreError::Record {
            message: format!("{kind} record must be an object, got {}", v.kind_name()),
        });
    }
    match kind {
        DataKind::Diary => normalize_as::<DiaryEntry>(v),
        DataKind::Friends => normalize_as::<FriendLink>(v),
        DataKind::Projects => normalize_as::<Project>(v),
        DataKind::Timeline => normalize_as::<TimelineEvent>(v),
        DataKind::Skills => normalize_as::<Skill>(v),
        DataKind::Devices => normalize_as::<Device>(v),
    }
}

/// Like [`normalize_value`], for a record that may replace `stored`. A diary
/// entry edited without a date keeps the date it was written with.
pub fn normalize_update(kind: DataKind, stored: Option<&Value>, v: &Value) -> StoreResult<Value> {
    let blank = |d: Option<&Value>| match d {
        None | Some(Value::Null) => true,
        Some(Value::Str(s)) => s.trim().is_empty(),
        Some(_) => false,
    };
    if kind == DataKind::Diary
        && blank(v.get("date"))
        && let Some(date) = stored.and_then(|r| r.get("date"))
        && !blank(Some(date))
    {
        let mut merged = v.clone();
        merged.insert("date", date.clone());
        return normalize_value(kind, &merged);
    }
    normalize_value(kind, v)
}

/// Splits comma-separated form input, dropping blanks.
pub fn split_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn clean_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Selection label for a record, e.g. `3 - 2025-01-02T10:00:00Z` or `Laptops - X1`.
pub fn label(kind: DataKind, category: Option<&str>, record: &Value) -> String {
    let text = |field: &str| -> String {
        match record.get(field) {
            Some(Value::Str(s)) => s.clone(),
            Some(Value::Int(n)) => n.to_string(),
            Some(other) => crate::render::render_literal(other),
            None => String::new(),
        }
    };
    match kind {
        DataKind::Diary => format!("{} - {}", text("id"), text("date")),
        DataKind::Friends | DataKind::Projects | DataKind::Timeline => {
            format!("{} - {}", text("id"), text("title"))
        }
        DataKind::Skills => format!("{} - {}", text("id"), text("name")),
        DataKind::Devices => format!("{} - {}", category.unwrap_or(""), text("name")),
    }
}
