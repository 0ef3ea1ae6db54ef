use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use mcm_core::records::{self, DiaryEntry, Record, TimelineKind};
use mcm_core::{
    Collection, DataKind, DataStore, RecordKey, SiteConfig, StoreError, Value, load_interfaces,
    parse_literal,
};

const DIARY: &str = r#"import type { DiaryItem } from "../types";

export const diaryData: DiaryItem[] = [
	// first entry
	{
		id: 1,
		content: 'Hello [world]',
		date: "2025-01-01T00:00:00Z",
		images: [],
		tags: ["a", "b"],
	},
	{ id: 2, content: `multi
line`, date: "2025-01-02T00:00:00Z" },
];

export default diaryData;
"#;

const DEVICES: &str = r#"export const devicesData: DeviceCategory = {
  Laptops: [{ name: "X1", image: "/images/device/x1.jpg", specs: "i7", description: "", link: "" }],
  Phones: [{ name: "P9", image: "", specs: "", description: "", link: "" }],
};
"#;

fn site(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("src").join("data");
    fs::create_dir_all(&data).unwrap();
    for (name, text) in files {
        fs::write(data.join(name), text).unwrap();
    }
    dir
}

fn store(root: &Path) -> DataStore {
    DataStore::new(SiteConfig::new(root))
}

fn obj(members: &[(&str, Value)]) -> Value {
    Value::Object(
        members
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
    )
}

#[test]
fn load_keeps_head_and_tail() {
    let dir = site(&[("diary.ts", DIARY)]);
    let session = store(dir.path()).load(DataKind::Diary).unwrap();
    assert_eq!(session.collection.len(), 2);
    assert_eq!(session.head, "import type { DiaryItem } from \"../types\";\n\n");
    assert_eq!(session.tail.as_str(), ";\n\nexport default diaryData;\n");
    let (_, rec) = session.collection.find("id", &RecordKey::Int(2)).unwrap();
    assert_eq!(rec.get("content"), Some(&Value::Str("multi\nline".into())));
}

#[test]
fn save_unmodified_round_trips() {
    let dir = site(&[("diary.ts", DIARY)]);
    let st = store(dir.path());
    let first = st.load(DataKind::Diary).unwrap();
    let path = st.save(&first).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("import type { DiaryItem } from \"../types\";\n\nexport const diaryData: DiaryItem[] = [\n"));
    assert!(text.ends_with("];\n\nexport default diaryData;\n"));
    assert!(!text.contains("first entry"));
    assert!(!path.with_file_name(".diary.ts.tmp").exists());

    let second = st.load(DataKind::Diary).unwrap();
    assert_eq!(first.collection, second.collection);
    assert_eq!(first.tail, second.tail);
}

#[test]
fn configured_interface_replaces_head() {
    let dir = site(&[("diary.ts", DIARY)]);
    let mut ifaces = BTreeMap::new();
    ifaces.insert(
        "diary".to_string(),
        "export interface DiaryItem {\n  id: number;\n}".to_string(),
    );
    let st = DataStore::new(SiteConfig::new(dir.path()).with_interfaces(ifaces));
    let session = st.load(DataKind::Diary).unwrap();
    let text = st.render(&session);
    assert!(text.starts_with(
        "export interface DiaryItem {\n  id: number;\n}\nexport const diaryData: DiaryItem[] = ["
    ));
    assert!(!text.contains("import type"));
}

#[test]
fn edit_and_reload() {
    let dir = site(&[("diary.ts", DIARY)]);
    let st = store(dir.path());
    let mut session = st.load_for_edit(DataKind::Diary).unwrap();
    let id = session.collection.next_id("id").unwrap();
    assert_eq!(id, 3);
    let rec = obj(&[
        ("id", Value::Int(id)),
        ("content", Value::Str("new".into())),
        ("date", Value::Str("2025-02-01T00:00:00Z".into())),
    ]);
    session.collection.upsert("id", rec.clone());
    session.collection.remove("id", &RecordKey::Int(1));
    st.save(&session).unwrap();

    let reloaded = st.load(DataKind::Diary).unwrap();
    assert_eq!(reloaded.collection.len(), 2);
    assert!(reloaded.collection.find("id", &RecordKey::Int(1)).is_none());
    let (pos, found) = reloaded.collection.find("id", &RecordKey::Int(3)).unwrap();
    assert_eq!(pos.index, 1);
    assert_eq!(found, &rec);
}

#[test]
fn missing_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let st = store(dir.path());
    let session = st.load_for_edit(DataKind::Devices).unwrap();
    assert_eq!(session.collection, Collection::empty_categories());
    let session = st.load_for_edit(DataKind::Skills).unwrap();
    assert_eq!(session.collection, Collection::empty_sequence());

    assert!(st.load(DataKind::Skills).unwrap_err().is_not_found());

    let path = st.save(&session).unwrap();
    assert_eq!(
        fs::read_to_string(path).unwrap(),
        "export const skillsData: Skill[] = [];\n"
    );
}

#[test]
fn missing_declaration_keeps_existing_text() {
    let dir = site(&[("timeline.ts", "// nothing here\n")]);
    let st = store(dir.path());
    let session = st.load_for_edit(DataKind::Timeline).unwrap();
    assert!(session.collection.is_empty());
    let path = st.save(&session).unwrap();
    assert_eq!(
        fs::read_to_string(path).unwrap(),
        "// nothing here\nexport const timelineData: TimelineItem[] = [];\n"
    );
}

#[test]
fn broken_file_is_not_overwritten() {
    let broken = "export const diaryData = [1, 2";
    let dir = site(&[("diary.ts", broken)]);
    let st = store(dir.path());
    assert!(matches!(
        st.load_for_edit(DataKind::Diary),
        Err(StoreError::UnbalancedLiteral { .. })
    ));
    let (session, err) = st.load_or_empty(DataKind::Diary);
    assert!(session.collection.is_empty());
    assert!(matches!(err, Some(StoreError::UnbalancedLiteral { .. })));
    assert_eq!(
        fs::read_to_string(st.path_of(DataKind::Diary)).unwrap(),
        broken
    );
}

#[test]
fn parse_error_offset_is_document_relative() {
    let dir = site(&[("skills.ts", "export const skillsData = [1,, 2];")]);
    match store(dir.path()).load(DataKind::Skills) {
        Err(StoreError::Parse { offset, .. }) => assert_eq!(offset, 29),
        other => panic!("{other:?}"),
    }
}

#[test]
fn device_catalog_prunes_on_delete() {
    let dir = site(&[("devices.ts", DEVICES)]);
    let st = store(dir.path());
    let mut session = st.load_for_edit(DataKind::Devices).unwrap();
    session
        .collection
        .remove("name", &RecordKey::from("X1"))
        .unwrap();
    st.save(&session).unwrap();

    let text = fs::read_to_string(st.path_of(DataKind::Devices)).unwrap();
    assert!(text.starts_with("export const devicesData: DeviceCategory = {\n    \"Phones\": ["));
    assert!(!text.contains("Laptops"));

    let mut session = st.load_for_edit(DataKind::Devices).unwrap();
    session
        .collection
        .remove("name", &RecordKey::from("P9"))
        .unwrap();
    st.save(&session).unwrap();
    let reloaded = st.load(DataKind::Devices).unwrap();
    assert_eq!(
        reloaded.collection,
        Collection::Categories(vec![("Phones".to_string(), vec![])])
    );
}

#[test]
fn editing_a_diary_entry_keeps_its_date() {
    let dir = site(&[("diary.ts", DIARY)]);
    let st = store(dir.path());
    let mut session = st.load_for_edit(DataKind::Diary).unwrap();
    let key = RecordKey::Int(1);
    let stored = session.collection.find("id", &key).map(|(_, r)| r.clone());

    let edit = parse_literal("{id: 1, content: 'changed'}").unwrap();
    let rec = records::normalize_update(DataKind::Diary, stored.as_ref(), &edit).unwrap();
    session.collection.upsert("id", rec);
    st.save(&session).unwrap();

    let reloaded = st.load(DataKind::Diary).unwrap();
    let (_, found) = reloaded.collection.find("id", &key).unwrap();
    assert_eq!(found.get("content").and_then(Value::as_str), Some("changed"));
    assert_eq!(
        found.get("date").and_then(Value::as_str),
        Some("2025-01-01T00:00:00Z")
    );

    // an explicit date still wins
    let edit = parse_literal("{id: 1, date: '2030-01-01T00:00:00Z'}").unwrap();
    let rec = records::normalize_update(DataKind::Diary, Some(found), &edit).unwrap();
    assert_eq!(
        rec.get("date").and_then(Value::as_str),
        Some("2030-01-01T00:00:00Z")
    );
    // new entries are stamped
    let fresh = parse_literal("{id: 9, content: 'new'}").unwrap();
    let rec = records::normalize_update(DataKind::Diary, None, &fresh).unwrap();
    let date = rec.get("date").and_then(Value::as_str).unwrap();
    assert_eq!(date.len(), 20);
}

#[test]
fn interfaces_file_loading() {
    let dir = tempfile::tempdir().unwrap();
    let missing = load_interfaces(&dir.path().join("interfaces.json")).unwrap();
    assert!(missing.is_empty());

    let p = dir.path().join("ok.json");
    fs::write(&p, r#"{"diary": "interface DiaryItem {}", "skills": ""}"#).unwrap();
    let table = load_interfaces(&p).unwrap();
    let cfg = SiteConfig::new(dir.path()).with_interfaces(table);
    assert_eq!(cfg.interface_for(DataKind::Diary), Some("interface DiaryItem {}"));
    assert_eq!(cfg.interface_for(DataKind::Skills), None);

    let bad = dir.path().join("bad.json");
    fs::write(&bad, "{not json").unwrap();
    assert!(matches!(
        load_interfaces(&bad),
        Err(StoreError::Config { .. })
    ));
}

#[test]
fn data_kind_table() {
    assert_eq!("Diary".parse::<DataKind>().unwrap(), DataKind::Diary);
    assert!("albums".parse::<DataKind>().is_err());
    assert_eq!(DataKind::Devices.id_field(), "name");
    assert!(DataKind::Devices.is_catalog());
    assert!(DataKind::Diary.key_from("x").is_err());
    assert_eq!(DataKind::Friends.key_from(" 4 ").unwrap(), RecordKey::Int(4));
    assert_eq!(
        DataKind::Projects.key_from("4").unwrap(),
        RecordKey::Str("4".into())
    );
}

#[test]
fn diary_normalize_fills_date_and_orders_fields() {
    let v = parse_literal("{content: 'x', id: 5, tags: [' a ', ''], weather: 'sunny'}").unwrap();
    let n = records::normalize_value(DataKind::Diary, &v).unwrap();
    let Value::Object(members) = &n else {
        panic!("not an object")
    };
    let keys: Vec<&str> = members.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(
        keys,
        ["id", "content", "date", "images", "location", "mood", "tags", "weather"]
    );
    let date = n.get("date").and_then(Value::as_str).unwrap();
    assert_eq!(date.len(), 20);
    assert!(date.ends_with('Z'));
    assert_eq!(
        n.get("tags"),
        Some(&Value::Array(vec![Value::Str("a".into())]))
    );

    let entry: DiaryEntry = records::from_value(&n).unwrap();
    assert_eq!(entry.key(), RecordKey::Int(5));
    assert_eq!(entry.extra.get("weather"), Some(&serde_json::json!("sunny")));
}

#[test]
fn timeline_and_skill_defaults() {
    let v = parse_literal("{id: 't1', title: 'BSc', type: 'Education'}").unwrap();
    let n = records::normalize_value(DataKind::Timeline, &v).unwrap();
    assert_eq!(n.get("type").and_then(Value::as_str), Some("education"));
    assert_eq!(
        n.get("icon").and_then(Value::as_str),
        Some(TimelineKind::Education.icon())
    );
    assert_eq!(n.get("color").and_then(Value::as_str), Some("#2A53DD"));

    let v = parse_literal("{id: 'rust', name: 'Rust', color: '', experience: {years: 2}}").unwrap();
    let n = records::normalize_value(DataKind::Skills, &v).unwrap();
    assert_eq!(
        n.get("icon").and_then(Value::as_str),
        Some(records::DEFAULT_SKILL_ICON)
    );
    assert!(n.get("color").is_none());
    assert_eq!(
        n.get("experience"),
        Some(&parse_literal("{years: 2, months: 0}").unwrap())
    );
}

#[test]
fn project_fields_are_camel_case() {
    let v = parse_literal("{id: 'p', techStack: [' rust ', ''], featured: true}").unwrap();
    let n = records::normalize_value(DataKind::Projects, &v).unwrap();
    assert_eq!(
        n.get("techStack"),
        Some(&Value::Array(vec![Value::Str("rust".into())]))
    );
    assert!(n.get("visitUrl").is_some());
    assert!(n.get("tech_stack").is_none());
}

#[test]
fn normalize_rejects_bad_records() {
    assert!(matches!(
        records::normalize_value(DataKind::Friends, &Value::Int(1)),
        Err(StoreError::Record { .. })
    ));
    let v = parse_literal("{id: 'not a number'}").unwrap();
    assert!(matches!(
        records::normalize_value(DataKind::Friends, &v),
        Err(StoreError::Record { .. })
    ));
}

#[test]
fn tags_and_labels() {
    assert_eq!(records::split_tags(" a, b ,,c "), ["a", "b", "c"]);
    let rec = parse_literal("{id: 3, date: '2025-01-02T10:00:00Z', title: 'T'}").unwrap();
    assert_eq!(
        records::label(DataKind::Diary, None, &rec),
        "3 - 2025-01-02T10:00:00Z"
    );
    assert_eq!(records::label(DataKind::Friends, None, &rec), "3 - T");
    let dev = parse_literal("{name: 'X1'}").unwrap();
    assert_eq!(
        records::label(DataKind::Devices, Some("Laptops"), &dev),
        "Laptops - X1"
    );
}
