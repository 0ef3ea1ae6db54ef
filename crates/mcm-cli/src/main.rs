use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use mcm_core::{DataKind, DataStore, RecordKey, Session, SiteConfig, Upserted, Value, records};

mod logging;

#[derive(Parser, Debug)]
#[command(
    name = "mcm-cli",
    about = "Inspect and edit the data files of a static site",
    version
)]
struct Cli {
    /// Site root (contains src/data)
    #[arg(long, global = true, env = "MCM_ROOT", default_value = ".")]
    root: PathBuf,
    /// Interface definitions written above each declaration
    #[arg(long, global = true, default_value = mcm_core::DEFAULT_INTERFACES_FILE)]
    interfaces: PathBuf,
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Dump a collection as JSON
    Dump(KindArgs),
    /// List record labels of a collection
    List(KindArgs),
    /// Print one record as JSON
    Get(IdArgs),
    /// Insert or replace a record (raw JSON); integer ids are assigned when missing
    Set(SetArgs),
    /// Remove a record by id (device name for devices)
    Remove(RemoveArgs),
}

#[derive(ClapArgs, Debug)]
struct KindArgs {
    /// diary, friends, projects, timeline, skills or devices
    kind: DataKind,
}

#[derive(ClapArgs, Debug)]
struct IdArgs {
    kind: DataKind,
    /// Record id (device name for devices)
    #[arg(long)]
    id: String,
}

#[derive(ClapArgs, Debug)]
struct SetArgs {
    kind: DataKind,
    /// Record as raw JSON, e.g. {"id":"p1","title":"X"}
    #[arg(long)]
    value: String,
    /// Comma-separated tags, replacing any `tags` in --value
    #[arg(long)]
    tags: Option<String>,
    /// Device category to place the record in
    #[arg(long)]
    category: Option<String>,
    /// Print the resulting file instead of writing it
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[derive(ClapArgs, Debug)]
struct RemoveArgs {
    kind: DataKind,
    #[arg(long)]
    id: String,
    /// Print the resulting file instead of writing it
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(&logging::LogConfig::from_verbosity(cli.verbose));

    let interfaces = mcm_core::load_interfaces(&cli.interfaces).unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        std::process::exit(2);
    });
    let store = DataStore::new(SiteConfig::new(&cli.root).with_interfaces(interfaces));

    match cli.cmd {
        Cmd::Dump(a) => cmd_dump(&store, a),
        Cmd::List(a) => cmd_list(&store, a),
        Cmd::Get(a) => cmd_get(&store, a),
        Cmd::Set(a) => cmd_set(&store, a),
        Cmd::Remove(a) => cmd_remove(&store, a),
    }
}

// Read-only views fall back to an empty collection and report why.
fn load_view(store: &DataStore, kind: DataKind) -> Session {
    let (session, err) = store.load_or_empty(kind);
    if let Some(e) = err {
        eprintln!("warning: {}: {}", store.path_of(kind).display(), e);
    }
    session
}

fn load_edit(store: &DataStore, kind: DataKind) -> Session {
    store.load_for_edit(kind).unwrap_or_else(|e| {
        eprintln!("error: {}: {}", store.path_of(kind).display(), e);
        std::process::exit(2);
    })
}

fn cmd_dump(store: &DataStore, args: KindArgs) {
    let session = load_view(store, args.kind);
    let v = mcm_core::json::collection_to_json(&session.collection);
    match serde_json::to_string_pretty(&v) {
        Ok(s) => println!("{}", s),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(5);
        }
    }
}

fn cmd_list(store: &DataStore, args: KindArgs) {
    let session = load_view(store, args.kind);
    for (cat, rec) in session.collection.records() {
        println!("{}", records::label(args.kind, cat, rec));
    }
}

fn cmd_get(store: &DataStore, args: IdArgs) {
    let key = args.kind.key_from(&args.id).unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        std::process::exit(3);
    });
    let session = load_view(store, args.kind);
    match session.collection.find(args.kind.id_field(), &key) {
        Some((_, rec)) => println!("{}", mcm_core::json::to_json_pretty(rec)),
        None => {
            eprintln!("not found: {}", args.id);
            std::process::exit(3);
        }
    }
}

fn cmd_set(store: &DataStore, args: SetArgs) {
    let kind = args.kind;
    let mut session = load_edit(store, kind);
    let raw: serde_json::Value = serde_json::from_str(&args.value).unwrap_or_else(|e| {
        eprintln!("invalid --value JSON: {}", e);
        std::process::exit(3);
    });
    let mut rec: Value = (&raw).into();
    if let Some(tags) = &args.tags {
        let tags = records::split_tags(tags).into_iter().map(Value::Str).collect();
        rec.insert("tags", Value::Array(tags));
    }
    if kind.numeric_ids() && matches!(rec.get("id"), None | Some(Value::Null)) {
        let id = session.collection.next_id(kind.id_field()).unwrap_or_else(|e| {
            eprintln!("error: {}", e);
            std::process::exit(3);
        });
        rec.insert("id", Value::Int(id));
    }
    let stored = RecordKey::of(&rec, kind.id_field())
        .and_then(|key| session.collection.find(kind.id_field(), &key))
        .map(|(_, r)| r.clone());
    let rec = records::normalize_update(kind, stored.as_ref(), &rec).unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        std::process::exit(3);
    });
    let label = records::label(kind, args.category.as_deref(), &rec);
    let outcome = match &args.category {
        Some(cat) => session.collection.upsert_in_category(cat, kind.id_field(), rec),
        None => session.collection.upsert(kind.id_field(), rec),
    };
    finish(store, &session, args.dry_run);
    match outcome {
        Upserted::Replaced(_) => eprintln!("updated {}", label),
        Upserted::Appended(_) => eprintln!("added {}", label),
    }
}

fn cmd_remove(store: &DataStore, args: RemoveArgs) {
    let kind = args.kind;
    let key = kind.key_from(&args.id).unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        std::process::exit(3);
    });
    let mut session = load_edit(store, kind);
    if session.collection.remove(kind.id_field(), &key).is_none() {
        eprintln!("not found: {}", args.id);
        std::process::exit(3);
    }
    finish(store, &session, args.dry_run);
    eprintln!("removed {}", args.id);
}

fn finish(store: &DataStore, session: &Session, dry_run: bool) {
    if dry_run {
        print!("{}", store.render(session));
        return;
    }
    store.save(session).unwrap_or_else(|e| {
        eprintln!("error writing: {}", e);
        std::process::exit(4);
    });
}
