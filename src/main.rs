//! Rfstore CLI - inspect and maintain an RF emitter database

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rfstore::config;
use rfstore::{BoundingBox, EmitterIdentity, EmitterRecord, EmitterStore, EmitterType};

#[derive(Parser)]
#[command(name = "rfstore")]
#[command(version = "0.1.0")]
#[command(about = "Persistent store for RF emitter observations with spatial queries")]
#[command(long_about = r#"
Rfstore keeps a local SQLite database of RF emitters (Wi-Fi access
points, cell towers, Bluetooth beacons), each with an estimated
position, uncertainty radius, trust score and note.

Example usage:
  rfstore init
  rfstore get --type wifi --id 00:11:22:33:44:55
  rfstore query --type wifi --north 48.3 --south 48.1 --east 16.5 --west 16.2
  rfstore export > emitters.jsonl
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and write an rfstore.toml config
    Init {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Look up a single emitter by type and identifier
    Get {
        /// Emitter type (wifi, bluetooth, cell)
        #[arg(short = 't', long = "type")]
        emitter_type: String,

        /// Emitter identifier (BSSID, cell ID, MAC)
        #[arg(short, long)]
        id: String,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// List emitters of one type inside a bounding box
    Query {
        /// Emitter type (wifi, bluetooth, cell)
        #[arg(short = 't', long = "type")]
        emitter_type: String,

        /// Northern edge, degrees latitude
        #[arg(long)]
        north: f64,

        /// Southern edge, degrees latitude
        #[arg(long)]
        south: f64,

        /// Eastern edge, degrees longitude
        #[arg(long)]
        east: f64,

        /// Western edge, degrees longitude
        #[arg(long)]
        west: f64,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Show per-type emitter counts
    Stats {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Dump all emitters as JSON lines on stdout
    Export {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Load emitters from a JSON lines file in one atomic batch
    Import {
        /// File of JSON lines as produced by `rfstore export`
        #[arg(short, long)]
        file: PathBuf,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },
}

/// One emitter as a JSON line, for export/import
#[derive(Serialize, Deserialize)]
struct EmitterLine {
    #[serde(rename = "type")]
    emitter_type: EmitterType,
    id: String,
    latitude: f64,
    longitude: f64,
    radius: f64,
    trust: i64,
    #[serde(default)]
    note: String,
}

impl EmitterLine {
    fn from_parts(identity: &EmitterIdentity, record: &EmitterRecord) -> Self {
        Self {
            emitter_type: identity.emitter_type,
            id: identity.id.clone(),
            latitude: record.latitude,
            longitude: record.longitude,
            radius: record.radius,
            trust: record.trust,
            note: record.note.clone(),
        }
    }

    fn into_parts(self) -> (EmitterIdentity, EmitterRecord) {
        let identity = EmitterIdentity::new(self.emitter_type, self.id);
        let record = EmitterRecord {
            latitude: self.latitude,
            longitude: self.longitude,
            radius: self.radius,
            trust: self.trust,
            note: self.note,
        };
        (identity, record)
    }
}

/// Resolve the database path: explicit flag, then config, then rf.db
fn resolve_database(arg: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(path) = arg {
        return Ok(path);
    }
    if let Some(cfg) = config::load_config(None)? {
        if let Some(db) = cfg.database {
            return Ok(PathBuf::from(db));
        }
    }
    Ok(config::default_database_path())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Init { database, force } => {
            let db_path = database.unwrap_or_else(config::default_database_path);
            config::ensure_db_dir(&db_path)?;
            let store = EmitterStore::open(&db_path)?;
            store.close()?;

            let cfg = config::RfstoreConfig {
                database: Some(db_path.to_string_lossy().to_string()),
            };
            config::write_config(&config::default_config_path(), &cfg, force)?;
            println!("Initialized emitter database at {}", db_path.display());
        }

        Commands::Get {
            emitter_type,
            id,
            database,
        } => {
            let db_path = resolve_database(database)?;
            let store = EmitterStore::open(&db_path)?;
            let identity = EmitterIdentity::new(emitter_type.parse()?, id);

            match store.get_emitter(&identity)? {
                Some(record) => {
                    let line = EmitterLine::from_parts(&identity, &record);
                    println!("{}", serde_json::to_string_pretty(&line)?);
                }
                None => {
                    println!("No record for {}", identity);
                }
            }
        }

        Commands::Query {
            emitter_type,
            north,
            south,
            east,
            west,
            database,
        } => {
            if south > north {
                anyhow::bail!("invalid bounding box: south > north");
            }
            let db_path = resolve_database(database)?;
            let store = EmitterStore::open(&db_path)?;
            let bb = BoundingBox::new(north, south, east, west);

            let found = store.get_emitters(emitter_type.parse()?, &bb)?;
            let mut ids: Vec<_> = found.iter().map(|e| e.id.as_str()).collect();
            ids.sort_unstable();
            for id in &ids {
                println!("{}", id);
            }
            tracing::info!("{} emitters in {}", ids.len(), bb);
        }

        Commands::Stats { database } => {
            let db_path = resolve_database(database)?;
            let store = EmitterStore::open(&db_path)?;
            print!("{}", store.stats()?);
        }

        Commands::Export { database } => {
            let db_path = resolve_database(database)?;
            let store = EmitterStore::open(&db_path)?;
            for (identity, record) in store.export_all()? {
                let line = EmitterLine::from_parts(&identity, &record);
                println!("{}", serde_json::to_string(&line)?);
            }
        }

        Commands::Import { file, database } => {
            let db_path = resolve_database(database)?;
            config::ensure_db_dir(&db_path)?;
            let mut store = EmitterStore::open(&db_path)?;

            let reader = std::io::BufReader::new(std::fs::File::open(&file)?);
            let mut imported = 0usize;
            let mut updated = 0usize;

            store.begin_transaction()?;
            for line in reader.lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let parsed: EmitterLine = serde_json::from_str(&line)?;
                let (identity, record) = parsed.into_parts();

                if store.get_emitter(&identity)?.is_some() {
                    store.update(&identity, &record)?;
                    updated += 1;
                } else {
                    store.insert(&identity, &record)?;
                    imported += 1;
                }
            }
            store.end_transaction()?;

            println!("Imported {} new, updated {} existing", imported, updated);
        }
    }

    Ok(())
}
