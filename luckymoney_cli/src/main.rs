use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use clap::{Parser, Subcommand};
use rand::{rngs::StdRng, SeedableRng};
use tracing_subscriber::EnvFilter;

use luckymoney_core::{
    Amount, FileStorage, GameStore, HistoryLog, HmacRandom, MemoryStorage, RandomSource,
    RiggingConfig, StateStorage, StoreConfig, DEFAULT_STORAGE_KEY,
};
use luckymoney_shared::{SpinLogEntry, SpinRequest};

#[derive(Parser)]
#[command(name = "luckymoney-cli", about = "Admin CLI for the lucky-money machine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Directory holding the saved state
    #[arg(long, env = "STATE_DIR", default_value = ".")]
    state_dir: PathBuf,
    #[arg(long, env = "STORAGE_KEY", default_value = DEFAULT_STORAGE_KEY)]
    storage_key: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Show stock per denomination and the total value left
    Inventory,
    /// Add (or remove, with a negative delta) stock of one denomination
    Adjust {
        value: u64,
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
    /// Restore every denomination to its initial quantity
    Reset,
    /// Arm the next spin
    Rig {
        #[command(subcommand)]
        mode: RigMode,
    },
    /// Spin once for a player
    Spin { name: String },
    /// View last N spins, newest first
    ViewLogs {
        #[arg(default_value_t = 20)]
        n: usize,
    },
    /// Export spins to CSV path, oldest first
    ExportCsv { path: PathBuf },
    /// Replay N spins against a copy of the saved state with a seeded stream
    Simulate {
        #[arg(long, default_value_t = 1000)]
        spins: u32,
        #[arg(long, default_value = "server")]
        server_seed: String,
        #[arg(long, default_value = "client")]
        client_seed: String,
        #[arg(long, default_value_t = 0)]
        nonce: u64,
    },
}

#[derive(Subcommand)]
enum RigMode {
    /// Honest weighted draw
    Random,
    /// Pay out `target` if it is in stock
    Force { target: u64 },
    /// Show `fake`, then pay out `real` if it is in stock
    Troll { fake: u64, real: u64 },
}

impl From<RigMode> for RiggingConfig {
    fn from(mode: RigMode) -> Self {
        match mode {
            RigMode::Random => RiggingConfig::Random,
            RigMode::Force { target } => RiggingConfig::ForceValue { target },
            RigMode::Troll { fake, real } => RiggingConfig::TrollFakeThenReal {
                displayed: fake,
                real,
            },
        }
    }
}

fn print_inventory<S, R>(store: &GameStore<S, R>)
where
    S: StateStorage,
    R: RandomSource,
{
    for d in store.inventory().denominations() {
        println!(
            "{:>9} x {:>4} (initial {})",
            d.value, d.quantity, d.initial_quantity
        );
    }
    println!("total value: {}", store.total_value());
}

/// Writes the history oldest first; returns the row count.
fn export_csv(history: &HistoryLog, path: &Path) -> anyhow::Result<usize> {
    let mut wtr = csv::Writer::from_path(path)?;
    let mut total = 0usize;
    for e in history.chronological() {
        wtr.serialize(SpinLogEntry::from(e))?;
        total += 1;
    }
    wtr.flush()?;
    Ok(total)
}

struct SimulationReport {
    counts: BTreeMap<Amount, u32>,
    empty: u32,
    total_value_left: Amount,
}

/// Spins a throwaway in-memory copy; the saved record is left alone.
fn simulate<S, R>(
    store: &GameStore<S, R>,
    rng: HmacRandom,
    spins: u32,
    config: StoreConfig,
) -> SimulationReport
where
    S: StateStorage,
    R: RandomSource,
{
    let mut sim = GameStore::from_state(store.snapshot(), MemoryStorage::new(), rng, config);
    let mut counts = BTreeMap::new();
    let mut empty = 0u32;
    for i in 0..spins {
        let outcome = sim.spin(&format!("sim-{i}"));
        if outcome.is_empty() {
            empty += 1;
        } else {
            *counts.entry(outcome.real).or_insert(0) += 1;
        }
    }
    SimulationReport {
        counts,
        empty,
        total_value_left: sim.total_value(),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let config = StoreConfig {
        storage_key: cli.storage_key,
        ..StoreConfig::default()
    };
    let storage = FileStorage::new(&cli.state_dir);
    storage.path_for(&config.storage_key)?;
    let mut store = GameStore::open(
        storage,
        StdRng::from_entropy(),
        config.clone(),
    );

    match cli.command {
        Commands::Inventory => print_inventory(&store),
        Commands::Adjust { value, delta } => match store.adjust_quantity(value, delta) {
            Some(quantity) => println!("{value} now has {quantity} left"),
            None => println!("{value} is not in the catalog, nothing changed"),
        },
        Commands::Reset => {
            store.reset_inventory();
            print_inventory(&store);
        }
        Commands::Rig { mode } => {
            let rigging = RiggingConfig::from(mode);
            store.set_rigging(rigging);
            println!("next spin: {rigging:?}");
        }
        Commands::Spin { name } => {
            let req = SpinRequest { user_name: name };
            let outcome = store.spin(req.validated_name()?);
            if outcome.is_empty() {
                println!("the machine is empty");
            } else if outcome.is_troll() {
                println!("shown {} ... actually {}", outcome.displayed, outcome.real);
            } else {
                println!("won {}", outcome.real);
            }
        }
        Commands::ViewLogs { n } => {
            for e in store.history().latest(n).map(SpinLogEntry::from) {
                println!(
                    "{} {} {:<16} shown={} real={} {:?}",
                    e.id,
                    e.ts.to_rfc3339(),
                    e.user_name,
                    e.display_value,
                    e.real_value,
                    e.scenario
                );
            }
        }
        Commands::ExportCsv { path } => {
            let total = export_csv(store.history(), &path)?;
            println!("Exported {} rows to {}", total, path.display());
        }
        Commands::Simulate {
            spins,
            server_seed,
            client_seed,
            nonce,
        } => {
            let rng = HmacRandom::new(server_seed, client_seed, nonce);
            println!("server_seed_hash={}", rng.server_seed_hash_hex());
            let report = simulate(&store, rng, spins, config);
            for (value, count) in &report.counts {
                println!(
                    "{:>9}: {:>6} ({:.2}%)",
                    value,
                    count,
                    f64::from(*count) * 100.0 / f64::from(spins.max(1))
                );
            }
            println!("empty spins: {}", report.empty);
            println!("left after simulation: {}", report.total_value_left);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn file_store(dir: &Path) -> GameStore<FileStorage, StdRng> {
        GameStore::open(
            FileStorage::new(dir),
            StdRng::seed_from_u64(3),
            StoreConfig::default(),
        )
    }

    #[test]
    fn simulate_leaves_saved_state_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = file_store(dir.path());
        store.spin("before");
        let path = store.storage().path_for(DEFAULT_STORAGE_KEY).unwrap();
        let saved = fs::read(&path).unwrap();

        let report = simulate(&store, HmacRandom::new("s", "c", 0), 100, StoreConfig::default());

        // 59 units of stock remain, so 41 spins come up empty.
        assert_eq!(report.counts.values().sum::<u32>(), 59);
        assert_eq!(report.empty, 41);
        assert_eq!(report.total_value_left, 0);
        assert_eq!(fs::read(&path).unwrap(), saved);
        assert_eq!(store.history().len(), 1);
        assert_eq!(file_store(dir.path()).inventory(), store.inventory());
    }

    #[test]
    fn export_csv_writes_oldest_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = GameStore::open(
            MemoryStorage::new(),
            StdRng::seed_from_u64(5),
            StoreConfig::default(),
        );
        store.spin("first");
        store.set_rigging(RiggingConfig::TrollFakeThenReal {
            displayed: 500_000,
            real: 20_000,
        });
        store.spin("second");

        let path = dir.path().join("spins.csv");
        assert_eq!(export_csv(store.history(), &path).unwrap(), 2);

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = rdr.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(
            headers,
            ["id", "ts", "user_name", "display_value", "real_value", "scenario"]
        );
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][2], "first");
        assert_eq!(&rows[0][5], "random");
        assert_eq!(&rows[1][2], "second");
        assert_eq!(&rows[1][3], "500000");
        assert_eq!(&rows[1][4], "20000");
        assert_eq!(&rows[1][5], "troll_fake_to_real");
    }

    #[test]
    fn negative_delta_parses() {
        let cli = Cli::try_parse_from(["luckymoney-cli", "adjust", "500000", "-2"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Adjust {
                value: 500_000,
                delta: -2
            }
        ));
    }

    #[test]
    fn troll_subcommand_maps_to_rigging() {
        let cli = Cli::try_parse_from(["luckymoney-cli", "rig", "troll", "500000", "20000"]).unwrap();
        let Commands::Rig { mode } = cli.command else {
            panic!("expected rig");
        };
        assert_eq!(
            RiggingConfig::from(mode),
            RiggingConfig::TrollFakeThenReal {
                displayed: 500_000,
                real: 20_000
            }
        );
    }
}
