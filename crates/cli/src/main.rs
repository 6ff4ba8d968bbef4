use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use kadi_core::{facets, tables as names, Hash, StatDefinition, StatGroupDefinition, Weapon, WeaponLite};
use kadi_persist::{DirStore, ReadThrough, TableStore};
use kadi_search::{slider_stats, FacetKey, FilterEngine, IdleView};
use kadi_transform::{run_pipeline, Bucket, ManifestTables, PipelineOptions};
use metrics::{counter, histogram};
use serde_json::{json, Value};
use tracing::info;

mod browse;
mod parse;
mod tables;

use tables::Tables;

#[derive(Parser, Debug)]
#[command(name = "kadictl", version, about = "Kadi weapon manifest CLI")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    /// Directory holding transformed tables
    #[arg(long = "tables", global = true, env = "KADI_TABLES_DIR", default_value = "kadi-tables")]
    tables: PathBuf,

    /// SQLite table cache; without a value uses KADI_DB_PATH or ~/.kadi/kadi.db
    #[arg(long = "db", global = true, num_args = 0..=1)]
    db: Option<Option<String>>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum Output { Human, Json }

#[derive(Subcommand, Debug)]
enum Commands {
    /// Turn a manifest snapshot into weapon tables
    Transform {
        /// Directory with one JSON file per manifest table
        #[arg(long = "manifest")]
        manifest: PathBuf,
        /// Output directory (defaults to --tables)
        #[arg(long = "out")]
        out: Option<PathBuf>,
        /// Skip weapons that violate the manifest contract instead of aborting
        #[arg(long = "lenient", action = ArgAction::SetTrue)]
        lenient: bool,
    },
    /// Filter weapons by name and facets
    Search(SearchArgs),
    /// Show one transformed weapon
    Weapon {
        hash: Hash,
    },
    /// Stats offered as threshold sliders for the given categories
    Stats {
        #[arg(long = "category", required = true)]
        category: Vec<String>,
    },
    /// Interactive line-oriented filter session (reads commands from stdin)
    Browse {
        /// Show nothing until a facet is set or the query is longer than N
        #[arg(long = "require-input")]
        require_input: Option<usize>,
        /// Rows per view
        #[arg(long = "limit", default_value_t = 10)]
        limit: usize,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Transform { .. } => "transform",
            Commands::Search(_) => "search",
            Commands::Weapon { .. } => "weapon",
            Commands::Stats { .. } => "stats",
            Commands::Browse { .. } => "browse",
        }
    }
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Case-insensitive name substring
    query: Option<String>,
    #[arg(long = "ammo")]
    ammo: Vec<String>,
    #[arg(long = "damage")]
    damage: Vec<String>,
    #[arg(long = "slot")]
    slot: Vec<String>,
    #[arg(long = "category")]
    category: Vec<String>,
    #[arg(long = "tier")]
    tier: Vec<String>,
    /// Perk hash; any listed perk matches
    #[arg(long = "perk")]
    perk: Vec<String>,
    /// Stat threshold, e.g. `range>40` or `4043523819>60`
    #[arg(long = "stat")]
    stat: Vec<String>,
    /// STAT[:asc|desc]
    #[arg(long = "sort")]
    sort: Option<String>,
    /// Group results by an active facet
    #[arg(long = "group-by")]
    group_by: Option<String>,
    /// Limit results
    #[arg(long = "limit", default_value_t = 20)]
    limit: usize,
}

fn init_tracing() {
    let env = std::env::var("KADI_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr).init();
}

fn init_metrics() {
    if let Ok(addr) = std::env::var("KADI_METRICS_ADDR") {
        if let Ok(sock) = addr.parse::<std::net::SocketAddr>() {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            match builder.with_http_listener(sock).install() {
                Ok(_) => tracing::info!(addr = %addr, "Prometheus metrics exporter listening"),
                Err(e) => tracing::warn!(error = %e, "failed to install metrics exporter"),
            }
        } else {
            tracing::warn!(addr = %addr, "invalid KADI_METRICS_ADDR; expected host:port");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    init_metrics();
    let cli = Cli::parse();
    counter!("cli_commands_total", 1u64, "command" => cli.command.name());

    match cli.command {
        Commands::Transform { manifest, out, lenient } => {
            let out_dir = out.unwrap_or_else(|| cli.tables.clone());
            info!(manifest = %manifest.display(), out = %out_dir.display(), lenient, "transform invoked");
            let snapshot = ManifestTables::load_dir(&manifest)
                .await
                .with_context(|| format!("loading manifest from {}", manifest.display()))?;
            let mut opts = PipelineOptions::from_env();
            if lenient {
                opts.strict = false;
            }
            let started = std::time::Instant::now();
            let run = run_pipeline(&snapshot, &opts).context("transforming weapons")?;
            let encoded = run.encode_tables(&snapshot).context("encoding tables")?;
            histogram!("cli_transform_ms", started.elapsed().as_secs_f64() * 1000.0);
            counter!("cli_weapons_rejected_total", run.rejected as u64);

            let dir = DirStore::new(&out_dir);
            let db = tables::open_db(cli.db.as_ref())?;
            let read_through = db.as_ref().map(|db| ReadThrough::new(db, &dir));
            let store: &dyn TableStore = match &read_through {
                Some(rt) => rt,
                None => &dir,
            };
            for (name, body) in &encoded {
                store.put_table(name, body)?;
            }

            let buckets: serde_json::Map<String, Value> =
                Bucket::ALL.iter().map(|b| (b.as_str().to_string(), json!(run.categories.bucket(*b).len()))).collect();
            match cli.output {
                Output::Human => {
                    for (name, n) in &buckets {
                        println!("{:<12} {}", name, n);
                    }
                    println!("{:<12} {}", "unmatched", run.categories.unmatched());
                    println!("weapons: {} (rejected {})", run.weapons.len(), run.rejected);
                    println!("wrote {} tables to {}", encoded.len(), out_dir.display());
                }
                Output::Json => {
                    let summary = json!({
                        "out": out_dir,
                        "buckets": buckets,
                        "unmatched": run.categories.unmatched(),
                        "weapons": run.weapons.len(),
                        "rejected": run.rejected,
                        "tables": encoded.iter().map(|(n, _)| *n).collect::<Vec<_>>(),
                    });
                    println!("{}", serde_json::to_string_pretty(&summary)?);
                }
            }
        }
        Commands::Search(args) => {
            let tables = Tables::new(cli.tables.clone(), cli.db.as_ref())?;
            search(&tables, args, cli.output)?;
        }
        Commands::Weapon { hash } => {
            let tables = Tables::new(cli.tables.clone(), cli.db.as_ref())?;
            let weapons: Vec<Weapon> = tables.get(names::WEAPONS)?;
            let Some(weapon) = weapons.into_iter().find(|w| w.hash == hash) else {
                bail!("no weapon with hash {hash}");
            };
            match cli.output {
                Output::Human => print_weapon(&weapon),
                Output::Json => println!("{}", serde_json::to_string_pretty(&weapon)?),
            }
        }
        Commands::Stats { category } => {
            let tables = Tables::new(cli.tables.clone(), cli.db.as_ref())?;
            let selected = parse::selection(FacetKey::ItemCategory, &category)?;
            let map: std::collections::BTreeMap<Hash, Hash> = tables.get(names::CATEGORY_STAT_GROUPS)?;
            let groups: Vec<StatGroupDefinition> = tables.get(names::STAT_GROUP_DEFINITIONS)?;
            let stats: Vec<StatDefinition> = tables.get(names::STAT_DEFINITIONS)?;
            let sliders = slider_stats(selected.values(), &map, &groups, &stats);
            match cli.output {
                Output::Human => {
                    if sliders.is_empty() {
                        println!("(no slider stats)");
                    }
                    for s in &sliders {
                        println!("{:<12} {}", s.hash, s.name);
                    }
                }
                Output::Json => println!("{}", serde_json::to_string_pretty(&sliders)?),
            }
        }
        Commands::Browse { require_input, limit } => {
            let tables = Tables::new(cli.tables.clone(), cli.db.as_ref())?;
            let weapons: Vec<WeaponLite> = tables.get(names::WEAPONS_LITE)?;
            let idle = match require_input {
                Some(n) => IdleView::RequireInput { min_query_len: n },
                None => IdleView::All,
            };
            eprintln!("{}", browse::HELP);
            browse::run(weapons, move |e| e.with_idle_view(idle), limit, cli.output).await?;
        }
    }

    Ok(())
}

fn search(tables: &Tables, args: SearchArgs, output: Output) -> Result<()> {
    let weapons: Vec<WeaponLite> = tables.get(names::WEAPONS_LITE)?;
    info!(weapons = weapons.len(), query = ?args.query, "search invoked");
    let mut engine = FilterEngine::new(weapons).with_default_facets();
    let facets = [
        (FacetKey::AmmoType, &args.ammo),
        (FacetKey::DefaultDamageType, &args.damage),
        (FacetKey::EquipmentSlotTypeHash, &args.slot),
        (FacetKey::ItemCategory, &args.category),
        (FacetKey::TierTypeHash, &args.tier),
        (FacetKey::Perks, &args.perk),
        (FacetKey::Stats, &args.stat),
    ];
    for (key, values) in facets {
        if !values.is_empty() {
            engine.set_facet_values(key, parse::selection(key, values)?)?;
        }
    }
    if let Some(q) = &args.query {
        engine.set_query(q.as_str());
    }
    engine.set_sort(args.sort.as_deref().map(parse::sort).transpose()?);
    engine.set_group_by(args.group_by.as_deref().map(FacetKey::from_str).transpose()?)?;

    let view = engine.view();
    let weapons = engine.weapons();
    match output {
        Output::Human => {
            println!("{:<12} {:<32} TYPE", "HASH", "NAME");
            let row = |d: usize| {
                let w = &weapons[d];
                println!("{:<12} {:<32} {}", w.hash, w.name, w.item_type_and_tier_display_name);
            };
            match &view.groups {
                Some(groups) => {
                    for g in groups {
                        println!("== {} ({})", g.label, g.hits.len());
                        g.hits.iter().take(args.limit).copied().for_each(&row);
                    }
                }
                None => view.hits.iter().take(args.limit).copied().for_each(&row),
            }
            eprintln!("{} of {} weapons match", view.hits.len(), weapons.len());
        }
        Output::Json => {
            let pick = |hits: &[usize]| hits.iter().take(args.limit).map(|d| &weapons[*d]).collect::<Vec<_>>();
            let body = match &view.groups {
                Some(groups) => json!({
                    "total": view.hits.len(),
                    "active": view.active,
                    "groups": groups
                        .iter()
                        .map(|g| json!({ "label": g.label, "value": g.value, "weapons": pick(&g.hits) }))
                        .collect::<Vec<_>>(),
                }),
                None => json!({ "total": view.hits.len(), "active": view.active, "weapons": pick(&view.hits) }),
            };
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }
    Ok(())
}

fn print_weapon(w: &Weapon) {
    println!("{} ({})", w.name, w.item_type_and_tier_display_name);
    if !w.flavour_text.is_empty() {
        println!("  \"{}\"", w.flavour_text);
    }
    println!("intrinsic: {}", w.intrinsic.name);
    for (i, col) in w.perks.iter().enumerate() {
        let perks: Vec<&str> = col.items.values().map(|p| p.plug.name.as_str()).collect();
        println!("perks[{i}] {}: {}", col.label, perks.join(", "));
    }
    for (id, stat) in &w.investment_stats {
        let name = facets::basic_stat_name(*id).unwrap_or(stat.stat.name.as_str());
        println!("  {:<18} {}", name, stat.stat.value);
    }
    let sockets = [
        ("catalyst", w.sockets.catalyst.as_ref().map(|m| m.items.len())),
        ("mod", w.sockets.mod_.as_ref().map(|m| m.items.len())),
        ("masterwork", w.sockets.masterwork.as_ref().map(|m| m.items.len())),
        ("ornament", w.sockets.ornament.as_ref().map(|m| m.items.len())),
    ];
    for (socket, n) in sockets {
        match n {
            Some(n) => println!("{socket}: {n} options"),
            None => println!("{socket}: -"),
        }
    }
}
