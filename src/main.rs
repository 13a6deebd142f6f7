//! Oko Dashboard CLI
//!
//! Command-line interface for inspecting and editing the dashboard config
//! held by an Oko backend:
//! - Show pages, the navigation tree and command palette results
//! - Reorder groups, subgroups and items
//! - Check for duplicate ids and normalize layout blocks

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use oko_dashboard::config::{generate_default_config, Config, LoggingConfig};
use oko_dashboard::remote::HttpConfigBackend;
use oko_dashboard::store::{DashboardStore, StoreSettings};
use oko_dashboard::tree::{duplicate_ids, ItemLocation, LayoutBlock};
use oko_dashboard::ui_state::{
    FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, UiStatePersistence, ROOT_ROUTE,
};
use oko_dashboard::view::{PaletteTarget, TreeGroupNode};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "oko-dashboard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect and edit an Oko dashboard config")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend URL (overrides the config file)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Config file (default: search the usual locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the full config
    Show,

    /// List layout pages and their blocks
    Pages,

    /// Print the navigation tree of a page
    Tree {
        /// Page id (default: the remembered or first page)
        #[arg(short, long)]
        page: Option<String>,
        /// Site filter ("all" for every site)
        #[arg(short, long)]
        site: Option<String>,
        /// Text filter
        #[arg(short = 'q', long)]
        filter: Option<String>,
    },

    /// Search the command palette
    Search {
        /// Query tokens
        query: Vec<String>,
        /// Site filter
        #[arg(short, long)]
        site: Option<String>,
    },

    /// Move a group before another group
    MoveGroup {
        source: String,
        target: String,
    },

    /// Move a subgroup before another subgroup (or to the end of a group)
    MoveSubgroup {
        source_group: String,
        source_subgroup: String,
        target_group: String,
        /// Subgroup to insert before; omit to append
        #[arg(default_value = "")]
        target_subgroup: String,
    },

    /// Move an item to another position
    MoveItem {
        source_group: String,
        source_subgroup: String,
        item: String,
        target_group: String,
        target_subgroup: String,
        /// Item to insert before; omit to append
        #[arg(short, long)]
        before: Option<String>,
    },

    /// Create the initial home page when the config has no pages
    Bootstrap,

    /// Clean up layout blocks and save the result
    Normalize,

    /// Report duplicated ids
    Check,

    /// Generate default config file
    Init {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_logging(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("oko_dashboard={}", logging.level)));

    let writer = match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json().with_writer(writer)).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().with_writer(writer)).init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Init { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;
                println!("Config written to {:?}", path);
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(api_url) = &cli.api_url {
        config.remote.base_url = api_url.clone();
    }
    init_logging(&config.logging)?;

    let backend = Arc::new(HttpConfigBackend::new(&config.remote)?);
    tracing::debug!(base_url = %backend.base_url(), "Using config backend");
    let store = DashboardStore::new(backend, StoreSettings::from(&config.store));

    if let Err(e) = store.load_config().await {
        eprintln!("Cannot load dashboard config from {}", config.remote.base_url);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    run(cli, &config, &store).await
}

async fn run(cli: Cli, config: &Config, store: &DashboardStore) -> anyhow::Result<()> {
    let json = cli.format == OutputFormat::Json;

    match cli.command {
        Commands::Show => {
            let dashboard = store.config().await.context("No config loaded")?;
            println!("{}", serde_json::to_string_pretty(&dashboard)?);
        }

        Commands::Pages => {
            let dashboard = store.config().await.context("No config loaded")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&dashboard.layout.pages)?);
            } else if dashboard.layout.pages.is_empty() {
                println!("No pages defined yet.");
                println!();
                println!("Create the initial page with:");
                println!("  oko-dashboard bootstrap");
            } else {
                println!("{:<20} {:<24} {}", "ID", "Title", "Blocks");
                println!("{}", "-".repeat(60));
                for page in &dashboard.layout.pages {
                    let blocks: Vec<String> = page.blocks.iter().map(describe_block).collect();
                    println!("{:<20} {:<24} {}", page.id, page.title, blocks.join(", "));
                }
            }
        }

        Commands::Tree { page, site, filter } => {
            let kv: Arc<dyn KeyValueStore> = if config.ui_state.dir.trim().is_empty() {
                Arc::new(MemoryKeyValueStore::new())
            } else {
                Arc::new(FileKeyValueStore::new(&config.ui_state.dir))
            };
            let mut ui_state = UiStatePersistence::open(kv, config.ui_state.storage_key.clone());
            if let Some(snapshot) = ui_state.snapshot_for(ROOT_ROUTE).cloned() {
                store.restore_ui_state(&snapshot).await;
            }

            if let Some(page) = page {
                store.with_tree(|tree, _| tree.active_page_id = page).await;
            }
            if let Some(site) = site {
                store.set_site_filter(&site).await;
            }
            if let Some(filter) = filter {
                store.set_tree_filter(&filter).await;
            }

            let groups = store.filtered_tree_groups().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&groups)?);
            } else {
                let tree = store.tree_state().await;
                println!("Page: {}", tree.active_page_id);
                print_tree(&groups);
            }

            ui_state.remember(ROOT_ROUTE, store.ui_snapshot().await);
        }

        Commands::Search { query, site } => {
            if let Some(site) = site {
                store.set_site_filter(&site).await;
            }
            let results = store.search_palette(&query.join(" ")).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else if results.is_empty() {
                println!("No matches.");
            } else {
                for entry in results {
                    let location = format!("{} / {}", entry.group_title, entry.subgroup_title);
                    match &entry.target {
                        PaletteTarget::Item { url, .. } => {
                            println!("{:<28} {:<32} {}", entry.title, location, url)
                        }
                        PaletteTarget::Action { .. } => println!("{:<28} {}", entry.title, location),
                    }
                }
            }
        }

        Commands::MoveGroup { source, target } => {
            report_move(store.move_group(&source, &target).await?, store).await;
        }

        Commands::MoveSubgroup {
            source_group,
            source_subgroup,
            target_group,
            target_subgroup,
        } => {
            let moved = store
                .move_subgroup(&source_group, &source_subgroup, &target_group, &target_subgroup)
                .await?;
            report_move(moved, store).await;
        }

        Commands::MoveItem {
            source_group,
            source_subgroup,
            item,
            target_group,
            target_subgroup,
            before,
        } => {
            let source = ItemLocation::new(source_group, source_subgroup, item);
            let moved = match before {
                Some(before) => {
                    let target = ItemLocation::new(target_group, target_subgroup, before);
                    store.move_item_before(&source, &target).await?
                }
                None => {
                    store
                        .move_item_to_subgroup_end(&source, &target_group, &target_subgroup)
                        .await?
                }
            };
            report_move(moved, store).await;
        }

        Commands::Bootstrap => {
            if store.bootstrap_initial_dashboard().await? {
                let tree = store.tree_state().await;
                println!("Created page {}", tree.active_page_id);
            } else {
                println!("Config already has pages, nothing to do.");
            }
        }

        Commands::Normalize => {
            if store.apply_config_mutation(|_| Ok(true)).await? {
                println!("Layout normalized and saved.");
            }
        }

        Commands::Check => {
            let dashboard = store.config().await.context("No config loaded")?;
            let duplicates = duplicate_ids(&dashboard);
            if duplicates.is_empty() {
                println!(
                    "OK: {} groups, {} items, {} pages",
                    dashboard.groups.len(),
                    dashboard.items().count(),
                    dashboard.layout.pages.len()
                );
            } else {
                for (kind, ids) in [
                    ("group", &duplicates.groups),
                    ("subgroup", &duplicates.subgroups),
                    ("item", &duplicates.items),
                ] {
                    for id in ids {
                        eprintln!("Duplicate {} id: {}", kind, id);
                    }
                }
                bail!("Config contains duplicate ids");
            }
        }

        Commands::Init { .. } => {}
    }

    Ok(())
}

async fn report_move(moved: bool, store: &DashboardStore) {
    if moved {
        let save = store.save_state().await;
        println!("Moved ({})", save.status);
    } else {
        println!("Nothing to move: unknown id or same position.");
    }
}

fn describe_block(block: &LayoutBlock) -> String {
    match block.group_ids() {
        Some(ids) => format!("{}[{}]", block.type_name(), ids.join(" ")),
        None => format!(
            "{}[{}]",
            block.type_name(),
            block.widgets().map(|widgets| widgets.len()).unwrap_or(0)
        ),
    }
}

fn print_tree(groups: &[TreeGroupNode]) {
    if groups.is_empty() {
        println!("  (empty)");
        return;
    }

    for group in groups {
        println!("{} [{}]", group.title, group.key);
        for subgroup in &group.subgroups {
            println!("  {} [{}]", subgroup.title, subgroup.id);
            for item in &subgroup.items {
                println!("    {:<28} {}", item.title, item.url);
            }
        }
    }
}
