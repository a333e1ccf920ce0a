//! mapforge command line
//!
//! Usage:
//!   mapforge catalog                 # Print the GRH catalog
//!   mapforge prefab-info house.json  # Summarize a prefab file
//!   mapforge prefabs --category Nature
//!   mapforge init-config             # Write a default config file
//!   mapforge demo                    # Exercise the editing core on a scratch map

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mapforge::catalog::GrhCatalog;
use mapforge::config::EditorConfig;
use mapforge::editor::{Command, EdgeLinks, MapContext, TransferTool, Workspace};
use mapforge::prefab::{self, PrefabFeatures, PrefabLibrary};
use mapforge::world::{Exit, Layer, MapGrid};

#[derive(Parser)]
#[command(name = "mapforge")]
#[command(version = mapforge::VERSION)]
#[command(about = "Tile-map editing core: catalog, prefabs and undoable edits")]
struct Cli {
    /// Config file (defaults to the per-user location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print catalog categories and records, creating the default library if missing
    Catalog {
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Summarize a prefab file
    PrefabInfo {
        file: PathBuf,
    },
    /// List prefabs in the library
    Prefabs {
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Only show this category
        #[arg(long)]
        category: Option<String>,
    },
    /// Write a default config file
    InitConfig {
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Build a scratch map, stamp a prefab, place exits, undo and redo
    Demo,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(EditorConfig::default_path);
    let config = EditorConfig::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;

    match cli.command {
        Commands::Catalog { path } => show_catalog(path.unwrap_or(config.catalog_path)),
        Commands::PrefabInfo { file } => prefab_info(file),
        Commands::Prefabs { dir, category } => {
            list_prefabs(dir.unwrap_or(config.prefab_dir), category.unwrap_or_default())
        }
        Commands::InitConfig { path } => init_config(path.unwrap_or(config_path)),
        Commands::Demo => demo(&config),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn show_catalog(path: PathBuf) -> Result<()> {
    let catalog = GrhCatalog::load_or_default(&path)
        .with_context(|| format!("Failed to load catalog {}", path.display()))?;

    println!("{} ({} records)", path.display(), catalog.record_count());
    for category in &catalog.categories {
        println!("[{}]", category.name);
        for record in &category.records {
            println!(
                "  {:>6}  {:<24} layer {}{}  {}x{}",
                record.grh_index,
                record.name,
                record.layer,
                if record.auto_block { " blocks" } else { "" },
                record.width,
                record.height,
            );
        }
    }
    Ok(())
}

fn prefab_info(file: PathBuf) -> Result<()> {
    let prefab = prefab::load_prefab(&file)
        .with_context(|| format!("Failed to load prefab {}", file.display()))?;
    let stats = prefab.stats();

    println!("Name:      {}", prefab.name);
    println!("Category:  {}", prefab.category);
    if !prefab.author.is_empty() {
        println!("Author:    {}", prefab.author);
    }
    println!("Size:      {}x{}", prefab.width, prefab.height);
    println!("Features:  {}", prefab.features.summary());
    println!("Cells:     {}", stats.cells);
    for layer in Layer::ALL {
        println!("  {}:      {}", layer, stats.layers[layer.number() - 1]);
    }
    println!("  blocked: {}", stats.blocked);
    println!("  trigger: {}", stats.triggers);
    println!("  objects: {}", stats.objects);
    println!("  npcs:    {}", stats.npcs);
    println!("  fx:      {}", stats.particles);
    Ok(())
}

fn list_prefabs(dir: PathBuf, category: String) -> Result<()> {
    let mut library = PrefabLibrary::with_dir(&dir);
    library
        .discover()
        .with_context(|| format!("Failed to read prefab directory {}", dir.display()))?;

    if library.is_empty() {
        println!("No prefabs in {}", dir.display());
        return Ok(());
    }
    println!("Categories: {}", library.categories().join(", "));
    for prefab in library.by_category(&category) {
        println!(
            "  {:<24} {:<16} {}x{}  {} cells",
            prefab.name,
            prefab.category,
            prefab.width,
            prefab.height,
            prefab.cells.len()
        );
    }
    Ok(())
}

fn init_config(path: PathBuf) -> Result<()> {
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    EditorConfig::default()
        .save(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn demo(config: &EditorConfig) -> Result<()> {
    let catalog = GrhCatalog::default_library();
    let mut workspace = Workspace::new();
    let idx = workspace.open(
        MapContext::new(MapGrid::new(1, 32, 32)).with_history_limit(config.history_limit),
    );
    let ctx = workspace.get_mut(idx).context("scratch map missing")?;

    // a small walled hut at (2, 2)
    let floor = catalog.find(1).context("default catalog has no floor")?.clone();
    let wall = catalog.find(100).context("default catalog has no wall")?.clone();
    let mut edits = Vec::new();
    for y in 2..6 {
        for x in 2..6 {
            let record = if x == 2 || x == 5 || y == 2 || y == 5 { &wall } else { &floor };
            edits.push(Command::place_graphic(ctx.grid(), x, y, record)?);
        }
    }
    edits.push(Command::set_npc(ctx.grid(), 3, 3, 12)?);
    ctx.execute(Command::batch("Build hut", edits))?;

    let hut = prefab::capture(ctx.grid(), 2, 2, 4, 4, PrefabFeatures::all())
        .named("Hut", "Buildings", "demo");
    println!("Captured '{}': {} cells, {}", hut.name, hut.cells.len(), hut.features.summary());

    let placed = prefab::apply_centered(ctx, 16, 16, &hut, PrefabFeatures::all())?;
    println!(
        "Stamped at map centre: {} cells, {} blocked tiles",
        placed,
        ctx.grid().count_where(|t| t.blocked())
    );

    // copy exit coordinates, then paint them with the transfer tool
    workspace.staging_mut().capture(2, 50, 50);
    let (ctx, staging) = workspace.active_with_staging().context("no active map")?;
    let mut tool = TransferTool::new(config.view_half_width, config.view_half_height);
    tool.take_staged(staging);
    tool.apply_at(ctx, 20, 20)?;
    let linked = tool.auto_union(
        ctx,
        EdgeLinks { north: Some(3), ..Default::default() },
    )?;
    println!(
        "Exit at (20, 20) -> {:?}; auto-union linked {} tiles",
        ctx.grid().tile(20, 20)?.exit(),
        linked
    );

    println!("History: {}", ctx.history().undo_labels().join(" <- "));
    while ctx.undo() {}
    println!(
        "After undo all: {} non-empty tiles, exit cleared: {}",
        ctx.grid().count_where(|t| !t.is_empty()),
        ctx.grid().tile(20, 20)?.exit() == Exit::NONE
    );
    while ctx.redo() {}
    println!(
        "After redo all: {} non-empty tiles, {} redo steps left",
        ctx.grid().count_where(|t| !t.is_empty()),
        ctx.history().redo_len()
    );
    Ok(())
}
