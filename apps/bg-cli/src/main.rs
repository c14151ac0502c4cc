use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::debug;

use bg_core::units::format_length;
use bg_core::Point;
use bg_graph::{BoardGraph, Connection, GraphError, Side};
use bg_resource::{AssetConfig, ComponentType, ConnectorType, ResourceCache, ResourceError};

#[derive(Parser)]
#[command(name = "bg-cli")]
#[command(about = "BoardGraph CLI - inspect and validate board files", long_about = None)]
struct Cli {
    /// Asset root directory (overrides the config file)
    #[arg(long, global = true)]
    assets: Option<PathBuf>,
    /// YAML asset configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a board and check that its connections are consistent
    Validate {
        /// Path to the board JSON file
        board_path: PathBuf,
    },
    /// Print the nodes and edges of a board
    Show {
        /// Path to the board JSON file
        board_path: PathBuf,
    },
    /// List resource ids found in the asset directories
    Resources {
        #[arg(value_enum)]
        kind: ResourceKind,
    },
    /// Create an empty board file
    New {
        /// Path of the board JSON file to create
        board_path: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ResourceKind {
    Components,
    Connectors,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error("{} already exists", .0.display())]
    Exists(PathBuf),
}

type CliResult<T> = Result<T, CliError>;

fn main() -> CliResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cache = Rc::new(ResourceCache::with_assets(&asset_config(&cli)?));

    match cli.command {
        Commands::Validate { board_path } => cmd_validate(&board_path, cache),
        Commands::Show { board_path } => cmd_show(&board_path, cache),
        Commands::Resources { kind } => cmd_resources(kind, &cache),
        Commands::New { board_path } => cmd_new(&board_path, cache),
    }
}

fn asset_config(cli: &Cli) -> CliResult<AssetConfig> {
    let mut config = match &cli.config {
        Some(path) => AssetConfig::load_yaml(path)?,
        None => AssetConfig::default(),
    };
    if let Some(root) = &cli.assets {
        config.root = root.clone();
    }
    debug!(root = %config.root.display(), "using asset root");
    Ok(config)
}

fn cmd_validate(board_path: &Path, cache: Rc<ResourceCache>) -> CliResult<()> {
    println!("Validating board: {}", board_path.display());
    let board = BoardGraph::open(board_path, cache)?;
    board.validate()?;
    println!(
        "✓ Board is valid ({} nodes, {} edges)",
        board.node_count(),
        board.edge_count()
    );
    Ok(())
}

fn cmd_show(board_path: &Path, cache: Rc<ResourceCache>) -> CliResult<()> {
    let board = BoardGraph::open(board_path, cache)?;
    println!(
        "{}: {} nodes, {} edges",
        board_path.display(),
        board.node_count(),
        board.edge_count()
    );

    if board.node_count() > 0 {
        println!("Nodes:");
        for node in board.nodes() {
            println!(
                "  {} - {} [{}] at {}",
                node.id(),
                node.name(),
                node.ty().id(),
                fmt_point(node.pos())
            );
        }
    }
    if board.edge_count() > 0 {
        println!("Edges:");
        for edge in board.edges() {
            println!(
                "  {}: {} -> {}",
                edge.id(),
                fmt_end(&board, edge.conn(Side::Left)),
                fmt_end(&board, edge.conn(Side::Right))
            );
        }
    }
    Ok(())
}

fn fmt_point(p: Point) -> String {
    format!("({}, {})", format_length(p.x), format_length(p.y))
}

fn fmt_end(board: &BoardGraph, conn: &Connection) -> String {
    let connector = conn.connector().id();
    match (conn.node(), conn.port(board)) {
        (Some(node), Some((_, port))) => format!("{node}.{} ({connector})", port.id()),
        _ => match conn.position(board) {
            Some(pos) => format!("{} ({connector})", fmt_point(pos)),
            None => format!("<unresolved> ({connector})"),
        },
    }
}

fn cmd_resources(kind: ResourceKind, cache: &ResourceCache) -> CliResult<()> {
    let ids = match kind {
        ResourceKind::Components => cache.available::<ComponentType>()?,
        ResourceKind::Connectors => cache.available::<ConnectorType>()?,
    };
    if ids.is_empty() {
        println!("No resources found");
    } else {
        for id in ids {
            println!("  {id}");
        }
    }
    Ok(())
}

fn cmd_new(board_path: &Path, cache: Rc<ResourceCache>) -> CliResult<()> {
    if board_path.exists() {
        return Err(CliError::Exists(board_path.to_path_buf()));
    }
    BoardGraph::open_or_create(board_path, cache)?;
    println!("✓ Created {}", board_path.display());
    Ok(())
}
