//! SNOMED graph CLI
//!
//! # Usage
//!
//! ```bash
//! # Build a snapshot from an RF2 release
//! snomed-graph import --rf2 SnomedCT_InternationalRF2_PRODUCTION_20240101T120000Z --output snomed.gml
//!
//! # Query it
//! snomed-graph stats --snapshot snomed.gml
//! snomed-graph concept --snapshot snomed.gml --id 22298006
//! snomed-graph path --snapshot snomed.gml --from 22298006 --to 138875005
//!
//! # Node/edge tables as JSON
//! snomed-graph export --snapshot snomed.gml --output tables.json
//! ```
//!
//! Logging goes to stderr; set `RUST_LOG` (default `info`) or pass `-v`.

use clap::{Parser, Subcommand};
use snomed_graph::{ConceptId, ConceptSet, OntologyConfig, OntologyGraph};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "snomed-graph")]
#[command(about = "Build, persist and query a SNOMED CT concept graph", long_about = None)]
struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the graph from an RF2 release and write a snapshot
    Import {
        /// RF2 release directory (contains Snapshot/Terminology)
        #[arg(long)]
        rf2: PathBuf,

        /// Snapshot file to write
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print graph statistics
    Stats {
        #[arg(short, long)]
        snapshot: PathBuf,
    },

    /// Show one concept with its parents, children and inferred relationships
    Concept {
        #[arg(short, long)]
        snapshot: PathBuf,

        #[arg(long)]
        id: ConceptId,
    },

    /// List all ancestors of a concept
    Ancestors {
        #[arg(short, long)]
        snapshot: PathBuf,

        #[arg(long)]
        id: ConceptId,
    },

    /// List all descendants of a concept
    Descendants {
        #[arg(short, long)]
        snapshot: PathBuf,

        #[arg(long)]
        id: ConceptId,
    },

    /// Shortest is-a path between two concepts
    Path {
        #[arg(short, long)]
        snapshot: PathBuf,

        #[arg(long)]
        from: ConceptId,

        #[arg(long)]
        to: ConceptId,
    },

    /// Write node and edge tables as JSON
    Export {
        #[arg(short, long)]
        snapshot: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => OntologyConfig::from_yaml(path)?,
        None => OntologyConfig::default(),
    };

    match cli.command {
        Commands::Import { rf2, output } => import(&rf2, &output, config)?,
        Commands::Stats { snapshot } => {
            let graph = load(&snapshot, config)?;
            println!("{}", graph);
            println!("{}", serde_json::to_string_pretty(&graph.stats())?);
        }
        Commands::Concept { snapshot, id } => show_concept(&load(&snapshot, config)?, id)?,
        Commands::Ancestors { snapshot, id } => {
            print_set(&load(&snapshot, config)?.get_ancestors(id)?);
        }
        Commands::Descendants { snapshot, id } => {
            print_set(&load(&snapshot, config)?.get_descendants(id)?);
        }
        Commands::Path { snapshot, from, to } => {
            let graph = load(&snapshot, config)?;
            let path = graph.find_path(from, to)?;
            println!("{} step(s)", path.len());
            for step in &path {
                println!("  {}", step);
            }
        }
        Commands::Export { snapshot, output } => {
            let graph = load(&snapshot, config)?;
            std::fs::write(&output, graph.to_table_view().to_json()?)?;
            println!("Tables written to {}", output.display());
        }
    }

    Ok(())
}

fn import(rf2: &Path, output: &Path, config: OntologyConfig) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let graph = OntologyGraph::from_rf2(rf2, config)?;
    info!("import: built in {:.2?}", start.elapsed());

    graph.save(output)?;
    println!("{}", graph);
    println!("{}", serde_json::to_string_pretty(graph.build_stats())?);
    println!("Snapshot written to {}", output.display());
    Ok(())
}

fn load(snapshot: &Path, config: OntologyConfig) -> snomed_graph::Result<OntologyGraph> {
    let start = Instant::now();
    let graph = OntologyGraph::from_serialized(snapshot, config)?;
    info!("snapshot loaded in {:.2?}", start.elapsed());
    Ok(graph)
}

fn show_concept(graph: &OntologyGraph, id: ConceptId) -> snomed_graph::Result<()> {
    let concept = graph.get_concept_details(id)?;
    println!("{}", concept);
    if let Ok(tag) = concept.hierarchy() {
        println!("Hierarchy: {}", tag);
    }
    if !concept.synonyms.is_empty() {
        println!("Synonyms: {}", concept.synonyms.join("; "));
    }

    println!("Parents:");
    for parent in graph.get_parents(id)? {
        println!("  {}", parent);
    }
    println!("Children:");
    for child in graph.get_children(id)? {
        println!("  {}", child);
    }

    let groups = graph.get_inferred_relationships(id)?;
    if !groups.is_empty() {
        println!("Inferred relationships:");
        for group in groups {
            println!("{}", group);
        }
    }
    Ok(())
}

fn print_set(set: &ConceptSet) {
    println!("{} concept(s)", set.len());
    for concept in set {
        println!("  {}", concept);
    }
}
