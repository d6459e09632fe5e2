//! CLI layer: argument parsing, command dispatch, and subcommand handlers.
//!
//! Wires `snomed-loader`'s import pipeline, `snomed-store`'s Index Layer,
//! `snomed-search`'s Search Indexer, and `snomed-engine`/`snomed-ecl`'s
//! query surface against a persisted [`crate::state::State`] directory.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use snomed_engine::semantic;
use snomed_store::index;
use snomed_types::{CancellationToken, SctId};

use crate::error::{ServiceError, ServiceResult};
use crate::state::State;

/// Wires import, precomputation and ad-hoc queries for a SNOMED CT release
/// loaded into the Component Store.
#[derive(Parser, Debug)]
#[command(name = "snomed-server", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Discover and import an RF2 release into a database directory.
    Import(ImportArgs),

    /// Rebuild the Index Layer and Search Indexer from an already-imported
    /// database, without re-reading RF2 files.
    Precompute(PrecomputeArgs),

    /// Run an ad-hoc query against an imported database.
    Query(QueryArgs),
}

#[derive(Parser, Debug)]
pub struct ImportArgs {
    /// Root directory of an unpacked RF2 release (e.g. the directory
    /// containing `Snapshot/Terminology`).
    #[arg(long)]
    pub data_dir: PathBuf,

    /// Database directory to create or update. Holds `sctdb.json`, `kv/`
    /// and `search/`.
    #[arg(long, default_value = "sctdb")]
    pub db: PathBuf,

    /// Number of consumer workers per component kind (0 = available
    /// parallelism).
    #[arg(long, default_value = "0")]
    pub workers: usize,
}

#[derive(Parser, Debug)]
pub struct PrecomputeArgs {
    /// Database directory to rebuild indices for.
    #[arg(long, default_value = "sctdb")]
    pub db: PathBuf,
}

#[derive(Parser, Debug)]
pub struct QueryArgs {
    /// Database directory to query.
    #[arg(long, default_value = "sctdb")]
    pub db: PathBuf,

    #[command(subcommand)]
    pub command: QueryCommand,
}

#[derive(Subcommand, Debug)]
pub enum QueryCommand {
    /// Looks up a concept and its denormalised "extended" view.
    Concept {
        id: String,
        /// Language tags for preferred-description selection, in priority
        /// order (comma-separated, e.g. "en-GB,en").
        #[arg(long, default_value = "en")]
        lang: String,
    },

    /// Transitive IS-A ancestors.
    Parents { id: String },

    /// Transitive IS-A descendants.
    Children {
        id: String,
        /// Aborts once this many concepts have been visited.
        #[arg(long, default_value = "100000")]
        max: usize,
    },

    /// Whether `child` is `ancestor` or a transitive descendant of it.
    IsA { child: String, ancestor: String },

    /// Every simple path from the concept to the root.
    Paths { id: String },

    /// The closest primitive ancestor.
    Primitive { id: String },

    /// Concepts sharing a direct parent with `id`.
    Siblings { id: String },

    /// Free-text search over descriptions, per spec.md §4.9.
    Search {
        text: String,
        /// Restrict to descendants of any of these concepts (comma-separated).
        #[arg(long)]
        is_a: Option<String>,
        #[arg(long, default_value = "false")]
        include_inactive: bool,
        #[arg(long, default_value = "50")]
        max_hits: usize,
    },

    /// Evaluates an ECL constraint against a CG expression's focus concepts.
    Ecl {
        /// A Compositional Grammar expression, e.g. a bare concept id.
        expression: String,
        /// The ECL constraint to test it against.
        constraint: String,
    },

    /// Renders a CG expression's long normal form.
    Normalise { expression: String },

    /// Scores `target_set` concepts by relevance to `id`, per spec.md §4.8.
    Genericise {
        id: String,
        /// Comma-separated target-set SCTIDs.
        targets: String,
        #[arg(long)]
        include_parents: bool,
    },
}

pub fn run() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Import(args) => cmd_import(args),
        Commands::Precompute(args) => cmd_precompute(args),
        Commands::Query(args) => cmd_query(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn parse_sctid(value: &str) -> ServiceResult<SctId> {
    value
        .parse::<SctId>()
        .map_err(|_| ServiceError::InvalidSctId(value.to_string()))
}

fn parse_sctid_list(value: &str) -> ServiceResult<Vec<SctId>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_sctid)
        .collect()
}

fn cmd_import(args: ImportArgs) -> ServiceResult<()> {
    tracing::info!(data_dir = %args.data_dir.display(), db = %args.db.display(), "discovering RF2 files");
    let files = snomed_loader::discover_rf2_files(&args.data_dir)?;

    let state = State::open_or_create(&args.db)?;

    let workers = if args.workers == 0 { None } else { Some(args.workers) };
    let config = snomed_loader::ImportConfig {
        workers,
        ..Default::default()
    };

    tracing::info!("importing release");
    let (report, _mrcm) = snomed_loader::import_release(&files, &config, &state.store, &state.search_index)?;

    println!(
        "imported {} concepts, {} descriptions, {} relationships ({} stated), \
         {} concrete relationships, {} refset members, {} OWL expressions",
        report.concepts,
        report.descriptions,
        report.relationships,
        report.stated_relationships,
        report.concrete_relationships,
        report.refset_members,
        report.owl_expressions,
    );
    Ok(())
}

fn cmd_precompute(args: PrecomputeArgs) -> ServiceResult<()> {
    let state = State::open(&args.db)?;
    tracing::info!("rebuilding index layer");
    index::rebuild_all(&state.store)?;
    tracing::info!("rebuilding search index");
    state.search_index.rebuild_index(&state.store)?;
    println!("precomputation complete");
    Ok(())
}

fn cmd_query(args: QueryArgs) -> ServiceResult<()> {
    let state = State::open(&args.db)?;
    match args.command {
        QueryCommand::Concept { id, lang } => {
            let id = parse_sctid(&id)?;
            let lang_tags: Vec<String> = lang.split(',').map(|s| s.trim().to_string()).collect();
            let extended = semantic::extended_concept(&state.store, id, &lang_tags)?;
            println!("{extended:#?}");
        }
        QueryCommand::Parents { id } => {
            let id = parse_sctid(&id)?;
            for parent in semantic::all_parents(&state.store, id)? {
                println!("{parent}");
            }
        }
        QueryCommand::Children { id, max } => {
            let id = parse_sctid(&id)?;
            let cancel = CancellationToken::new();
            for child in semantic::all_children(&state.store, id, max, &cancel)? {
                println!("{child}");
            }
        }
        QueryCommand::IsA { child, ancestor } => {
            let child = parse_sctid(&child)?;
            let ancestor = parse_sctid(&ancestor)?;
            println!("{}", semantic::is_a(&state.store, child, ancestor)?);
        }
        QueryCommand::Paths { id } => {
            let id = parse_sctid(&id)?;
            for path in semantic::paths_to_root(&state.store, id)? {
                let rendered: Vec<String> = path.iter().map(SctId::to_string).collect();
                println!("{}", rendered.join(" -> "));
            }
        }
        QueryCommand::Primitive { id } => {
            let id = parse_sctid(&id)?;
            println!("{}", semantic::primitive(&state.store, id)?);
        }
        QueryCommand::Siblings { id } => {
            let id = parse_sctid(&id)?;
            for sibling in semantic::siblings(&state.store, id)? {
                println!("{sibling}");
            }
        }
        QueryCommand::Search {
            text,
            is_a,
            include_inactive,
            max_hits,
        } => {
            let request = snomed_search::SearchRequest {
                s: text,
                is_a: is_a.map(|v| parse_sctid_list(&v)).transpose()?.unwrap_or_default(),
                include_inactive,
                maximum_hits: max_hits,
                ..Default::default()
            };
            let response = state.search_index.search(&request)?;
            for hit in response.hits {
                println!("{}\t{}\t{}", hit.concept_id, hit.description_id, hit.term);
            }
        }
        QueryCommand::Ecl { expression, constraint } => {
            let expr = snomed_cg::parse(&expression)?;
            println!("{}", snomed_ecl::apply(&state.store, &expr, &constraint)?);
        }
        QueryCommand::Normalise { expression } => {
            let expr = snomed_cg::parse(&expression)?;
            let normalised = snomed_engine::normalise::normalise(&state.store, &expr)?;
            println!("{}", snomed_cg::render_canonical::render(&normalised));
        }
        QueryCommand::Genericise {
            id,
            targets,
            include_parents,
        } => {
            let id = parse_sctid(&id)?;
            let target_set = parse_sctid_list(&targets)?;
            let scored = snomed_engine::genericise::genericise_to(&state.store, id, &target_set, include_parents)?;
            for entry in scored {
                println!("{}\t{:.4}", entry.concept_id, entry.score);
            }
        }
    }
    Ok(())
}
