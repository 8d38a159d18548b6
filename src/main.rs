use satkb::cli::{Cli, Commands, ConfigAction};
use satkb::config::Config;
use satkb::corpus::SubjectFilter;
use satkb::embedding::HttpEmbedder;
use satkb::error::{Result, SatkbError};
use satkb::keyword::KeywordIndex;
use satkb::retrieval::RetrievalEngine;
use satkb::store::ChromaStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Index => {
            cmd_index(cli.config)?;
        }
        Commands::Rebuild { yes } => {
            cmd_rebuild(cli.config, yes)?;
        }
        Commands::Search {
            query,
            subject,
            limit,
            keyword,
            json,
        } => {
            cmd_search(cli.config, &query, &subject, limit, keyword, json)?;
        }
        Commands::Context {
            query,
            subject,
            max_length,
        } => {
            cmd_context(cli.config, &query, &subject, max_length)?;
        }
        Commands::Topics { subject } => {
            cmd_topics(cli.config, &subject)?;
        }
        Commands::Stats => {
            cmd_stats(cli.config)?;
        }
        Commands::Config { action } => {
            cmd_config(cli.config, action)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "satkb=debug" } else { "satkb=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt().with_env_filter(filter).with_target(false).init();
}

/// Construct the retrieval engine from explicitly injected provider and
/// store handles; no ambient global state.
fn build_engine(config: &Config) -> Result<RetrievalEngine> {
    let embedder = Arc::new(HttpEmbedder::from_config(&config.embedding)?);
    let store = Arc::new(ChromaStore::from_config(&config.store)?);

    Ok(RetrievalEngine::new(
        embedder,
        store,
        config.knowledge.root.clone(),
        config.store.collection.clone(),
        config.retrieval.context_results,
    ))
}

fn cmd_index(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    let engine = build_engine(&config)?;

    match engine.ensure_index()? {
        Some(count) => println!("✓ Index built: {} documents", count),
        None => println!(
            "✓ Collection '{}' already exists, nothing to do (use 'rebuild' to regenerate)",
            config.store.collection
        ),
    }

    Ok(())
}

fn cmd_rebuild(config_path: Option<PathBuf>, yes: bool) -> Result<()> {
    let config = load_config(config_path)?;

    if !yes && !confirm("This will delete and recreate all embeddings. Continue?")? {
        println!("Operation cancelled");
        return Ok(());
    }

    let engine = build_engine(&config)?;
    let start = std::time::Instant::now();
    let count = engine.rebuild_index()?;

    println!(
        "✓ Rebuild completed in {:.2}s: {} documents",
        start.elapsed().as_secs_f64(),
        count
    );

    Ok(())
}

fn cmd_search(
    config_path: Option<PathBuf>,
    query: &str,
    subject: &str,
    limit: Option<usize>,
    keyword: bool,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let filter: SubjectFilter = subject.parse()?;
    let limit = limit.unwrap_or(config.retrieval.max_results);

    if keyword {
        let index = KeywordIndex::build(&config.knowledge.root)?;
        let hits = index.search(query, filter, limit);

        if json {
            println!("{}", to_json(&hits)?);
        } else if hits.is_empty() {
            println!("No results found");
        } else {
            println!("Found {} results:", hits.len());
            for (i, hit) in hits.iter().enumerate() {
                println!(
                    "  {}. {} ({}) - Score: {:.3}",
                    i + 1,
                    hit.title,
                    hit.subject,
                    hit.relevance_score
                );
            }
        }
        return Ok(());
    }

    let engine = build_engine(&config)?;
    let results = engine.search(query, filter, limit)?;

    if json {
        println!("{}", to_json(&results)?);
    } else if results.is_empty() {
        println!("No results found");
    } else {
        println!("Found {} results:", results.len());
        for (i, result) in results.iter().enumerate() {
            println!(
                "  {}. {} ({}) - Score: {:.3}",
                i + 1,
                result.title(),
                result.subject(),
                result.similarity_score
            );
        }
    }

    Ok(())
}

fn cmd_context(
    config_path: Option<PathBuf>,
    query: &str,
    subject: &str,
    max_length: Option<usize>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let filter: SubjectFilter = subject.parse()?;
    let max_length = max_length.unwrap_or(config.retrieval.max_context_length);

    let engine = build_engine(&config)?;
    let context = engine.relevant_context(query, filter, max_length)?;

    println!("{}", context);
    Ok(())
}

fn cmd_topics(config_path: Option<PathBuf>, subject: &str) -> Result<()> {
    let config = load_config(config_path)?;
    let filter: SubjectFilter = subject.parse()?;

    let index = KeywordIndex::build(&config.knowledge.root)?;
    for (subject, topics) in index.topics(filter) {
        println!("{}:", subject.display_name());
        if topics.is_empty() {
            println!("  (no topics)");
        }
        for topic in topics {
            println!("  - {}", topic);
        }
    }

    Ok(())
}

fn cmd_stats(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    let engine = build_engine(&config)?;
    let stats = engine.stats()?;

    println!("Knowledge Base Status");
    println!("=====================");
    println!("Collection:      {}", stats.collection_name);
    println!("Embedding model: {}", stats.embedding_model);
    println!("Indexed:         {} documents", stats.total_documents);

    let file_count = count_markdown_files(&config.knowledge.root);
    println!("On disk:         {} markdown files", file_count);
    if stats.total_documents < file_count {
        println!(
            "⚠ {} files are not indexed (empty files are skipped; run 'rebuild' after edits)",
            file_count - stats.total_documents
        );
    }

    Ok(())
}

fn cmd_config(config_path: Option<PathBuf>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path)?;
            let json = serde_json::to_string_pretty(&config).map_err(|e| SatkbError::Json {
                source: e,
                context: "Failed to serialize config".to_string(),
            })?;
            println!("{}", json);
        }
        ConfigAction::Validate { file } => {
            let path = match file {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = Config::load(&path)?;
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);
        }
        ConfigAction::Init { force } => {
            let path = Config::default_path()?;

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| SatkbError::Io {
                    source: e,
                    context: format!("Failed to create config directory: {:?}", parent),
                })?;
            }

            let config = Config::default();
            config.save(&path)?;

            println!("✓ Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn load_config(config_path: Option<PathBuf>) -> Result<Config> {
    let path = match config_path {
        Some(path) => path,
        None => Config::default_path()?,
    };

    if !path.exists() {
        tracing::warn!(
            "Config file not found, using defaults. Run 'satkb config init' to create one."
        );
        let mut config = Config::default();
        config.apply_env_overrides();
        return Ok(config);
    }

    Config::load(&path)
}

fn confirm(prompt: &str) -> Result<bool> {
    use std::io::{BufRead, Write};

    print!("⚠ {} [y/N] ", prompt);
    std::io::stdout().flush().map_err(|e| SatkbError::Io {
        source: e,
        context: "Failed to flush stdout".to_string(),
    })?;

    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(|e| SatkbError::Io {
            source: e,
            context: "Failed to read confirmation".to_string(),
        })?;

    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

fn count_markdown_files(root: &Path) -> usize {
    fn walk(dir: &Path, count: &mut usize) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };
        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.is_dir() {
                walk(&path, count);
            } else if path.extension().is_some_and(|ext| ext == "md") {
                *count += 1;
            }
        }
    }

    let mut count = 0;
    walk(root, &mut count);
    count
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| SatkbError::Json {
        source: e,
        context: "Failed to serialize results".to_string(),
    })
}
