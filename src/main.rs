use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};

use quire::browse::{browse, group_alphabetically, SortMode, TagQuery};
use quire::build::build_site;
use quire::config::Config;
use quire::document::Document;
use quire::index::{SiteIndex, TagFrequency};
use quire::logging::init_tracing;
use quire::parser::Parser as DocumentParser;
use quire::related::rank_related;
use quire::weight::intensity_bucket_for;

/// Builds and inspects a static blog.
#[derive(Parser)]
#[command(name = "quire", version)]
struct Cli {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log level or filter directive (e.g. `info`, `quire::write=trace`).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Project {
    /// The project directory, or any directory below it.
    #[arg(short, long, default_value = ".", env = "QUIRE_PROJECT")]
    project: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Builds the site.
    Build {
        #[command(flatten)]
        project: Project,

        /// Where to write the site.
        #[arg(short, long, default_value = "_site")]
        output: PathBuf,
    },

    /// Lists tags with their counts and weights.
    Tags {
        #[command(flatten)]
        project: Project,

        /// Only list tags containing this text (case-insensitive).
        #[arg(short, long, default_value = "")]
        search: String,

        /// `frequency` or `name`.
        #[arg(long, default_value = "frequency")]
        sort: SortMode,

        /// Group tags by their first letter.
        #[arg(short, long)]
        group: bool,
    },

    /// Lists the documents related to a document.
    Related {
        #[command(flatten)]
        project: Project,

        /// The document id, e.g. `notes/hello` for `content/blog/notes/hello.md`.
        id: String,

        /// The maximum number of documents to list. Defaults to the
        /// project's `related_limit`.
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_tracing(cli.verbose, cli.log_level.as_deref(), cli.log_json) {
        eprintln!("failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Build { project, output } => {
            let config = Config::from_directory(&project.project, &output)?;
            build_site(&config)?;
        }
        Command::Tags {
            project,
            search,
            sort,
            group,
        } => {
            let (_, documents) = load(&project.project)?;
            let index = SiteIndex::new(&documents);
            let tags = browse(&index.tags, &TagQuery { search, sort });
            if tags.is_empty() {
                println!("no matching tags");
            } else if group {
                for (letter, members) in group_alphabetically(&tags) {
                    println!("{}", letter);
                    print_tags(&index, &members, &tags);
                }
            } else {
                print_tags(&index, &tags, &tags);
            }
            let stats = index.tag_stats();
            println!(
                "{} tags, {} references",
                stats.total_tags, stats.total_references
            );
        }
        Command::Related { project, id, limit } => {
            let (config, documents) = load(&project.project)?;
            let target = documents
                .iter()
                .find(|d| d.id == id)
                .ok_or_else(|| anyhow!("no document with id `{}`", id))?;
            for d in rank_related(target, &documents, limit.unwrap_or(config.related_limit)) {
                println!("{}  {}  {}", d.published_at.format("%Y-%m-%d"), d.id, d.title);
            }
        }
    }
    Ok(())
}

/// Loads the project's configuration and documents. The output directory
/// is irrelevant to the commands that only inspect content.
fn load(project: &Path) -> Result<(Config, Vec<Document>)> {
    let config = Config::from_directory(project, Path::new("_site"))?;
    let documents = DocumentParser::new(&config.content_directory).parse_documents()?;
    Ok((config, documents))
}

/// Prints `tags`, bucketed relative to `visible` (every tag currently
/// listed, not just the group being printed).
fn print_tags(index: &SiteIndex, tags: &[TagFrequency], visible: &[TagFrequency]) {
    let counts: Vec<u32> = visible.iter().map(|t| t.count).collect();
    for t in tags {
        let label = index.tag_label(&t.tag);
        let bucket = intensity_bucket_for(t.count, &counts);
        if label == t.tag {
            println!("{:>5}  {:<8} {}", t.count, bucket, t.tag);
        } else {
            println!("{:>5}  {:<8} {} ({})", t.count, bucket, label, t.tag);
        }
    }
}
