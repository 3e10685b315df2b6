use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use debtags::{
    check, diff, grep_lines, search, show, OutputMode, PackageIndex, TagCollection, TagMatcher,
    TagPatch, Vocabulary,
};

#[derive(Debug, Parser)]
#[command(name = "debtags", about = "Query the Debian package tag database")]
struct Cli {
    /// System tag database.
    #[arg(long, env = "DEBTAGS_TAGDB", default_value = "/var/lib/debtags/package-tags")]
    tagdb: PathBuf,

    /// User tag database, compared against the system one by `diff`.
    #[arg(long, env = "DEBTAGS_USER_TAGDB", default_value = "debtags-user-tags")]
    user_tagdb: PathBuf,

    /// Tag vocabulary.
    #[arg(long, env = "DEBTAGS_VOCABULARY", default_value = "/var/lib/debtags/vocabulary")]
    vocabulary: PathBuf,

    /// Package index used by `search`.
    #[arg(long, env = "DEBTAGS_PACKAGES", default_value = "/var/lib/dpkg/status")]
    packages: PathBuf,

    /// Log progress to stderr.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the tag database.
    Cat {
        /// names, tags or facets.
        #[arg(long, default_value = "tags")]
        mode: OutputMode,
        /// Drop tags that are not in the vocabulary.
        #[arg(long)]
        known_only: bool,
    },
    /// Print the packages matching a tag expression.
    Grep {
        expression: String,
        /// Print the packages that do not match.
        #[arg(short = 'v', long)]
        invert_match: bool,
        /// names, tags or facets.
        #[arg(long, default_value = "tags")]
        mode: OutputMode,
        /// Only set the exit status.
        #[arg(short, long)]
        quiet: bool,
    },
    /// Print matching packages with their short description.
    Search {
        expression: String,
        #[arg(short = 'v', long)]
        invert_match: bool,
    },
    /// Print the tags of a package.
    Show { package: String },
    /// Report tags used by packages but missing from the vocabulary.
    Check {
        /// Tag database to check instead of the system one.
        file: Option<PathBuf>,
    },
    /// Print the changes from the system to the user tag database.
    Diff {
        /// User tag database to compare instead of `--user-tagdb`.
        file: Option<PathBuf>,
    },
    /// Print the vocabulary.
    Tagcat,
    /// Print the vocabulary record of a tag.
    Tagshow { tag: String },
    /// Print the tags whose name or description contains all the keywords.
    Tagsearch {
        #[arg(required = true)]
        keywords: Vec<String>,
    },
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("IO: cannot read {}", path.display()))
}

fn load_collection(path: &Path) -> Result<TagCollection> {
    TagCollection::parse(&read(path)?)
        .with_context(|| format!("Parse: tag database {}", path.display()))
}

fn load_vocabulary(path: &Path) -> Result<Vocabulary> {
    Vocabulary::parse(&read(path)?).with_context(|| format!("Parse: vocabulary {}", path.display()))
}

fn print_all(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

/// Run a command, returning whether it found anything.
fn run(cli: &Cli) -> Result<bool> {
    match &cli.command {
        Command::Cat { mode, known_only } => {
            let mut coll = load_collection(&cli.tagdb)?;
            if *known_only {
                coll = coll.filter_by_vocabulary(&load_vocabulary(&cli.vocabulary)?);
            }
            let lines: Vec<String> = coll.format_lines(*mode).collect();
            print_all(&lines);
            Ok(!lines.is_empty())
        }
        Command::Grep {
            expression,
            invert_match,
            mode,
            quiet,
        } => {
            let matcher = TagMatcher::with_inversion(expression, *invert_match)
                .context("Parse: tag expression")?;
            let coll = load_collection(&cli.tagdb)?;
            let lines = grep_lines(&coll, &matcher, *mode);
            if !*quiet {
                print_all(&lines);
            }
            Ok(!lines.is_empty())
        }
        Command::Search {
            expression,
            invert_match,
        } => {
            let matcher = TagMatcher::with_inversion(expression, *invert_match)
                .context("Parse: tag expression")?;
            let index = PackageIndex::parse(&read(&cli.packages)?)
                .with_context(|| format!("Parse: package index {}", cli.packages.display()))?;
            let lines = search(&index, &matcher);
            print_all(&lines);
            Ok(!lines.is_empty())
        }
        Command::Show { package } => {
            let coll = load_collection(&cli.tagdb)?;
            let tags = show(&coll, package)?;
            println!("{package}: {tags}");
            Ok(true)
        }
        Command::Check { file } => {
            let path = file.as_deref().unwrap_or(cli.tagdb.as_path());
            let coll = load_collection(path)?;
            let vocabulary = load_vocabulary(&cli.vocabulary)?;
            let report = check(&coll, &vocabulary);
            print!("{report}");
            Ok(report.is_ok())
        }
        Command::Diff { file } => {
            let system = load_collection(&cli.tagdb)?;
            let user = load_collection(file.as_deref().unwrap_or(cli.user_tagdb.as_path()))?;
            let patch = TagPatch::from_diff(diff(&system, &user));
            print!("{patch}");
            Ok(!patch.is_empty())
        }
        Command::Tagcat => {
            let vocabulary = load_vocabulary(&cli.vocabulary)?;
            for record in vocabulary.records() {
                println!("{record}");
            }
            Ok(!vocabulary.is_empty())
        }
        Command::Tagshow { tag } => {
            let vocabulary = load_vocabulary(&cli.vocabulary)?;
            print!("{}", vocabulary.tag(tag)?);
            Ok(true)
        }
        Command::Tagsearch { keywords } => {
            let vocabulary = load_vocabulary(&cli.vocabulary)?;
            let mut found = false;
            for record in vocabulary.records() {
                if !keywords.iter().all(|k| record.mentions(k)) {
                    continue;
                }
                if let Some(name) = record.name() {
                    println!("{name} - {}", record.short_description().unwrap_or_default());
                    found = true;
                }
            }
            Ok(found)
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let found = run(&cli)?;
    tracing::info!(found, "done");
    Ok(if found {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
