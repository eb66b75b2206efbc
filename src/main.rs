use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use cellrule::presets::{self, PRESETS};
use cellrule::store::{self, load_or_default, DirectoryStore, RuleStore};
use cellrule::{
    parse_document, EngineConfig, HeaderCell, History, HistoryEngine, RuleDocument, Tape,
    GENERATIONS,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cellrule", about = "Column-rule tape automata evaluator")]
struct Cli {
    /// Log every computed generation.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a rule document and print the full history grid.
    Run {
        /// Rule document (YAML). Omit to use --preset or --name.
        file: Option<PathBuf>,
        /// Built-in preset to run instead of a file.
        #[arg(long, conflicts_with_all = ["file", "name"])]
        preset: Option<String>,
        /// Stored document to run (falls back to the preset of the same name).
        #[arg(long, conflicts_with = "file")]
        name: Option<String>,
        /// Directory backing the rule store.
        #[arg(long, default_value = store::DEFAULT_DIR)]
        store: PathBuf,
        /// Generations computed after the initial row.
        #[arg(long, default_value_t = GENERATIONS)]
        generations: usize,
        /// Print a blake3 fingerprint of the history.
        #[arg(long)]
        fingerprint: bool,
    },
    /// Compute a single row.
    Step {
        /// Rule document (YAML).
        file: PathBuf,
        /// Row to step from (default: the document's initial tape).
        #[arg(long)]
        tape: Option<String>,
    },
    /// List built-in presets.
    Presets,
    /// Print the rule text stored under NAME, or the preset default.
    Show {
        /// Document name.
        name: String,
        /// Directory backing the rule store.
        #[arg(long, default_value = store::DEFAULT_DIR)]
        store: PathBuf,
    },
    /// Store the contents of FILE under NAME.
    Save {
        /// Document name.
        name: String,
        /// Rule text to store.
        file: PathBuf,
        /// Directory backing the rule store.
        #[arg(long, default_value = store::DEFAULT_DIR)]
        store: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            file,
            preset,
            name,
            store,
            generations,
            fingerprint,
        } => run_history(
            load_document(file, preset, name, store)?,
            EngineConfig::default()
                .with_generations(generations)
                .with_verbose(cli.verbose),
            fingerprint,
        )?,
        Commands::Step { file, tape } => run_step(file, tape)?,
        Commands::Presets => {
            for preset in PRESETS {
                println!("{}\t{}", preset.name, preset.description);
            }
        }
        Commands::Show { name, store } => {
            let text = load_or_default(&DirectoryStore::new(store), &name)?
                .ok_or_else(|| anyhow!("no rules stored under {}", name))?;
            print!("{}", text);
        }
        Commands::Save { name, file, store } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read rules from {}", file.display()))?;
            parse_document(&text)
                .with_context(|| format!("{} is not a valid rule document", file.display()))?;
            DirectoryStore::new(&store)
                .set(&name, &text)
                .with_context(|| format!("failed to store rules under {}", name))?;
            println!("stored {} in {}", name, store.display());
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_document(
    file: Option<PathBuf>,
    preset: Option<String>,
    name: Option<String>,
    store: PathBuf,
) -> Result<RuleDocument> {
    let text = match (file, preset, name) {
        (Some(path), _, _) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read rules from {}", path.display()))?,
        (None, Some(preset), _) => presets::find(&preset)
            .map(|p| p.rules.to_string())
            .ok_or_else(|| anyhow!("unknown preset {}", preset))?,
        (None, None, Some(name)) => load_or_default(&DirectoryStore::new(store), &name)?
            .ok_or_else(|| anyhow!("no rules stored under {}", name))?,
        (None, None, None) => bail!("provide a rule file, --preset or --name"),
    };

    parse_document(&text).context("failed to parse rule document")
}

fn run_history(doc: RuleDocument, config: EngineConfig, fingerprint: bool) -> Result<()> {
    let history = HistoryEngine::new(config).run(&doc)?;

    let width = cell_width(&history);
    print_header(&doc.header(), width);
    print_history(&history, width);
    if fingerprint {
        println!("fingerprint {}", history.fingerprint());
    }

    Ok(())
}

fn run_step(file: PathBuf, tape: Option<String>) -> Result<()> {
    let text = std::fs::read_to_string(&file)
        .with_context(|| format!("failed to read rules from {}", file.display()))?;
    let doc = parse_document(&text).context("failed to parse rule document")?;

    let tape = tape.map_or_else(|| doc.initial().clone(), |t| Tape::from(t.as_str()));
    let next = doc.step(&tape)?;
    println!("{}", tape);
    println!("{}", next);

    Ok(())
}

fn cell_width(history: &History) -> usize {
    history
        .iter()
        .flat_map(|row| row.cells())
        .map(|cell| cell.as_str().chars().count())
        .max()
        .unwrap_or(1)
        .max(1)
}

fn print_header(header: &[HeaderCell], width: usize) {
    let line: String = header
        .iter()
        .map(|cell| {
            let columns = cell.span * width;
            let name: String = cell.name.chars().take(columns).collect();
            format!("{:<columns$}", name, columns = columns)
        })
        .collect();
    println!("{}", line);
}

fn print_history(history: &History, width: usize) {
    for row in history {
        let line: String = row
            .cells()
            .iter()
            .map(|cell| format!("{:<width$}", cell.as_str(), width = width))
            .collect();
        println!("{}", line);
    }
}
