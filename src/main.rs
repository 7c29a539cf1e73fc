//! Gordian - Candidate-key discovery from the command line
//!
//! Loads a CSV, TSV or JSON dataset and reports the minimal unique and
//! maximal non-unique column combinations.

use anyhow::{anyhow, Context, Result};
use argh::FromArgs;
use tracing_subscriber::EnvFilter;

use gordian::format::{self, InputFormat, LoadOptions};
use gordian::report::Report;
use gordian::{Dataset, KeySearch, Strategy};

/// Gordian - find candidate keys in tabular data
#[derive(FromArgs)]
struct Args {
    /// path to the CSV, TSV or JSON file to analyze ("-" reads stdin)
    #[argh(positional)]
    file: String,

    /// input format: csv, tsv or json (default: from file extension)
    #[argh(option)]
    format: Option<String>,

    /// member holding the record array in a JSON object document
    #[argh(option, default = "String::from(\"dataset\")")]
    dataset_key: String,

    /// classification strategy: gordian, hca or hca-gordian
    #[argh(option, default = "Strategy::Gordian")]
    strategy: Strategy,

    /// widest column combination to evaluate
    #[argh(option)]
    max_arity: Option<usize>,

    /// evaluate combinations on a single thread
    #[argh(switch)]
    sequential: bool,

    /// print the report as JSON
    #[argh(switch)]
    json: bool,

    /// also list every unique and non-unique combination
    #[argh(switch, short = 'a')]
    all: bool,

    /// enable debug logging on stderr
    #[argh(switch, short = 'v')]
    verbose: bool,
}

fn main() -> Result<()> {
    let args: Args = argh::from_env();
    init_logging(args.verbose);

    let dataset = load_dataset(&args)?;
    eprintln!(
        "✓ Loaded {} rows x {} columns",
        dataset.row_count(),
        dataset.column_count()
    );

    let search = KeySearch::new(args.strategy)
        .with_parallel(!args.sequential)
        .with_max_arity(args.max_arity);
    let classification = search
        .run(&dataset)
        .with_context(|| format!("Key search failed for {}", args.file))?;

    let report = Report::new(&classification, args.all);
    if args.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.render_text());
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "warn,gordian=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Input problems are reported as such, never as an analysis result.
fn load_dataset(args: &Args) -> Result<Dataset> {
    let input_format = match args.format.as_deref() {
        Some(name) => Some(InputFormat::parse(name).ok_or_else(|| {
            anyhow!("Unknown input format: {} (expected csv, tsv or json)", name)
        })?),
        None => None,
    };
    let options = LoadOptions {
        dataset_key: args.dataset_key.clone(),
    };

    if args.file == "-" {
        eprintln!("📂 Reading from stdin...");
        let input_format = input_format.context("Reading from stdin requires --format")?;
        format::load_stdin(input_format, &options)
            .with_context(|| "Failed to read dataset from stdin")
    } else {
        eprintln!("📂 Opening {}...", args.file);
        format::load(&args.file, input_format, &options)
            .with_context(|| format!("Failed to load dataset: {}", args.file))
    }
}
