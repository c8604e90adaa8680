//! fillkit command-line entry point

mod repl;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use fill_core::{answers, AnswerSet, PlacementStore};
use tracing::warn;
use vision::{png_bytes, FieldAnalyzer, ModelClient};

/// Resolution used for the page image sent to the model; placement
/// coordinates come back in this pixel space.
const ANALYSIS_DPI: f32 = 150.0;

#[derive(Parser, Debug)]
#[command(
    name = "fillkit",
    version,
    about = "Coordinate-based PDF form filler with preview"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a form with the vision model and write text at the returned coordinates
    Fill(FillArgs),
    /// Reformat a JSON answer file as a string, a table, or CSV
    Format(FormatArgs),
}

#[derive(Args, Debug)]
#[command(group(clap::ArgGroup::new("data").required(true).multiple(false)))]
struct FillArgs {
    /// Path to the PDF form to fill
    pdf_file: PathBuf,

    /// Path to a JSON file containing form data
    #[arg(short, long, group = "data")]
    json: Option<PathBuf>,

    /// Form data as a comma-separated "Key: Value" string
    #[arg(short, long, group = "data")]
    string: Option<String>,

    /// Output PDF path (default: {input}_filled.pdf)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Preview image path (default: {input}_preview.png)
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Generate the preview only, skip the PDF write
    #[arg(long)]
    preview_only: bool,

    /// Hide numbered field labels in the preview
    #[arg(long)]
    no_labels: bool,

    /// Adjust placements interactively before writing
    #[arg(long)]
    interactive: bool,

    /// Show model confidence next to each placement
    #[arg(long)]
    show_confidence: bool,

    /// Model id to use for field analysis
    #[arg(long)]
    model: Option<String>,
}

#[derive(Args, Debug)]
struct FormatArgs {
    /// Path to the JSON file containing collected answers
    json_file: PathBuf,

    /// Print the answers as a single "Key: Value, ..." string
    #[arg(long)]
    string: bool,

    /// Write the answers to a CSV file
    #[arg(long, value_name = "OUTPUT_FILE")]
    csv: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // A whole-process interrupt aborts the run immediately with code 0
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\nOperation cancelled");
            std::process::exit(0);
        }
    });

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Fill(args) => run_fill(args).await,
        Commands::Format(args) => run_format(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run_fill(args: FillArgs) -> Result<()> {
    // The credential gate comes before any file I/O
    let mut client = ModelClient::from_env()?;
    if let Some(model) = &args.model {
        client = client.with_model(model.clone());
    }

    if !args.pdf_file.exists() {
        bail!("PDF file '{}' not found", args.pdf_file.display());
    }

    let answers = load_answers(&args)?;
    if answers.is_empty() {
        bail!("no usable form data supplied");
    }
    println!("Loaded {} data fields:", answers.len());
    for (key, value) in &answers {
        println!("  - {key}: {value}");
    }

    println!("Rendering page 1 at {ANALYSIS_DPI} dpi...");
    let page = pdf_core::raster::rasterize_page(&args.pdf_file, 1, ANALYSIS_DPI)
        .context("failed to rasterize PDF page")?;

    println!("Analyzing form fields with {}...", client.model());
    let summary = answers::summarize(&answers);
    let page_png = png_bytes(&page)?;
    // Any model failure degrades to zero fields, which is terminal below
    let candidates = match client.describe_fields(&page_png, &summary).await {
        Ok(candidates) => candidates,
        Err(e) => {
            warn!("field analysis failed: {e}");
            Vec::new()
        }
    };
    if candidates.is_empty() {
        bail!("no form fields detected; check the PDF and try again");
    }

    let mut store = PlacementStore::new();
    store.populate(page, args.pdf_file.clone(), candidates, &answers);
    print_placements(&store, args.show_confidence);

    let preview_path = args
        .preview
        .clone()
        .unwrap_or_else(|| derived_path(&args.pdf_file, "_preview.png"));

    if args.interactive {
        repl::run(&mut store, &preview_path, !args.no_labels)?;
    }

    store
        .save_preview(&preview_path, !args.no_labels)
        .context("failed to save preview")?;
    println!("Preview saved: {}", preview_path.display());

    if !args.preview_only {
        let output_path = args
            .output
            .clone()
            .unwrap_or_else(|| derived_path(&args.pdf_file, "_filled.pdf"));
        let written = store
            .commit(&output_path)
            .context("failed to write filled PDF")?;
        println!("Filled PDF saved: {}", written.display());
    }

    Ok(())
}

fn run_format(args: FormatArgs) -> Result<()> {
    let answers = answers::load_collected_answers(&args.json_file)
        .with_context(|| format!("failed to load '{}'", args.json_file.display()))?;

    if args.string {
        println!("{}", answers::format_as_string(&answers));
    } else if let Some(csv_path) = &args.csv {
        answers::write_csv(&answers, csv_path)?;
        println!("CSV file created: {}", csv_path.display());
    } else {
        for (key, value) in &answers {
            println!("{:30}: {}", answers::title_case(key), value);
        }
    }

    Ok(())
}

fn load_answers(args: &FillArgs) -> Result<AnswerSet> {
    if let Some(path) = &args.json {
        if !path.exists() {
            bail!("answers file '{}' not found", path.display());
        }
        println!("Loading data from {}", path.display());
        Ok(answers::load_answers_file(path)?)
    } else if let Some(data) = &args.string {
        println!("Parsing string data");
        Ok(answers::parse_answer_string(data))
    } else {
        // clap's argument group guarantees one of the two is present
        bail!("either --json or --string is required");
    }
}

fn print_placements(store: &PlacementStore, show_confidence: bool) {
    println!("Found {} field placements:", store.len());
    for (i, placement) in store.placements().iter().enumerate() {
        let confidence = if show_confidence {
            format!(" [confidence: {:.2}]", placement.confidence)
        } else {
            String::new()
        };
        println!(
            "  {:2}. {:20}: '{}' at ({:3}, {:3}){}",
            i + 1,
            placement.field_name,
            placement.text,
            placement.x,
            placement.y,
            confidence
        );
    }
}

/// Derive an output path from the input stem, e.g. `form.pdf` ->
/// `form_filled.pdf`
fn derived_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("form");
    input.with_file_name(format!("{stem}{suffix}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_derived_path() {
        assert_eq!(
            derived_path(Path::new("forms/w4.pdf"), "_filled.pdf"),
            PathBuf::from("forms/w4_filled.pdf")
        );
        assert_eq!(
            derived_path(Path::new("w4.pdf"), "_preview.png"),
            PathBuf::from("w4_preview.png")
        );
    }

    #[test]
    fn test_cli_parses_fill() {
        let cli = Cli::try_parse_from([
            "fillkit",
            "fill",
            "form.pdf",
            "-j",
            "answers.json",
            "--preview-only",
            "--show-confidence",
        ])
        .unwrap();
        let Commands::Fill(args) = cli.command else {
            panic!("expected fill subcommand");
        };
        assert_eq!(args.pdf_file, PathBuf::from("form.pdf"));
        assert_eq!(args.json, Some(PathBuf::from("answers.json")));
        assert!(args.preview_only);
        assert!(args.show_confidence);
        assert!(!args.interactive);
    }

    #[test]
    fn test_cli_requires_exactly_one_data_source() {
        assert!(Cli::try_parse_from(["fillkit", "fill", "form.pdf"]).is_err());
        assert!(Cli::try_parse_from([
            "fillkit",
            "fill",
            "form.pdf",
            "-j",
            "a.json",
            "-s",
            "Name: Jane"
        ])
        .is_err());
    }

    #[test]
    fn test_cli_parses_format() {
        let cli = Cli::try_parse_from(["fillkit", "format", "answers.json", "--string"]).unwrap();
        let Commands::Format(args) = cli.command else {
            panic!("expected format subcommand");
        };
        assert_eq!(args.json_file, PathBuf::from("answers.json"));
        assert!(args.string);
        assert!(args.csv.is_none());
    }
}
