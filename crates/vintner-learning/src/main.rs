//! CLI entry point for the wine-quality decision-tree analysis.

use anyhow::{Result, anyhow};
use clap::Parser;
use dotenv::dotenv;
use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use vintner_learning::{AnalysisOutcome, AnalysisPipeline, AnalysisReport, TrainingConfig};
use vintner_processing::charts::{
    bar_chart, box_table, class_distribution_chart, correlation_table, describe_table,
    histogram_line, info_table,
};
use vintner_processing::{DEFAULT_FALLBACK_URL, ExplorationConfig, LoaderConfig};

/// Environment variable that overrides the default fallback dataset URL.
const FALLBACK_URL_ENV: &str = "VINTNER_FALLBACK_URL";

const CHART_WIDTH: usize = 40;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Wine-quality decision-tree analysis",
    long_about = "Loads a wine-quality CSV, explores it, trains a decision tree on the \
                  'quality' label and reports how well it predicts held-out wines.\n\n\
                  When no input is given (or it cannot be read) the UCI red wine-quality \
                  dataset is downloaded instead.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  VINTNER_FALLBACK_URL    URL of the fallback dataset\n\n\
                  EXAMPLES:\n  \
                  # Analyze a local file\n  \
                  vintner -i winequality-red.csv\n\n  \
                  # Use the fallback dataset and save a JSON report\n  \
                  vintner -r -o results/\n\n  \
                  # Deeper tree, machine-readable output\n  \
                  vintner -i wine.csv --max-depth 8 --json | jq .evaluation.accuracy"
)]
struct Args {
    /// Path to the CSV file to analyze
    ///
    /// If omitted on an interactive terminal you are asked for one;
    /// an empty answer uses the fallback dataset.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// URL of the fallback dataset (overrides VINTNER_FALLBACK_URL)
    #[arg(long)]
    fallback_url: Option<String>,

    /// Field separator of the input file (sniffed when omitted)
    #[arg(long)]
    separator: Option<char>,

    /// Name of the label column
    #[arg(short, long, default_value = "quality")]
    target: String,

    /// Fraction of rows held out for evaluation
    #[arg(long, default_value = "0.25")]
    test_size: f64,

    /// Random seed for the train/test split
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Do not preserve label proportions in the split
    #[arg(long)]
    no_stratify: bool,

    /// Maximum depth of the decision tree (0 or "none" for no limit)
    #[arg(long, default_value = "5", value_parser = parse_max_depth)]
    max_depth: DepthLimit,

    /// Minimum samples a node needs before it may split
    #[arg(long, default_value = "20")]
    min_samples_split: usize,

    /// Minimum samples in each leaf
    #[arg(long, default_value = "10")]
    min_samples_leaf: usize,

    /// Number of tree levels shown in the text rendering
    #[arg(long, default_value = "3")]
    tree_depth: usize,

    /// Number of bins per histogram
    #[arg(long, default_value = "20")]
    bins: usize,

    /// Number of rows shown in the data preview
    #[arg(long, default_value = "5")]
    head_rows: usize,

    /// Output directory for reports and exported trees
    #[arg(short, long, default_value = "./outputs")]
    output: PathBuf,

    /// Write the full tree as a LaTeX/TikZ file to the output directory
    #[arg(long)]
    export_tree: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs; only outputs the final JSON report.
    #[arg(long)]
    json: bool,

    /// Write a detailed JSON report to the output directory
    ///
    /// The report will be saved as <input_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,
}

/// Depth cap for the tree; `None` grows it until the sample limits stop it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DepthLimit(Option<usize>);

fn parse_max_depth(s: &str) -> std::result::Result<DepthLimit, String> {
    if s.eq_ignore_ascii_case("none") {
        return Ok(DepthLimit(None));
    }
    match s.parse::<usize>() {
        Ok(0) => Ok(DepthLimit(None)),
        Ok(depth) => Ok(DepthLimit(Some(depth))),
        Err(_) => Err(format!("expected a depth or \"none\", got '{}'", s)),
    }
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    // Load environment variables from .env file
    dotenv().ok();

    let input = match args.input.clone() {
        Some(path) => Some(path),
        None if !args.json && std::io::stdin().is_terminal() => prompt_for_input()?,
        None => None,
    };

    let pipeline = build_pipeline(&args)?;

    info!("{}", "=".repeat(80));
    info!("Starting wine-quality analysis...");
    info!("{}", "=".repeat(80));

    let outcome = match pipeline.run(input.as_deref()) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Analysis failed: {}", e);
            return Err(anyhow!("Analysis failed: {}", e));
        }
    };

    handle_output(&outcome, input.as_deref(), &args)
}

/// Ask for a CSV path on the terminal. An empty answer means "no file".
fn prompt_for_input() -> Result<Option<PathBuf>> {
    print!("Path to a wine-quality CSV (leave empty to download the reference dataset): ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let answer = line.trim();
    Ok((!answer.is_empty()).then(|| PathBuf::from(answer)))
}

fn build_pipeline(args: &Args) -> Result<AnalysisPipeline> {
    let fallback_url = args
        .fallback_url
        .clone()
        .or_else(|| std::env::var(FALLBACK_URL_ENV).ok())
        .unwrap_or_else(|| DEFAULT_FALLBACK_URL.to_string());

    let mut loader = LoaderConfig::builder()
        .target_column(&args.target)
        .fallback_url(fallback_url);
    if let Some(sep) = args.separator {
        loader = loader.separator(sep);
    }

    let exploration = ExplorationConfig::builder()
        .head_rows(args.head_rows)
        .histogram_bins(args.bins)
        .build()?;

    let training = TrainingConfig::builder()
        .test_size(args.test_size)
        .random_seed(args.seed)
        .stratify(!args.no_stratify)
        .max_depth(args.max_depth.0)
        .min_samples_split(args.min_samples_split)
        .min_samples_leaf(args.min_samples_leaf)
        .tree_display_depth(args.tree_depth)
        .build()?;

    let mut builder = AnalysisPipeline::builder()
        .loader_config(loader.build()?)
        .exploration_config(exploration)
        .training_config(training);

    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }

    Ok(builder.build()?)
}

/// Handle analysis output based on CLI flags.
///
/// Output behavior:
/// - Default: Print human-readable summary to stdout
/// - `--json`: Print JSON to stdout only (no logs)
/// - `--emit-report`: Write JSON report to file
/// - `--export-tree`: Write the TikZ tree to file
fn handle_output(outcome: &AnalysisOutcome, input: Option<&Path>, args: &Args) -> Result<()> {
    let report = &outcome.report;
    let stem = report_stem(input, report.used_fallback);

    if args.export_tree {
        std::fs::create_dir_all(&args.output)?;
        let tree_path = args.output.join(format!("{}_tree.tex", stem));
        std::fs::write(&tree_path, outcome.model.export_tikz())?;
        info!("Tree written to: {}", tree_path.display());
    }

    if args.emit_report {
        let report_path = report.write_to_dir(&args.output, &stem)?;
        info!("Report written to: {}", report_path.display());
    }

    if args.json {
        println!("{}", report.to_json()?);
        return Ok(());
    }

    print_exploration(report);
    print_visualization(report);
    print_training(report);
    print_evaluation(report);
    print_interpretation(report);
    print_completion(report);

    Ok(())
}

/// File stem used for the report and tree files.
fn report_stem(input: Option<&Path>, used_fallback: bool) -> String {
    if used_fallback {
        return "winequality".to_string();
    }
    input
        .and_then(|p| p.file_stem())
        .and_then(|s| s.to_str())
        .unwrap_or("winequality")
        .to_string()
}

fn section(title: &str) {
    println!();
    println!("{}", "=".repeat(80));
    println!("{}", title);
    println!("{}", "=".repeat(80));
}

fn subsection(title: &str) {
    println!();
    println!("{}", title);
    println!("{}", "-".repeat(40));
}

fn print_exploration(report: &AnalysisReport) {
    let exploration = &report.exploration;

    section("DATA EXPLORATION");
    println!("Source: {}", report.source);
    if let Some(reason) = &report.primary_error {
        println!("  (fallback dataset used: {})", reason);
    }
    println!(
        "Shape:  {} rows x {} columns",
        exploration.shape.0, exploration.shape.1
    );

    subsection("First rows");
    println!("{}", exploration.head);

    subsection("Columns");
    print!("{}", info_table(&exploration.info));
    println!(
        "memory usage: {:.1} KB",
        exploration.info.estimated_size_bytes as f64 / 1024.0
    );

    subsection("Descriptive statistics");
    print!("{}", describe_table(&exploration.describe));

    subsection(&format!("Distribution of '{}'", report.target_column));
    for class in &exploration.class_distribution {
        println!("  {:>4}: {}", class.label, class.count);
    }
}

fn print_visualization(report: &AnalysisReport) {
    let exploration = &report.exploration;

    section("VISUALIZATION");

    subsection(&format!("'{}' counts", report.target_column));
    print!(
        "{}",
        class_distribution_chart(&exploration.class_distribution, CHART_WIDTH)
    );

    subsection("Histograms");
    for hist in &exploration.histograms {
        println!("{}", histogram_line(hist, 22));
    }

    subsection(&format!("Features by '{}'", report.target_column));
    for boxes in &exploration.box_summaries {
        println!("{}", boxes.feature);
        print!("{}", box_table(boxes));
        println!();
    }

    subsection("Correlation matrix");
    print!("{}", correlation_table(&exploration.correlation));

    subsection(&format!("Correlation with '{}'", report.target_column));
    let ranked = exploration.correlation.ranked_against(&report.target_column);
    print!("{}", bar_chart(&ranked, CHART_WIDTH));
}

fn print_training(report: &AnalysisReport) {
    let config = &report.training_config;

    section("TRAINING");
    println!(
        "Features ({}): {}",
        report.feature_names.len(),
        report.feature_names.join(", ")
    );
    if report.dropped_rows > 0 {
        println!("Rows dropped for nulls: {}", report.dropped_rows);
    }
    println!(
        "Split: {} train / {} test (test size {}, seed {}, {})",
        report.split.train_rows,
        report.split.test_rows,
        config.test_size,
        report.split.seed,
        if report.split.stratified { "stratified" } else { "not stratified" }
    );
    println!(
        "Tree: gini, max depth {}, min samples split {}, min samples leaf {}",
        config
            .max_depth
            .map_or_else(|| "none".to_string(), |d| d.to_string()),
        config.min_samples_split,
        config.min_samples_leaf
    );
    println!(
        "Fitted tree: depth {}, {} leaves",
        report.tree.depth, report.tree.leaves
    );
}

fn print_evaluation(report: &AnalysisReport) {
    let evaluation = &report.evaluation;

    section("EVALUATION");
    println!("Accuracy: {:.4}", evaluation.accuracy);

    subsection("Confusion matrix");
    print!("{}", evaluation.confusion_matrix);

    subsection("Classification report");
    if evaluation.report_degraded {
        println!("(class names did not match the test labels; showing raw labels)");
    }
    print!("{}", evaluation.classification_report);
}

fn print_interpretation(report: &AnalysisReport) {
    section("INTERPRETATION");

    subsection("Feature importances");
    let rows: Vec<(String, f64)> = report
        .feature_importances
        .iter()
        .map(|f| (f.feature.clone(), f.importance))
        .collect();
    print!("{}", bar_chart(&rows, CHART_WIDTH));

    subsection(&format!(
        "Decision tree (first {} levels)",
        report.training_config.tree_display_depth
    ));
    print!("{}", report.tree.rendered);
}

fn print_completion(report: &AnalysisReport) {
    if !report.warnings.is_empty() {
        subsection("Warnings");
        for warning in &report.warnings {
            println!("  - {}", warning);
        }
    }

    section("ANALYSIS COMPLETE");
    println!(
        "Test accuracy {:.4} on {} held-out wines",
        report.evaluation.accuracy, report.split.test_rows
    );
    if let Some(top) = report.top_features(1).first() {
        println!(
            "Most important feature: {} ({:.3})",
            top.feature, top.importance
        );
    }
    println!("{}", "=".repeat(80));
}
