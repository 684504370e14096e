use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

use survey_lens::app::run_viewer;
use survey_lens::config::SurveySchema;
use survey_lens::data::loader::load_file;
use survey_lens::data::model::SurveyTable;
use survey_lens::data::writer::save_file;
use survey_lens::pipeline::outlook::DisclosureOutlook;
use survey_lens::pipeline::scorer::RecordScorer;
use survey_lens::pipeline::selector::{FeatureSelector, ImportantFieldSet};
use survey_lens::pipeline::stats::{DistributionAnalyzer, DistributionReport};
use survey_lens::pipeline::{self, cleaner::DatasetCleaner};
use survey_lens::report;
use survey_lens::state::AppState;

#[derive(Parser, Debug)]
#[command(
    name = "survey-lens",
    version,
    about = "Clean a mental-health survey export and rank candidate indicator fields"
)]
struct Cli {
    /// JSON schema overriding the built-in column rules
    #[arg(long, global = true)]
    schema: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize a raw survey file and save the cleaned table
    Clean { input: PathBuf, output: PathBuf },
    /// Print per-column statistics and the important fields of a cleaned file
    Analyze {
        input: PathBuf,
        /// Also write the statistics as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Score one record of a cleaned file against its important fields
    Score {
        input: PathBuf,
        #[arg(long, default_value_t = 123)]
        row: usize,
    },
    /// Print treatment / interference / coworker indicators of a cleaned file
    Outlook { input: PathBuf },
    /// Clean, save, analyze and score in one pass
    Run {
        input: PathBuf,
        #[arg(long, default_value = "result.csv")]
        output: PathBuf,
        #[arg(long, default_value_t = 123)]
        row: usize,
        #[arg(long)]
        json: Option<PathBuf>,
        /// Also print the disclosure outlook
        #[arg(long)]
        outlook: bool,
    },
    /// Open the chart viewer, optionally on a cleaned file
    View { input: Option<PathBuf> },
}

fn load_schema(path: Option<&Path>) -> Result<SurveySchema> {
    match path {
        Some(p) => SurveySchema::load(p),
        None => Ok(SurveySchema::default()),
    }
}

/// Load a cleaned file and run the statistics and selection stages on it.
fn analyze(
    schema: &SurveySchema,
    input: &Path,
) -> Result<(SurveyTable, DistributionReport, ImportantFieldSet)> {
    let table = load_file(input)?;
    let report = DistributionAnalyzer::new(&schema.analysis).analyze(&table);
    let important = FeatureSelector::new(&schema.analysis).select(&report);
    Ok((table, report, important))
}

fn print_analysis<W: Write>(
    out: &mut W,
    report: &DistributionReport,
    important: &ImportantFieldSet,
    json: Option<&Path>,
) -> Result<()> {
    report::write_distribution(out, report)?;
    report::write_important(out, important)?;
    if let Some(path) = json {
        let file = std::fs::File::create(path)?;
        report::write_json(std::io::BufWriter::new(file), report, important)?;
        log::info!("Wrote JSON report to {}", path.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let schema = load_schema(cli.schema.as_deref())?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Clean { input, output } => {
            let rules = schema.resolve()?;
            let cleaned = DatasetCleaner::new(&rules).clean(load_file(&input)?)?;
            save_file(&cleaned.indexed(), &output)?;
        }
        Command::Analyze { input, json } => {
            let (_, report, important) = analyze(&schema, &input)?;
            print_analysis(&mut out, &report, &important, json.as_deref())?;
        }
        Command::Score { input, row } => {
            let (table, _, important) = analyze(&schema, &input)?;
            if important.is_empty() {
                bail!("no important fields were selected; cannot score row {row}");
            }
            let score = RecordScorer::score(&table, row, &important)?;
            report::write_score(&mut out, &score)?;
        }
        Command::Outlook { input } => {
            let outlook = DisclosureOutlook::compute(&load_file(&input)?)?;
            report::write_outlook(&mut out, &outlook)?;
        }
        Command::Run {
            input,
            output,
            row,
            json,
            outlook,
        } => {
            let run = pipeline::run(&schema, load_file(&input)?)?;
            save_file(&run.indexed, &output)?;
            print_analysis(&mut out, &run.report, &run.important, json.as_deref())?;
            if run.important.is_empty() {
                log::warn!("No important fields were selected; skipping record score");
            } else if row < run.indexed.row_count() {
                let score = RecordScorer::score(&run.indexed, row, &run.important)?;
                report::write_score(&mut out, &score)?;
            } else {
                log::warn!(
                    "Row {row} is beyond the {} cleaned rows; skipping record score",
                    run.indexed.row_count()
                );
            }
            if outlook {
                let outlook = DisclosureOutlook::compute(&run.indexed)?;
                report::write_outlook(&mut out, &outlook)?;
            }
        }
        Command::View { input } => {
            drop(out);
            let mut state = AppState::new(schema);
            if let Some(path) = input {
                state.open(&path)?;
            }
            if let Err(e) = run_viewer(state) {
                bail!("viewer failed: {e}");
            }
        }
    }
    Ok(())
}
