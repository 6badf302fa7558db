use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use editorial_segmenter::config::{LlmSettings, SegmenterConfig, APP_VERSION};
use editorial_segmenter::models::ProblemKey;
use editorial_segmenter::pipeline::editorial::{EditorialParser, FileArticleSource};
use editorial_segmenter::pipeline::segmentation::{normalize_problem_id, EditorialSegmenter};

/// Segment a contest editorial into per-problem analyses and print them as JSON.
#[derive(Debug, Parser)]
#[command(name = "editorial-segmenter", version)]
struct Cli {
    /// Contest the editorial is requested for
    contest_id: String,

    /// Files holding the extracted editorial article text
    #[arg(required = true, value_name = "FILE")]
    articles: Vec<String>,

    /// Expected problems, e.g. `1900/A,1901/A`
    #[arg(long, value_delimiter = ',', value_name = "CONTEST/PROBLEM", value_parser = parse_problem_key)]
    expect: Vec<ProblemKey>,

    /// Model identifier (overrides OPENROUTER_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Drop analyses attributed to other contests
    #[arg(long, default_value_t = false)]
    own_only: bool,
}

fn parse_problem_key(raw: &str) -> Result<ProblemKey, String> {
    let (contest, problem) = raw
        .trim()
        .split_once('/')
        .ok_or_else(|| format!("expected CONTEST/PROBLEM, got {raw:?}"))?;
    let contest = contest.trim();
    if contest.is_empty() {
        return Err(format!("missing contest id in {raw:?}"));
    }
    let problem =
        normalize_problem_id(problem).ok_or_else(|| format!("invalid problem id in {raw:?}"))?;
    Ok(ProblemKey::new(contest, problem))
}

fn main() -> ExitCode {
    editorial_segmenter::init_tracing();
    let cli = Cli::parse();
    tracing::debug!("editorial-segmenter v{}", APP_VERSION);

    let mut settings = LlmSettings::from_env();
    if let Some(model) = cli.model {
        settings.model = model;
    }

    let segmenter = EditorialSegmenter::from_settings(&settings, SegmenterConfig::from_env());
    let parser = EditorialParser::new(Box::new(FileArticleSource::new()), Arc::new(segmenter));
    let expected = (!cli.expect.is_empty()).then_some(cli.expect);

    let mut editorial = match parser.parse_editorial_content(&cli.contest_id, &cli.articles, expected) {
        Ok(editorial) => editorial,
        Err(e) => {
            tracing::error!(contest_id = %e.contest_id(), error = %e, "Editorial parsing failed");
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.own_only {
        editorial.editorials.retain(|e| e.contest.is(&cli.contest_id));
    }

    match serde_json::to_string_pretty(&editorial) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize output: {e}");
            ExitCode::FAILURE
        }
    }
}
