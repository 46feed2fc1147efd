use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

use ell_adapter::ai::HttpBackend;
use ell_adapter::analysis::{ComplexityAnalyzer, ContentAnalyzer};
use ell_adapter::models::WorksheetLength;
use ell_adapter::{
    init_tracing, AdaptationEngine, AdaptationParams, AdaptationProgress, BackendConfig, EngineConfig,
    OutputValidator, ValidationOptions,
};

type CliResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "ell-adapter", version, about = "Adapt instructional material for English language learners")]
struct Cli {
    /// JSON engine config; ELL_ADAPTER_* variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze content structure and complexity without generating anything
    Analyze {
        /// Material to analyze
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        grade: Option<String>,
    },
    /// Run a full adaptation against the configured backend
    Adapt(AdaptArgs),
    /// Validate an already adapted worksheet
    Validate {
        #[arg(long)]
        worksheet: PathBuf,
        #[arg(long)]
        guide: Option<PathBuf>,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        level: String,
    },
}

#[derive(Args)]
struct AdaptArgs {
    /// Material to adapt
    #[arg(long)]
    input: PathBuf,
    #[arg(long)]
    subject: String,
    /// Proficiency level, e.g. "Level 3" or "developing"
    #[arg(long)]
    level: String,
    #[arg(long)]
    grade: Option<String>,
    #[arg(long, default_value = "worksheet")]
    material_type: String,
    #[arg(long)]
    objectives: Option<String>,
    /// Add bilingual supports in this language
    #[arg(long)]
    native_language: Option<String>,
    #[arg(long)]
    translate_summary: bool,
    #[arg(long)]
    translate_instructions: bool,
    #[arg(long)]
    list_cognates: bool,
    /// short, medium or long
    #[arg(long = "length")]
    worksheet_length: Option<String>,
    #[arg(long)]
    checklist: bool,
    #[arg(long)]
    multiple_choice: bool,
}

impl AdaptArgs {
    fn into_params(self) -> CliResult<AdaptationParams> {
        let content = read(&self.input)?;
        let worksheet_length = match self.worksheet_length.as_deref() {
            Some(raw) => raw.parse::<WorksheetLength>()?,
            None => WorksheetLength::default(),
        };

        Ok(AdaptationParams {
            material_type: self.material_type,
            grade_level: self.grade,
            learning_objectives: self.objectives,
            include_bilingual_support: self.native_language.is_some(),
            native_language: self.native_language,
            translate_summary: self.translate_summary,
            translate_instructions: self.translate_instructions,
            list_cognates: self.list_cognates,
            worksheet_length,
            add_student_checklist: self.checklist,
            use_multiple_choice: self.multiple_choice,
            ..AdaptationParams::new(content, self.subject, self.level)
        })
    }
}

fn read(path: &Path) -> CliResult<String> {
    std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e).into())
}

fn load_config(path: Option<&Path>) -> CliResult<EngineConfig> {
    let mut config = match path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let _ = dotenvy::dotenv();
    config.apply_env()?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> CliResult<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}

async fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Command::Analyze { input, subject, grade } => {
            let content = read(&input)?;
            let content_analyzer = ContentAnalyzer::new();
            let complexity_analyzer = ComplexityAnalyzer::new();
            let (analysis, complexity) = tokio::join!(
                content_analyzer.analyze(&content),
                complexity_analyzer.analyze(&content, subject.as_deref(), grade.as_deref()),
            );
            print_json(
                &serde_json::json!({ "content": analysis, "complexity": complexity }),
                cli.pretty,
            )
        }
        Command::Adapt(args) => {
            let config = load_config(cli.config.as_deref())?;
            let params = args.into_params()?;
            let backend = HttpBackend::new(BackendConfig::from_env());
            let engine = AdaptationEngine::new(config, Arc::new(backend))?;

            let on_progress = |update: AdaptationProgress| {
                info!(phase = update.phase.as_str(), "{}", update.message);
            };
            let result = engine.adapt_material(&params, Some(&on_progress)).await?;
            let limits = engine.rate_limit_status().await;
            info!(
                requests_remaining = limits.requests_remaining,
                tokens_remaining = limits.tokens_remaining,
                "Rate limit window after adaptation"
            );
            print_json(&result, cli.pretty)
        }
        Command::Validate {
            worksheet,
            guide,
            subject,
            level,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let worksheet = read(&worksheet)?;
            let guide = match guide {
                Some(path) => read(&path)?,
                None => String::new(),
            };
            let validator = OutputValidator::new(ValidationOptions {
                check_quality: config.enable_quality_check,
                quality_threshold: config.quality_threshold,
                ..Default::default()
            });
            let params = AdaptationParams::new(worksheet.clone(), subject, level);
            let report = validator.validate(&worksheet, &guide, &params).await;
            print_json(&report, cli.pretty)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
