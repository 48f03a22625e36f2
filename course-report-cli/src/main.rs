use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use course_report_common::{Config, CourseReportError};
use course_report_core::{
    build_completion_chart, build_completion_table, build_course_report, build_posts_report,
    build_views_report, export_json, export_views_csv, write_completion_chart,
    write_completion_table, write_posts_report, write_views_report, CourseSnapshot,
    ReportContext,
};
use std::path::{Path, PathBuf};
use tracing::metadata::LevelFilter;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
        .into()
    }
}

#[derive(Parser)]
#[command(name = "course-report", version, about = "Course learners behaviour report")]
struct Cli {
    #[arg(long, value_enum, default_value = "warn", global = true)]
    log_level: LogLevel,
    /// Config file, overrides $COURSE_REPORT_CONFIG and the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Activity completion per section and activity type
    Completion { snapshot: PathBuf },
    /// Completion counts as bar-chart series
    Chart { snapshot: PathBuf },
    /// How many students viewed each module a certain number of times
    Views { snapshot: PathBuf },
    /// Post actions per module
    Posts { snapshot: PathBuf },
    /// Write every report to a JSON document, or the views tables to CSV
    Export {
        snapshot: PathBuf,
        #[arg(long)]
        format: Option<String>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print shell completions
    Completions { shell: clap_complete::Shell },
    /// Write the effective configuration to the default config location
    InitConfig,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    Ok(match path {
        Some(p) => Config::load_from(p)?,
        None => Config::load().unwrap_or_default(),
    })
}

fn load_snapshot(path: &Path) -> anyhow::Result<CourseSnapshot> {
    if !path.exists() {
        anyhow::bail!("snapshot not found: {}", path.display());
    }
    let snapshot = CourseSnapshot::load(path)?;
    info!(course = snapshot.course.id, modules = snapshot.modules.len(), "loaded snapshot");
    Ok(snapshot)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr) // keep stdout for report output
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "course-report", &mut std::io::stdout());
            Ok(())
        }
        Commands::InitConfig => {
            let path = cli.config.unwrap_or_else(Config::resolved_path);
            config.save_to(&path)?;
            println!("Config written to {}", path.display());
            Ok(())
        }
        Commands::Completion { snapshot } => run_report(ReportKind::Completion, &snapshot, &config),
        Commands::Chart { snapshot } => run_report(ReportKind::Chart, &snapshot, &config),
        Commands::Views { snapshot } => run_report(ReportKind::Views, &snapshot, &config),
        Commands::Posts { snapshot } => run_report(ReportKind::Posts, &snapshot, &config),
        Commands::Export { snapshot, format, output } => run_export(&snapshot, format, output, &config),
    }
}

#[derive(Clone, Copy)]
enum ReportKind {
    Completion,
    Chart,
    Views,
    Posts,
}

const COMPLETION_DISABLED: &str = "Activity completion is not enabled for this course";

/// `None` when the course has completion tracking switched off; reports are refused then.
fn report_context<'a>(
    snapshot: &'a CourseSnapshot,
    config: &'a Config,
) -> anyhow::Result<Option<ReportContext<'a>>> {
    match ReportContext::new(snapshot, &config.report) {
        Ok(ctx) => Ok(Some(ctx)),
        Err(CourseReportError::CompletionDisabled(course)) => {
            info!(course, "completion disabled, report refused");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn run_report(kind: ReportKind, snapshot_path: &Path, config: &Config) -> anyhow::Result<()> {
    let snapshot = load_snapshot(snapshot_path)?;
    let Some(ctx) = report_context(&snapshot, config)? else {
        println!("{COMPLETION_DISABLED}");
        return Ok(());
    };
    let width = config.display.max_label_width;
    let mut out = std::io::stdout().lock();
    match kind {
        ReportKind::Completion => {
            write_completion_table(&mut out, &build_completion_table(&ctx), width)?
        }
        ReportKind::Chart => write_completion_chart(&mut out, &build_completion_chart(&ctx), width)?,
        ReportKind::Views => write_views_report(&mut out, &build_views_report(&ctx)?, width)?,
        ReportKind::Posts => write_posts_report(&mut out, &build_posts_report(&ctx), width)?,
    }
    Ok(())
}

fn run_export(
    snapshot_path: &Path,
    format: Option<String>,
    output: Option<PathBuf>,
    config: &Config,
) -> anyhow::Result<()> {
    let format = format.unwrap_or_else(|| config.export.format.clone());
    let default_name = match format.as_str() {
        "json" => "course_report.json",
        "csv" => "course_views.csv",
        _ => anyhow::bail!("Unknown format: {format} (use json or csv)"),
    };
    let snapshot = load_snapshot(snapshot_path)?;
    let Some(ctx) = report_context(&snapshot, config)? else {
        println!("{COMPLETION_DISABLED}");
        return Ok(());
    };
    let out_path = output.unwrap_or_else(|| Path::new(&config.export.output_dir).join(default_name));
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    if format == "json" {
        export_json(&out_path, &build_course_report(&snapshot, &config.report)?)?;
    } else {
        export_views_csv(&out_path, &build_views_report(&ctx)?)?;
    }
    println!("Exported to {}", out_path.display());
    Ok(())
}
