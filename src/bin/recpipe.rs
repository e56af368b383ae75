use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use rec_pipeline::{
    AssetName, AssetType, AssetValidator, CommandProcessor, DryRunProcessor, PipelineConfig,
    QueueSession, RenderRequest, SessionSummary, ShotId,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit code of `next` when nothing is left to render.
const EXIT_QUEUE_EMPTY: u8 = 1;
const EXIT_FATAL: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "recpipe", version)]
struct Cli {
    /// Pipeline config JSON. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the shot identifier embedded in a filename.
    Shot(ShotArgs),
    /// Print the next versioned filename for an asset.
    NextVersion(AssetArgs),
    /// Print the latest existing file of an asset.
    Latest(AssetArgs),
    /// Print the master model scene of an asset.
    Model(ModelArgs),
    /// Append scenes to the render queue.
    Enqueue(EnqueueArgs),
    /// Copy the queue file to its backup path.
    Backup,
    /// Pop the next existing scene and write its render args script.
    Next,
    /// Render every queued scene in turn.
    Drain(DrainArgs),
    /// List recorded failures.
    Failures,
}

#[derive(Parser, Debug)]
struct ShotArgs {
    /// Filename or path containing `<show>_<seq><###>`.
    filename: PathBuf,
}

#[derive(Parser, Debug)]
struct AssetArgs {
    /// Shot code (`abc010`) or any file of the shot.
    #[arg(long)]
    shot: String,

    /// Asset type.
    #[arg(long = "type", value_enum)]
    asset_type: AssetType,

    /// Asset name, e.g. `robotFace`.
    #[arg(long, value_enum)]
    name: Option<AssetName>,

    /// Directory holding existing versions.
    #[arg(long, default_value = ".")]
    dir: PathBuf,
}

#[derive(Parser, Debug)]
struct ModelArgs {
    /// Asset name, e.g. `mechanic`.
    #[arg(long, value_enum)]
    name: AssetName,

    /// Asset library. Defaults to `02_ASSETS` on the main shared drive.
    #[arg(long)]
    assets_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct EnqueueArgs {
    /// Maya scenes to append.
    #[arg(required = true)]
    scenes: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct DrainArgs {
    /// Log each render command instead of running it.
    #[arg(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let cfg = PipelineConfig::load(cli.config.as_deref())?;
    match cli.cmd {
        Command::Shot(args) => cmd_shot(&cfg, args),
        Command::NextVersion(args) => cmd_next_version(&cfg, args),
        Command::Latest(args) => cmd_latest(&cfg, args),
        Command::Model(args) => cmd_model(&cfg, args),
        Command::Enqueue(args) => cmd_enqueue(&cfg, args),
        Command::Backup => cmd_backup(&cfg),
        Command::Next => cmd_next(&cfg),
        Command::Drain(args) => cmd_drain(&cfg, args),
        Command::Failures => cmd_failures(&cfg),
    }
}

fn cmd_shot(cfg: &PipelineConfig, args: ShotArgs) -> anyhow::Result<ExitCode> {
    let shot = ShotId::from_path(&args.filename, &cfg.show)?;
    println!("{}", shot.full_name());
    Ok(ExitCode::SUCCESS)
}

fn parse_shot(cfg: &PipelineConfig, s: &str) -> anyhow::Result<ShotId> {
    if s.contains(&format!("{}_", cfg.show)) {
        return Ok(ShotId::from_path(Path::new(s), &cfg.show)?);
    }
    Ok(ShotId::new(&cfg.show, s)?)
}

fn asset_validator(cfg: &PipelineConfig, args: &AssetArgs) -> anyhow::Result<AssetValidator> {
    let shot = parse_shot(cfg, &args.shot)?;
    Ok(AssetValidator::for_asset(
        &shot,
        args.name,
        args.asset_type,
        &cfg.alembic_assets,
    ))
}

fn list_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("read dir '{}'", dir.display()))? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn cmd_next_version(cfg: &PipelineConfig, args: AssetArgs) -> anyhow::Result<ExitCode> {
    let validator = asset_validator(cfg, &args)?;
    let files = list_files(&args.dir)?;
    let name =
        rec_pipeline::next_versioned_filename(&validator, &files, cfg.version_indicator)?;
    println!("{name}");
    Ok(ExitCode::SUCCESS)
}

fn cmd_latest(cfg: &PipelineConfig, args: AssetArgs) -> anyhow::Result<ExitCode> {
    let validator = asset_validator(cfg, &args)?;
    let files = list_files(&args.dir)?;
    let latest = rec_pipeline::latest_version(&validator, &files).with_context(|| {
        format!(
            "no version of '{}' in '{}'",
            validator.base(),
            args.dir.display()
        )
    })?;
    println!("{}", latest.display());
    Ok(ExitCode::SUCCESS)
}

fn cmd_model(cfg: &PipelineConfig, args: ModelArgs) -> anyhow::Result<ExitCode> {
    let root = match args.assets_dir {
        Some(dir) => dir,
        None => rec_pipeline::find_assets_dir()?,
    };
    let path = rec_pipeline::find_model_path(args.name, &cfg.show, &root)?;
    println!("{}", path.display());
    Ok(ExitCode::SUCCESS)
}

fn cmd_enqueue(cfg: &PipelineConfig, args: EnqueueArgs) -> anyhow::Result<ExitCode> {
    for scene in &args.scenes {
        let scene = std::path::absolute(scene)
            .with_context(|| format!("resolve '{}'", scene.display()))?;
        rec_pipeline::enqueue(&cfg.queue.queue_file, &scene)?;
        eprintln!("queued {}", scene.display());
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_backup(cfg: &PipelineConfig) -> anyhow::Result<ExitCode> {
    let path = rec_pipeline::backup(&cfg.queue.queue_file, cfg.queue.backup_suffix)?;
    eprintln!("wrote {}", path.display());
    Ok(ExitCode::SUCCESS)
}

fn cmd_next(cfg: &PipelineConfig) -> anyhow::Result<ExitCode> {
    let mut session = QueueSession::open(&cfg.queue)?;
    let scene = match session.next_valid() {
        Ok(scene) => scene,
        Err(e) if e.is_queue_empty() => {
            eprintln!("queue is empty");
            return Ok(ExitCode::from(EXIT_QUEUE_EMPTY));
        }
        Err(e) => return Err(e.into()),
    };

    let project = rec_pipeline::project_dir(cfg)?;
    let request = RenderRequest::for_scene(&scene, &cfg.render, &project)?;
    request.write_args_file(&cfg.queue.args_file)?;
    eprintln!("wrote {}", cfg.queue.args_file.display());
    println!("{}", scene.display());
    Ok(ExitCode::SUCCESS)
}

fn cmd_drain(cfg: &PipelineConfig, args: DrainArgs) -> anyhow::Result<ExitCode> {
    let project = rec_pipeline::project_dir(cfg)?;
    let mut session = QueueSession::open(&cfg.queue)?;

    let summary = if args.dry_run {
        let mut processor = DryRunProcessor::new(cfg.render.clone(), project);
        let summary = session.drain(&mut processor)?;
        for line in processor.planned() {
            println!("{line}");
        }
        summary
    } else {
        let mut processor = CommandProcessor::new(cfg.render.clone(), project);
        session.drain(&mut processor)?
    };

    print_summary(&summary);
    Ok(ExitCode::SUCCESS)
}

fn print_summary(summary: &SessionSummary) {
    eprintln!(
        "completed {} / failed {} / missing {} / blank {}",
        summary.completed, summary.failed, summary.missing, summary.blank
    );
}

fn cmd_failures(cfg: &PipelineConfig) -> anyhow::Result<ExitCode> {
    let log = rec_pipeline::FailureLog::new(&cfg.queue.failure_log);
    for record in log.read_all()? {
        println!("{}\t{}", record.reason, record.item);
    }
    Ok(ExitCode::SUCCESS)
}
