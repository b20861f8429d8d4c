use crate::exit::Status;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use recode_core::audit::FileTypeProbe;
use recode_core::config::{self, AppConfig};
use recode_core::decision::{Confidence, SourceMode};
use recode_core::detector::ChardetDetector;
use recode_core::encoding::TextEncoding;
use recode_core::pipeline::{self, Command, ConvertOptions, RunOptions};
use recode_core::scanner::ScanOptions;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "txtencconvert")]
#[command(about = "Yet another file encoding converter.", long_about = None)]
pub struct Cli {
    /// Path to config TOML
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Display detected file encodings.
    #[command(visible_aliases = ["d", "disp"])]
    Display {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Convert file encodings.
    #[command(visible_aliases = ["c", "co"])]
    Convert {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        convert: ConvertArgs,
    },
}

#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Path (or filename) to process. Only files with .txt|.TXT extension are considered.
    pub path: PathBuf,
    /// Log file [default: <program name>.log]
    #[arg(long)]
    pub log: Option<PathBuf>,
    /// Glob of paths to leave out (repeatable)
    #[arg(long)]
    pub exclude: Vec<String>,
    /// Leave out dot-files and dot-directories
    #[arg(long, default_value_t = false)]
    pub skip_hidden: bool,
    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Original encoding. If not provided, it is detected.
    #[arg(short = 'f', long = "from-encoding", conflicts_with = "confidence")]
    pub from_encoding: Option<String>,
    /// Detection confidence threshold between 0 and 1; files below it are not converted [default: 0.8]
    #[arg(long, value_parser = parse_confidence)]
    pub confidence: Option<Confidence>,
    /// Target encoding [default: utf-8]
    #[arg(short = 't', long = "to-encoding")]
    pub to_encoding: Option<String>,
    /// Copy each original here before rewriting it
    #[arg(long)]
    pub backup_dir: Option<PathBuf>,
}

fn parse_confidence(s: &str) -> Result<Confidence, String> {
    s.parse::<Confidence>().map_err(|e| e.to_string())
}

/// `<program name>.log`, taken from argv[0].
pub fn default_log_path() -> PathBuf {
    let stem = std::env::args_os()
        .next()
        .map(PathBuf::from)
        .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "txtencconvert".to_string());
    PathBuf::from(format!("{}.log", stem))
}

/// Merges flags over config values into one run description. Returns it with the
/// `--json` flag.
pub fn resolve(command: &Commands, cfg: &AppConfig) -> Result<(RunOptions, bool)> {
    let common = match command {
        Commands::Display { common } | Commands::Convert { common, .. } => common,
    };
    let mut excludes = cfg.scan.exclude.clone();
    excludes.extend(common.exclude.iter().cloned());
    let scan = ScanOptions {
        extension: Some(cfg.scan.extension.trim_start_matches('.').to_string()),
        excludes,
        skip_hidden: common.skip_hidden || cfg.scan.skip_hidden,
    };

    let command = match command {
        Commands::Display { .. } => Command::Display,
        Commands::Convert { convert, .. } => {
            let source = match &convert.from_encoding {
                Some(label) => SourceMode::Explicit(
                    TextEncoding::for_label(label).context("--from-encoding")?,
                ),
                None => SourceMode::Detect {
                    threshold: match convert.confidence {
                        Some(c) => c,
                        None => Confidence::new(cfg.convert.confidence)
                            .context("convert.confidence in config")?,
                    },
                },
            };
            let target_label = convert
                .to_encoding
                .as_deref()
                .unwrap_or(cfg.convert.to_encoding.as_str());
            let target = TextEncoding::for_label(target_label).context("--to-encoding")?;
            let backup_dir = convert
                .backup_dir
                .clone()
                .or_else(|| cfg.convert.backup_dir.as_ref().map(PathBuf::from));
            Command::Convert(ConvertOptions {
                source,
                target,
                backup_dir,
            })
        }
    };

    Ok((
        RunOptions {
            root: common.path.clone(),
            scan,
            log_path: common.log.clone().unwrap_or_else(default_log_path),
            command,
        },
        common.json,
    ))
}

fn runtime_json(opts: &RunOptions) -> serde_json::Value {
    let command = match opts.command {
        Command::Display => "display",
        Command::Convert(_) => "convert",
    };
    let mut value = serde_json::json!({
        "command": command,
        "path": opts.root.display().to_string(),
        "log": opts.log_path.display().to_string(),
        "extension": opts.scan.extension,
        "exclude": opts.scan.excludes,
        "skip_hidden": opts.scan.skip_hidden,
    });
    if let Command::Convert(conv) = &opts.command {
        let (fromenc, confidence) = match conv.source {
            SourceMode::Explicit(enc) => (Some(enc.name()), None),
            SourceMode::Detect { threshold } => (None, Some(threshold.value())),
        };
        if let Some(obj) = value.as_object_mut() {
            obj.insert("fromenc".into(), serde_json::json!(fromenc));
            obj.insert("confidence".into(), serde_json::json!(confidence));
            obj.insert("toenc".into(), serde_json::json!(conv.target.name()));
            let backup_dir = conv.backup_dir.as_ref().map(|p| p.display().to_string());
            obj.insert("backup_dir".into(), serde_json::json!(backup_dir));
        }
    }
    value
}

/// Runs the command, writing operator output to `out`.
pub fn execute<W: Write>(cli: &Cli, out: &mut W) -> Result<Status> {
    let cfg = config::load(cli.config.as_deref()).context("loading config")?;
    let (opts, json) = resolve(&cli.command, &cfg)?;

    writeln!(out, "\nRuntime:")?;
    writeln!(out, "{}", serde_json::to_string_pretty(&runtime_json(&opts))?)?;
    writeln!(out)?;

    let probe = FileTypeProbe::new(cfg.audit.file_command.clone());
    let summary = pipeline::run(&opts, &ChardetDetector, &probe, out)
        .with_context(|| format!("processing {}", opts.root.display()))?;

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
    }
    Ok(Status::from_clean(summary.is_clean()))
}
