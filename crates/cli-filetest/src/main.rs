use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use filetest::{config::FileTestConfig, scan, Decision, TaskRecord};
use log::{info, warn};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Decide whether media files need AC3/E-AC3 fallbacks built from TrueHD
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (JSON or TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Test individual files
    Check {
        /// Media files to test
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Print one JSON object per file
        #[arg(long)]
        json: bool,
    },
    /// Test every media file under the library roots
    Scan {
        /// Roots to scan instead of the configured ones
        roots: Vec<PathBuf>,

        /// Print one JSON object per file
        #[arg(long)]
        json: bool,
    },
    /// Read a host task record, test its file and print the updated record
    Hook {
        /// Read the record from this file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

/// One line of check/scan output
#[derive(Serialize)]
struct FileReport<'a> {
    path: &'a Path,
    #[serde(flatten)]
    decision: &'a Decision,
}

#[derive(Default)]
struct Tally {
    checked: usize,
    queued: usize,
    reported: usize,
}

impl Tally {
    fn add(&mut self, decision: &Decision) {
        self.checked += 1;
        if decision.eligible {
            self.queued += 1;
        }
        if !decision.issues.is_empty() {
            self.reported += 1;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins; --verbose only changes the default level
    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .init();

    let cfg = FileTestConfig::load_config(args.config.as_deref())
        .context("Failed to load configuration")?;

    match args.command {
        Command::Check { paths, json } => {
            let mut tally = Tally::default();
            for path in &paths {
                check_one(&cfg, path, json, &mut tally).await?;
            }
            print_summary(&tally, json);
        }
        Command::Scan { roots, json } => {
            let roots = if roots.is_empty() { cfg.library_roots.clone() } else { roots };
            info!("Scanning {} root(s): {:?}", roots.len(), roots);

            let candidates = scan::scan_roots(&cfg, &roots)
                .context("Failed to scan library")?;

            let mut tally = Tally::default();
            for path in &candidates {
                check_one(&cfg, path, json, &mut tally).await?;
            }
            print_summary(&tally, json);
        }
        Command::Hook { input } => {
            let raw = read_input(input.as_deref())?;
            let mut record: TaskRecord = serde_json::from_str(&raw)
                .context("Failed to parse task record JSON")?;

            let decision = filetest::run_task(&cfg, &mut record).await;
            info!("{}: {} ({})", record.path(), if decision.eligible { "queued" } else { "not queued" }, decision.verdict);

            let out = serde_json::to_string(&record)
                .context("Failed to serialize task record")?;
            println!("{}", out);
        }
    }

    Ok(())
}

async fn check_one(cfg: &FileTestConfig, path: &Path, json: bool, tally: &mut Tally) -> Result<()> {
    let decision = filetest::test_file(cfg, path).await;
    tally.add(&decision);

    if json {
        let line = serde_json::to_string(&FileReport { path, decision: &decision })
            .with_context(|| format!("Failed to serialize report for: {}", path.display()))?;
        println!("{}", line);
        return Ok(());
    }

    let status = if decision.eligible { "QUEUE" } else { "SKIP " };
    println!("{}  {}  ({})", status, path.display(), decision.verdict);
    for issue in &decision.issues {
        warn!("{}: {}", path.display(), issue.message);
        println!("       - [{}] {}", issue.id, issue.message);
    }
    Ok(())
}

fn print_summary(tally: &Tally, json: bool) {
    if json {
        return;
    }
    println!(
        "Checked {} file(s): {} queued, {} skipped, {} with issues",
        tally.checked,
        tally.queued,
        tally.checked - tally.queued,
        tally.reported
    );
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read task record: {}", path.display())),
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("Failed to read task record from stdin")?;
            Ok(raw)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetest::Verdict;

    #[test]
    fn test_args_parse_check() {
        let args = Args::try_parse_from(["jf-truehd-filetest", "-v", "check", "a.mkv", "b.mp4", "--json"]).unwrap();
        assert!(args.verbose);
        match args.command {
            Command::Check { paths, json } => {
                assert_eq!(paths, vec![PathBuf::from("a.mkv"), PathBuf::from("b.mp4")]);
                assert!(json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_check_requires_paths() {
        assert!(Args::try_parse_from(["jf-truehd-filetest", "check"]).is_err());
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let args = Args::try_parse_from(["jf-truehd-filetest", "hook", "--config", "cfg.toml"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("cfg.toml")));
        assert!(matches!(args.command, Command::Hook { input: None }));
    }

    #[test]
    fn test_tally_counts() {
        let mut tally = Tally::default();
        tally.add(&filetest::evaluate(&[filetest::StreamDescriptor::new("truehd", "eng", "")]));
        tally.add(&Decision::skip(Verdict::NoTrueHd));
        tally.add(&filetest::evaluate(&[]));
        assert_eq!((tally.checked, tally.queued, tally.reported), (3, 1, 1));
    }

    #[test]
    fn test_report_flattens_decision() {
        let decision = Decision::skip(Verdict::AlreadyCompatible);
        let value = serde_json::to_value(FileReport { path: Path::new("/m/a.mkv"), decision: &decision }).unwrap();
        assert_eq!(value["path"], "/m/a.mkv");
        assert_eq!(value["eligible"], false);
        assert_eq!(value["verdict"]["kind"], "already_compatible");
    }
}
