use std::fs::{self, File};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rat::core::config;
use rat::tui::{self, RootPage};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

const HELP_TEXT: &str = "\
rat: a scriptable terminal pager

  j / down      scroll down
  k / up        scroll up
  space / pgdn  page down
  pgup          page up
  g g           top
  G             bottom
  q             close pager
  C-c           quit

Scripts (*.rhai) and config.toml are read from the config directory.";

#[derive(Parser)]
#[command(name = "rat", about = "Scriptable terminal pager")]
struct Args {
    /// Configuration directory (default: $RAT_CONFIG_DIR or <config dir>/rat)
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Log file
    #[arg(long, default_value = "rat.log")]
    log_file: PathBuf,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    /// File to open in the root pager
    file: Option<PathBuf>,
}

fn root_page(file: Option<&PathBuf>) -> anyhow::Result<RootPage> {
    let Some(path) = file else {
        return Ok(RootPage {
            title: "rat".to_string(),
            text: HELP_TEXT.to_string(),
        });
    };
    let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(RootPage {
        title: path.display().to_string(),
        text,
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // The terminal belongs to the UI, so logs only ever go to a file.
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    let level = if args.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    if let Ok(log_file) = File::create(&args.log_file) {
        let _ = WriteLogger::init(level, log_config, log_file);
    }

    let config_dir = config::config_dir(args.config_dir.as_deref());
    let raw = config::load_config(&config_dir)
        .with_context(|| format!("invalid configuration in {}", config_dir.display()))?;
    let resolved = config::resolve(&raw, config_dir)?;
    log::info!(
        "rat starting: config dir {}, shell {}",
        resolved.config_dir.display(),
        resolved.shell
    );

    let root = root_page(args.file.as_ref())?;
    let result = tui::run(&resolved, root).await;
    if let Err(e) = &result {
        log::error!("{e:#}");
    }
    result
}
