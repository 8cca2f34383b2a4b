use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use gitscape::config::{Args, Config};
use gitscape::layout::{Focus, InterpolationPlan, Layout, LayoutSnapshot, ViewPlanner, ViewState};
use gitscape::logging;
use gitscape::model::BranchHistory;
use gitscape::source::{Snapshot, load_repository};
use log::{info, warn};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};

include!(concat!(env!("OUT_DIR"), "/git_sha.rs"));

#[derive(Serialize)]
struct Output {
    layout: LayoutSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    view: Option<ViewState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    interpolation: Option<InterpolationPlan>,
}

/// Histories from the snapshot file or repository, plus any default branch
/// the source itself reports
async fn load_histories(args: &Args, config: &Config) -> Result<(Vec<BranchHistory>, Option<String>)> {
    if let Some(input) = &args.input {
        let snapshot = Snapshot::load(input)?;
        let default_branch = snapshot.default_branch.clone();
        return Ok((snapshot.into_histories(), default_branch));
    }

    let repo_path = match &args.repo {
        Some(path) => path.clone(),
        None => std::env::current_dir()?,
    };
    info!("Reading branches from repository: {repo_path:?}");
    let loaded = load_repository(repo_path, config.get_commit_history_limit()).await?;
    Ok((loaded.histories, loaded.default_branch))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.version {
        println!("gitscape version {} (git: {GIT_SHA})", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = Config::load()?;
    let mut final_config = config.merge_with_args(&args);

    let log_file = logging::init_logging(final_config.debug.unwrap_or(false))?;
    color_eyre::install()?;
    log::debug!("Writing logs to {log_file:?}");

    let (histories, detected_default) = load_histories(&args, &final_config).await?;
    if args.default_branch.is_none() && detected_default.is_some() {
        final_config.default_branch = detected_default;
    }

    let focus = args.focus.clone().unwrap_or(Focus::All);
    let options = final_config.layout_options(focus.clone());
    let layout = Layout::compute(&histories, &options).wrap_err("Failed to compute layout")?;

    if let Focus::Branch(name) = &focus {
        if layout.branch(name).is_none() {
            warn!("Focus branch {name} is not in the input, framing all branches");
        }
    }

    let view = final_config.view.map(|mode| {
        ViewPlanner::new(&layout, final_config.camera_config().get_min_distance()).plan(mode, &focus)
    });

    let interpolation = view.as_ref().map(|_| final_config.interpolation_plan());
    let output = Output {
        layout: layout.snapshot(),
        view,
        interpolation,
    };
    let json = if final_config.pretty.unwrap_or(false) {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };

    match &args.output {
        Some(path) => {
            fs::write(path, json).wrap_err_with(|| format!("Failed to write {}", path.display()))?;
            info!("Layout written to {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }

    Ok(())
}
