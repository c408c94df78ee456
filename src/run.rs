use crate::error::{CliError, Result, ResultExt};
use crate::ui;
use query_diff::{
    config::ensure_config_file_exists, run_query_diff, Config, LogObserver, PipelineReport,
};
use std::path::Path;
use tokio::runtime::Runtime;

#[derive(Debug, Clone)]
pub struct RunArgs {
    pub case_id: Option<String>,
    pub config_path: String,
    pub out_dir: String,
    pub init: bool,
    pub no_viewer: bool,
}

pub fn execute(args: RunArgs) -> Result<()> {
    if args.init {
        return init_config(&args.config_path);
    }

    let report = run_case(&args)?;
    print_summary(&report, &args);
    Ok(())
}

fn init_config(config_path: &str) -> Result<()> {
    ui::section_header("Kamoshika Configuration Setup");

    let created = ensure_config_file_exists(config_path, true)
        .with_context(|| format!("Failed to create {}", config_path))?;

    if created {
        ui::success_message(&format!("Created {}", config_path));
        ui::info_message(&format!(
            "Edit {} to configure your servers and requests",
            config_path
        ));
    } else {
        ui::warning_message(&format!("{} already exists, left untouched", config_path));
    }
    Ok(())
}

/// Load the config and run one case through the whole pipeline
pub fn run_case(args: &RunArgs) -> Result<PipelineReport> {
    let case_id = args
        .case_id
        .as_deref()
        .ok_or_else(|| CliError::Other("A case id is required".to_string()))?;

    let config = Config::load_with_validation(&args.config_path)?;

    // Create async runtime for HTTP operations
    let rt = Runtime::new().map_err(|e| {
        CliError::Other(format!("Failed to create async runtime: {}", e))
    })?;

    let report = rt.block_on(run_query_diff(
        &config,
        case_id,
        Path::new(&args.out_dir),
        !args.no_viewer,
        &LogObserver,
    ))?;
    Ok(report)
}

fn print_summary(report: &PipelineReport, args: &RunArgs) {
    ui::section_header(&format!("Case {}", report.case_id));

    ui::info_message(&format!("Saved {} responses to {}", report.saved.len(), args.out_dir));
    for saved in &report.saved {
        ui::file_entry(saved.index, &saved.server, &saved.path);
    }

    let normalized = report.processed.iter().filter(|file| file.normalized).count();
    if normalized > 0 {
        ui::info_message(&format!("Post processed {} files", normalized));
    }

    for failure in &report.failures {
        ui::warning_message(&format!(
            "File {} kept unprocessed ({}): {}",
            failure.index,
            failure.path.display(),
            failure.message
        ));
    }

    if let Some(message) = &report.diff_error {
        ui::warning_message(message);
    } else if report.diff_launched {
        ui::success_message("Diff viewer launched");
    }

    if report.is_degraded() {
        ui::warning_message("Completed with warnings");
    } else {
        ui::success_message("Done");
    }
}
