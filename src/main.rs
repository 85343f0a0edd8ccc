//! sift: feature reduction and outlier detection CLI
//!
//! Three subcommands share one load/transform/save flow: `reduce` (redundancy reduction),
//! `select` (feature subset selection) and `outliers` (IQR/Z-score row flagging).

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;

use sift::cli::{
    confirm_drop_features, confirm_step, Cli, Commands, DedupArgs, OutlierArgs, ReduceArgs,
    SelectArgs,
};
use sift::pipeline::{
    detect_outliers, load_dataset_with_progress, reduce_redundancy, remove_duplicate_rows,
    save_table, select_feature_subset, OutlierPolicy, ReductionPolicy, RemovedColumn,
    SubsetPolicy, Table,
};
use sift::report::{
    export_report, OutlierReport, OutlierSummary, ReductionKind, ReductionSummary,
    RemovalReport, ReportMetadata,
};
use sift::utils::{
    create_spinner, finish_with_success, finish_with_warning, print_banner, print_completion, print_config,
    print_count, print_info, print_step_header, print_step_time, print_success,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    print_banner(env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Commands::Reduce(args) => run_reduce(&cli, args),
        Commands::Select(args) => run_select(&cli, args),
        Commands::Outliers(args) => run_outliers(&cli, args),
        Commands::Dedup(args) => run_dedup(&cli, args),
    }
}

/// Install the tracing subscriber. RUST_LOG overrides `--log-level`.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the input and print dataset statistics
fn load_step(input: &Path, infer_schema_length: usize) -> Result<(Table, std::time::Duration)> {
    print_step_header(1, "Load Dataset");

    let step_start = Instant::now();
    let (df, rows, cols, memory_mb) = load_dataset_with_progress(input, infer_schema_length)?;
    let table = Table::new(df)?;
    print_success("Dataset loaded");

    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", rows);
    println!("      Columns: {}", cols);
    println!("      Numeric columns: {}", table.numeric_columns().len());
    println!("      Estimated memory: {:.2} MB", memory_mb);

    let elapsed = step_start.elapsed();
    print_step_time(elapsed);
    Ok((table, elapsed))
}

fn run_reduce(cli: &Cli, args: &ReduceArgs) -> Result<()> {
    let output_path = args.output_path();
    print_config(
        &args.input,
        Some(&output_path),
        &[
            ("Correlation threshold", format!("{:.2}", args.correlation_threshold)),
            ("Protected columns", describe_list(&args.protect)),
        ],
    );

    let (table, load_time) = load_step(&args.input, cli.infer_schema_length)?;
    let mut summary = ReductionSummary::new(table.width());
    summary.set_load_time(load_time);

    print_step_header(2, "Redundancy Reduction");
    let step_start = Instant::now();
    let policy = ReductionPolicy::new(args.protect.iter().cloned(), args.correlation_threshold)
        .with_logging(!args.no_trace);
    let spinner = create_spinner("Removing duplicate and correlated columns...");
    let outcome = reduce_redundancy(&table, &policy)?;
    finish_with_success(&spinner, "Redundancy reduction complete");

    print_removals(&outcome.reasons);
    if outcome.duplicate_rows_removed > 0 {
        print_count("duplicate row(s) removed", outcome.duplicate_rows_removed, None);
    }
    summary.set_removed(outcome.reasons.clone());
    summary.set_duplicate_rows_removed(outcome.duplicate_rows_removed);
    summary.set_reduction_time(step_start.elapsed());
    print_step_time(summary.reduction_time);

    if !confirm_removals(cli, &outcome.reasons, "redundancy")? {
        return Ok(());
    }

    summary.set_save_time(save_step(3, &outcome.table, &output_path)?);
    summary.display();

    if let Some(report_path) = &args.report {
        let report = RemovalReport::new(
            ReportMetadata::new(&args.input, &[output_path.as_path()]),
            ReductionKind::Redundancy,
            args.correlation_threshold,
            &args.protect,
            &summary,
        );
        export_report(&report, report_path)?;
        print_success(&format!("Report written to {}", report_path.display()));
    }

    print_completion("Redundancy reduction complete!");
    Ok(())
}

fn run_select(cli: &Cli, args: &SelectArgs) -> Result<()> {
    let output_path = args.output_path();
    print_config(
        &args.input,
        Some(&output_path),
        &[
            ("Correlation threshold", format!("{:.2}", args.correlation_threshold)),
            ("Always kept", describe_list(&args.keep)),
        ],
    );

    let (table, load_time) = load_step(&args.input, cli.infer_schema_length)?;
    let mut summary = ReductionSummary::new(table.width());
    summary.set_load_time(load_time);

    print_step_header(2, "Feature Subset Selection");
    let step_start = Instant::now();
    let policy = SubsetPolicy::new(args.keep.iter().cloned(), args.correlation_threshold);
    let spinner = create_spinner("Removing constant and correlated features...");
    let outcome = select_feature_subset(&table, &policy)?;
    finish_with_success(&spinner, "Feature subset selection complete");

    print_removals(&outcome.reasons);
    summary.set_removed(outcome.reasons.clone());
    summary.set_reduction_time(step_start.elapsed());
    print_step_time(summary.reduction_time);

    if !confirm_removals(cli, &outcome.reasons, "subset selection")? {
        return Ok(());
    }

    summary.set_save_time(save_step(3, &outcome.table, &output_path)?);
    summary.display();

    if let Some(report_path) = &args.report {
        let report = RemovalReport::new(
            ReportMetadata::new(&args.input, &[output_path.as_path()]),
            ReductionKind::Subset,
            args.correlation_threshold,
            &args.keep,
            &summary,
        );
        export_report(&report, report_path)?;
        print_success(&format!("Report written to {}", report_path.display()));
    }

    print_completion("Feature subset selection complete!");
    Ok(())
}

fn run_outliers(cli: &Cli, args: &OutlierArgs) -> Result<()> {
    let outputs = args.output_paths();
    print_config(
        &args.input,
        None,
        &[
            ("IQR multiplier", format!("{:.2}", args.iqr_multiplier)),
            ("Z-score threshold", format!("{:.2}", args.z_threshold)),
            ("Columns", describe_list(&args.columns)),
        ],
    );

    let (table, _) = load_step(&args.input, cli.infer_schema_length)?;

    print_step_header(2, "Outlier Detection");
    let step_start = Instant::now();
    let mut policy = OutlierPolicy {
        iqr_multiplier: args.iqr_multiplier,
        z_threshold: args.z_threshold,
        ..OutlierPolicy::default()
    };
    if let Some(columns) = args.requested_columns() {
        policy = policy.with_columns(columns);
    }
    let spinner = create_spinner("Scoring rows...");
    let detection = detect_outliers(&table, &policy)?;
    if detection.diagnostics.is_empty() {
        finish_with_warning(&spinner, "No numeric columns were analysed");
    } else {
        finish_with_success(&spinner, "Outlier detection complete");
    }
    print_count(
        "outlier row(s)",
        detection.outlier_count(),
        Some(&format!(
            "(IQR: {}, Z-score: {})",
            detection.iqr_count(),
            detection.zscore_count()
        )),
    );
    print_step_time(step_start.elapsed());

    if !cli.no_confirm && !confirm_step("Write flagged, cleaned and removed datasets?")? {
        println!("Cancelled by user.");
        return Ok(());
    }

    print_step_header(3, "Save Results");
    let step_start = Instant::now();
    for (table, path) in [
        (&detection.flagged, &outputs.flagged),
        (&detection.clean, &outputs.cleaned),
        (&detection.removed, &outputs.removed),
    ] {
        let spinner = create_spinner(&format!("Writing {}...", path.display()));
        save_table(table, path)?;
        finish_with_success(&spinner, &format!("Saved to {}", path.display()));
    }
    print_step_time(step_start.elapsed());

    OutlierSummary::new(&detection).display();

    if let Some(report_path) = &args.report {
        let report = OutlierReport::new(
            ReportMetadata::new(
                &args.input,
                &[
                    outputs.flagged.as_path(),
                    outputs.cleaned.as_path(),
                    outputs.removed.as_path(),
                ],
            ),
            &policy,
            &detection,
        );
        export_report(&report, report_path)?;
        print_success(&format!("Report written to {}", report_path.display()));
    }

    print_completion("Outlier detection complete!");
    Ok(())
}

fn run_dedup(cli: &Cli, args: &DedupArgs) -> Result<()> {
    let output_path = args.output_path();
    print_config(
        &args.input,
        Some(&output_path),
        &[
            ("Subset", describe_list(&args.subset)),
            ("Keep", args.keep.to_string()),
        ],
    );

    let (table, _) = load_step(&args.input, cli.infer_schema_length)?;

    print_step_header(2, "Duplicate Rows");
    let step_start = Instant::now();
    let spinner = create_spinner("Removing duplicate rows...");
    let (deduplicated, removed) = remove_duplicate_rows(&table, args.subset_columns(), args.keep)?;
    if removed == 0 {
        finish_with_warning(&spinner, "No duplicate rows found");
    } else {
        finish_with_success(&spinner, "Duplicate rows removed");
    }
    print_count(
        "duplicate row(s) removed",
        removed,
        Some(&format!("({} -> {} rows)", table.height(), deduplicated.height())),
    );
    print_step_time(step_start.elapsed());

    if !cli.no_confirm && removed > 0 && !confirm_step("Write the deduplicated dataset?")? {
        println!("Cancelled by user.");
        return Ok(());
    }

    save_step(3, &deduplicated, &output_path)?;
    print_completion("Row deduplication complete!");
    Ok(())
}

fn save_step(step_num: u8, table: &Table, output_path: &Path) -> Result<std::time::Duration> {
    print_step_header(step_num, "Save Results");

    let step_start = Instant::now();
    let spinner = create_spinner("Writing output file...");
    save_table(table, output_path)?;
    finish_with_success(&spinner, &format!("Saved to {}", output_path.display()));

    let elapsed = step_start.elapsed();
    print_step_time(elapsed);
    Ok(elapsed)
}

fn print_removals(removed: &[RemovedColumn]) {
    if removed.is_empty() {
        print_info("No columns removed");
        return;
    }
    print_count("column(s) to drop", removed.len(), None);
    for entry in removed {
        println!(
            "        {} {} {}",
            style("•").dim(),
            entry.column,
            style(format!("({})", entry.reason)).dim()
        );
    }
}

/// Ask before writing unless `--no-confirm` is set or nothing was removed
fn confirm_removals(cli: &Cli, removed: &[RemovedColumn], step_name: &str) -> Result<bool> {
    if cli.no_confirm || removed.is_empty() {
        return Ok(true);
    }
    if confirm_drop_features(removed.len(), step_name)? {
        Ok(true)
    } else {
        println!("Cancelled by user.");
        Ok(false)
    }
}

fn describe_list(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}
