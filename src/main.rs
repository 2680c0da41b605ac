use clap::Parser;
use std::process::ExitCode;

use pdfpack::cli::Cli;
use pdfpack::output::OutputFormatter;
use pdfpack::{OverwriteMode, PdfPackError, Result};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let formatter = OutputFormatter::new(cli.quiet, cli.verbose);

    match run(cli, &formatter).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            formatter.error(&e.to_string());
            if e.is_input_error() {
                formatter.warning("No output was written; every fragment must be a readable PDF");
            }
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

/// Library diagnostics follow `RUST_LOG`, defaulting to the CLI verbosity.
fn init_logging(cli: &Cli) {
    let default_filter = if cli.verbose {
        "pdfpack=debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

async fn run(cli: Cli, formatter: &OutputFormatter) -> Result<()> {
    let fragments = cli.fragments().await?;
    let config = cli.to_config(fragments)?;
    let formatter = if config.dry_run {
        OutputFormatter::from_config(&config)
    } else {
        formatter.clone()
    };

    if config.dry_run {
        formatter.info("🔍 DRY RUN MODE - No files will be created\n");
    }

    formatter.info(&format!(
        "Assembling {} fragments into {}...",
        config.fragments.len(),
        config.output.display()
    ));
    for (index, fragment) in config.fragments.iter().enumerate() {
        formatter.debug(&format!(
            "{}. {} ({})",
            index + 1,
            fragment.title,
            fragment.source.display()
        ));
    }

    if !config.dry_run
        && config.overwrite_mode == OverwriteMode::Force
        && config.output.exists()
    {
        formatter.warning(&format!(
            "Overwriting existing file {}",
            config.output.display()
        ));
    }

    let json = cli.json;
    let dry_run = config.dry_run;
    let outcome = tokio::task::spawn_blocking(move || {
        if dry_run {
            pdfpack::plan(&config).map(Outcome::Plan)
        } else {
            pdfpack::assemble_to_path(&config).map(Outcome::Written)
        }
    })
    .await
    .map_err(|e| PdfPackError::other(format!("Assembly task failed: {e}")))??;

    match outcome {
        Outcome::Plan(plan) if json => {
            let rendered = serde_json::to_string_pretty(&plan)
                .map_err(|e| PdfPackError::other(format!("Failed to serialise plan: {e}")))?;
            println!("{rendered}");
        }
        Outcome::Plan(plan) => {
            formatter.plan(&plan);
            formatter.success("Dry run completed successfully");
            formatter.info("  Run without --dry-run to create the document");
        }
        Outcome::Written(report) => formatter.report(&report),
    }

    Ok(())
}

enum Outcome {
    Plan(pdfpack::AssemblyPlan),
    Written(pdfpack::AssemblyReport),
}
