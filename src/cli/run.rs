use crate::cli::RunArgs;
use crate::config::{Config, Provider};
use crate::output::{summary_path, write_summary};
use crate::provider::create_client;
use crate::runner::{Orchestrator, OutputSpec};
use crate::table::{select_text_column, InputTable};
use tracing::{debug, info, warn};

pub async fn execute(args: RunArgs) -> anyhow::Result<()> {
    let mut config = args.table.load_config()?;
    apply_overrides(&mut config, &args);

    let options = config.batch_options()?;

    // Credentials are checked before any input is read
    let client = create_client(&config)?;

    info!("Loading input from {:?}", args.table.input);
    let input = InputTable::load(&args.table.input)?;
    if input.is_empty() {
        warn!("{:?} has a header but no records", args.table.input);
    }
    let text_column = select_text_column(input.headers(), config.text_column.as_deref())?;
    info!(
        "Using column '{}' for chat analysis",
        input.headers()[text_column]
    );

    let mut orchestrator = Orchestrator::new(client.clone(), options);
    let report = orchestrator
        .run(
            &input,
            text_column,
            OutputSpec {
                path: &config.output,
                write_bom: config.write_bom,
                resume: args.resume,
            },
        )
        .await?;
    debug!("Orchestrator stopped in state {:?}", orchestrator.state());

    if config.summary {
        let path = summary_path(&config.output);
        match write_summary(
            &path,
            &report,
            &args.table.input,
            &config.output,
            client.name(),
        ) {
            Ok(_) => info!("Wrote summary: {}", path.display()),
            Err(e) => warn!("Failed to write summary {}: {}", path.display(), e),
        }
    }

    if report.failed() > 0 {
        warn!(
            "{} of {} batches failed and were recorded with empty judgments",
            report.failed(),
            report.batches.len()
        );
    }

    println!(
        "Analysis complete in {:.1}s: {} records graded ({} batches, {} repaired, {} failed). Results saved in: {}",
        report.total_duration.as_secs_f64(),
        report.processed(),
        report.batches.len(),
        report.repaired(),
        report.failed(),
        config.output.display()
    );

    Ok(())
}

fn apply_overrides(config: &mut Config, args: &RunArgs) {
    if let Some(output) = &args.output {
        config.output = output.clone();
    }
    if let Some(delay) = args.batch_delay_ms {
        config.batch_delay_ms = delay;
    }
    if let Some(provider) = args.provider {
        config.provider = provider;
    }
    if let Some(model) = &args.model {
        match config.provider {
            Provider::Gemini => config.providers.gemini.model = model.clone(),
            Provider::ClaudeCli => config.providers.claude_cli.model = model.clone(),
            Provider::Command => warn!("--model has no effect with the command provider"),
        }
    }
    if args.no_summary {
        config.summary = false;
    }
}
