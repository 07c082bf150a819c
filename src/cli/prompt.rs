use crate::cli::PromptArgs;
use crate::error::InputError;
use crate::prompt::{build_batch_prompt, fingerprint};
use crate::runner::partition;
use crate::table::{select_text_column, InputTable};

/// Payload on stdout, fingerprint on stderr so the output can be piped as-is
pub fn execute(args: PromptArgs) -> anyhow::Result<()> {
    let config = args.table.load_config()?;
    let options = config.batch_options()?;

    let input = InputTable::load(&args.table.input)?;
    let text_column = select_text_column(input.headers(), config.text_column.as_deref())?;

    let plan = partition(0, input.len(), options.batch_size);
    let rows = plan
        .get(args.batch)
        .cloned()
        .ok_or(InputError::BatchOutOfRange {
            index: args.batch,
            batches: plan.len(),
        })?;

    let payload = build_batch_prompt(&input.texts(rows.clone(), text_column), &options.delimiter);

    eprintln!(
        "batch {} (rows {}..{}) fingerprint {}",
        args.batch,
        rows.start,
        rows.end,
        fingerprint(&payload)
    );
    print!("{}", payload);
    Ok(())
}
