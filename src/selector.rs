use anyhow::{Context, Result, bail};
use std::io::{BufRead, Write};
use std::num::IntErrorKind;
use tracing::{debug, info};

use crate::api::GroqApi;
use crate::model::ModelDescriptor;
use crate::selection::SelectionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChoiceError {
    NotANumber,
    OutOfRange,
}

/// Returns the persisted model unless `force_reselect` is set or nothing
/// usable is stored, in which case the user picks one interactively.
pub async fn resolve_model<A, R, W>(
    force_reselect: bool,
    store: &SelectionStore,
    api: &A,
    input: &mut R,
    output: &mut W,
) -> Result<ModelDescriptor>
where
    A: GroqApi + ?Sized,
    R: BufRead,
    W: Write,
{
    if !force_reselect && let Some(model) = store.load()? {
        info!(model = %model, "using persisted model selection");
        return Ok(ModelDescriptor::new(model));
    }

    select_model(store, api, input, output).await
}

pub async fn select_model<A, R, W>(
    store: &SelectionStore,
    api: &A,
    input: &mut R,
    output: &mut W,
) -> Result<ModelDescriptor>
where
    A: GroqApi + ?Sized,
    R: BufRead,
    W: Write,
{
    let models = api.list_models().await?;
    if models.is_empty() {
        bail!("Groq API returned no models to choose from");
    }

    writeln!(output, "Available Groq models:").context("Failed to write model list")?;
    for (idx, model) in models.iter().enumerate() {
        writeln!(output, "{}. {}", idx + 1, model).context("Failed to write model list")?;
    }

    let choice = prompt_for_choice(models.len(), input, output)?;
    let selected = models[choice - 1].clone();
    store.save(selected.id())?;
    info!(model = %selected, "selected model");
    Ok(selected)
}

fn prompt_for_choice<R, W>(count: usize, input: &mut R, output: &mut W) -> Result<usize>
where
    R: BufRead,
    W: Write,
{
    loop {
        write!(output, "Select a model number: ").context("Failed to write prompt")?;
        output.flush().context("Failed to flush stdout")?;

        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .context("Failed to read model choice")?;
        if read == 0 {
            bail!("Input closed before a model was selected");
        }

        match parse_choice(&line, count) {
            Ok(choice) => return Ok(choice),
            Err(ChoiceError::NotANumber) => {
                debug!(input = %line.trim(), "rejected non-numeric model choice");
                writeln!(output, "Invalid input. Please enter a number.")
                    .context("Failed to write prompt")?;
            }
            Err(ChoiceError::OutOfRange) => {
                debug!(input = %line.trim(), count, "rejected out-of-range model choice");
                writeln!(output, "Invalid choice. Please try again.")
                    .context("Failed to write prompt")?;
            }
        }
    }
}

fn parse_choice(raw: &str, count: usize) -> std::result::Result<usize, ChoiceError> {
    let value = match raw.trim().parse::<i64>() {
        Ok(value) => value,
        Err(err)
            if matches!(
                err.kind(),
                IntErrorKind::PosOverflow | IntErrorKind::NegOverflow
            ) =>
        {
            return Err(ChoiceError::OutOfRange);
        }
        Err(_) => return Err(ChoiceError::NotANumber),
    };
    usize::try_from(value)
        .ok()
        .filter(|choice| (1..=count).contains(choice))
        .ok_or(ChoiceError::OutOfRange)
}
