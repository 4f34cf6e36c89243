//! Characterize command - prints the report of a local model file

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::config::AppConfig;
use crate::domain::characterization::{CharacterizationResult, MetadataForm};
use crate::infrastructure::logging::init_logging;

#[derive(Debug, Args)]
pub struct CharacterizeArgs {
    /// Feature model file (.uvl or .xml)
    pub file: PathBuf,

    /// Report name (defaults to the file name without extension)
    #[arg(long)]
    pub name: Option<String>,

    /// Print the JSON report instead of text
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: CharacterizeArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    init_logging(&config.logging);

    let service = crate::create_characterization_service(&config)?;
    let form = MetadataForm {
        name: args.name.clone().unwrap_or_default(),
        ..MetadataForm::default()
    };

    let file = args.file.clone();
    let result = tokio::task::spawn_blocking(move || service.characterize_file(&file, &form))
        .await
        .context("characterization task failed")?
        .with_context(|| format!("failed to characterize '{}'", args.file.display()))?;

    println!("{}", render(&result, args.json));
    Ok(())
}

fn render(result: &CharacterizationResult, json: bool) -> &str {
    if json {
        &result.json
    } else {
        result.text.trim_end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::characterization::{FactValue, FmCharacterization, FmFact, FmMetadata};

    #[test]
    fn test_render_selects_form() {
        let report = FmCharacterization {
            metadata: FmMetadata::named("car"),
            metrics: vec![FmFact::new("Features", "Total", FactValue::Int(9))],
            analysis: vec![],
        };
        let result = CharacterizationResult::from_report(&report).unwrap();

        assert!(render(&result, true).starts_with('{'));
        assert!(render(&result, false).starts_with("METADATA"));
    }
}
