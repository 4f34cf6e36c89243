//! Batch characterization of extracted archive members

use std::path::Path;

use tracing::{debug, info, warn};

use crate::domain::characterization::{FmMetadata, MetadataForm};
use crate::domain::dataset::DatasetResult;
use crate::domain::upload::file_stem;
use crate::domain::DomainError;
use crate::infrastructure::characterization::CharacterizationInvoker;
use crate::infrastructure::feature_model::{ModelIngester, ParserFactory};
use crate::infrastructure::observability::record_dataset_entry;

/// Ingests and characterizes every supported member of a dataset
#[derive(Debug, Clone)]
pub struct DatasetProcessor {
    ingester: ModelIngester,
    invoker: CharacterizationInvoker,
}

impl DatasetProcessor {
    pub fn new(ingester: ModelIngester, invoker: CharacterizationInvoker) -> Self {
        Self { ingester, invoker }
    }

    /// Process `members` (relative to `base_dir`) in order.
    ///
    /// Directories and unsupported extensions are skipped. A member that
    /// fails is recorded and processing continues. Fails with
    /// `NoValidModels` when no member could be characterized.
    pub fn process(
        &self,
        members: &[String],
        base_dir: &Path,
        label: &str,
    ) -> Result<DatasetResult, DomainError> {
        let mut dataset = DatasetResult::new(label);

        for member in members {
            let path = base_dir.join(member);

            if member.ends_with('/') || path.is_dir() || !ParserFactory::is_supported(member) {
                debug!(dataset = label, member = %member, "Skipping archive member");
                record_dataset_entry("skipped");
                dataset.push_skipped(member.as_str());
                continue;
            }

            let outcome = self
                .ingester
                .ingest(&path)
                .map_err(|e| e.with_path(member))
                .and_then(|model| {
                    self.invoker.characterize(
                        &model,
                        FmMetadata::named(file_stem(member)),
                        &MetadataForm::default(),
                    )
                });

            match outcome {
                Ok(result) => {
                    record_dataset_entry("success");
                    dataset.push_result(member.as_str(), result);
                }
                Err(e) => {
                    warn!(dataset = label, member = %member, error = %e, "Dataset member failed");
                    record_dataset_entry("failure");
                    dataset.push_failure(member.as_str(), failure_reason(&e));
                }
            }
        }

        info!(
            dataset = label,
            succeeded = dataset.results.len(),
            failed = dataset.failures.len(),
            skipped = dataset.skipped.len(),
            "Processed dataset"
        );

        if dataset.results.is_empty() {
            let failures = dataset
                .failures
                .iter()
                .map(|f| format!("{}: {}", f.filename, f.reason))
                .collect();

            return Err(DomainError::no_valid_models(label, failures));
        }

        Ok(dataset)
    }
}

fn failure_reason(error: &DomainError) -> String {
    match error {
        DomainError::Format { message, .. } => message.clone(),
        other => other.user_message(),
    }
}
