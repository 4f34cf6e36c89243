//! Per-request characterization pipeline
//!
//! Composes upload validation, scratch storage, model ingestion,
//! characterization and dataset processing. Every temporary artifact is
//! released before a request returns, whatever the outcome.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::domain::catalog::ExampleCatalog;
use crate::domain::characterization::{CharacterizationResult, FmMetadata, MetadataForm};
use crate::domain::dataset::DatasetResult;
use crate::domain::upload::{file_stem, UploadKind, UploadRequest, UploadValidator, UploadedFile};
use crate::domain::DomainError;
use crate::infrastructure::characterization::CharacterizationInvoker;
use crate::infrastructure::dataset::DatasetProcessor;
use crate::infrastructure::feature_model::ModelIngester;
use crate::infrastructure::observability::record_characterization;
use crate::infrastructure::scratch::{ArchiveExtractor, TempFileManager};

/// Last stage a request reached before it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStage {
    Received,
    Validated,
    Ingested,
    Characterized,
}

impl fmt::Display for RequestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::Validated => "validated",
            Self::Ingested => "ingested",
            Self::Characterized => "characterized",
        };
        write!(f, "{}", name)
    }
}

/// A failed request together with the stage it failed in
#[derive(Debug, thiserror::Error)]
#[error("{error} (after stage '{stage}')")]
pub struct RequestFailure {
    pub stage: RequestStage,
    #[source]
    pub error: DomainError,
}

impl RequestFailure {
    pub fn new(stage: RequestStage, error: DomainError) -> Self {
        Self { stage, error }
    }
}

fn at(stage: RequestStage) -> impl Fn(DomainError) -> RequestFailure {
    move |error| RequestFailure::new(stage, error)
}

/// Characterizes uploaded models, catalog examples and uploaded datasets
#[derive(Debug, Clone)]
pub struct CharacterizationService {
    catalog: Arc<ExampleCatalog>,
    models_dir: PathBuf,
    temp_files: TempFileManager,
    extractor: ArchiveExtractor,
    ingester: ModelIngester,
    invoker: CharacterizationInvoker,
    processor: DatasetProcessor,
}

impl CharacterizationService {
    pub fn new(
        catalog: Arc<ExampleCatalog>,
        models_dir: impl Into<PathBuf>,
        temp_files: TempFileManager,
        invoker: CharacterizationInvoker,
    ) -> Self {
        let ingester = ModelIngester::new();
        let extractor = ArchiveExtractor::new(temp_files.scratch_dir());
        let processor = DatasetProcessor::new(ingester.clone(), invoker.clone());

        Self {
            catalog,
            models_dir: models_dir.into(),
            temp_files,
            extractor,
            ingester,
            invoker,
            processor,
        }
    }

    pub fn catalog(&self) -> &ExampleCatalog {
        &self.catalog
    }

    /// Shared handle to the catalog
    pub fn catalog_handle(&self) -> Arc<ExampleCatalog> {
        Arc::clone(&self.catalog)
    }

    pub fn scratch_dir(&self) -> &Path {
        self.temp_files.scratch_dir()
    }

    pub fn scratch_ready(&self) -> bool {
        self.temp_files.is_writable()
    }

    /// Characterize an uploaded model or a catalog example
    pub async fn characterize_model(
        &self,
        request: UploadRequest,
    ) -> Result<CharacterizationResult, RequestFailure> {
        let kind = UploadValidator::classify(&request).map_err(at(RequestStage::Received))?;
        let label = kind.label();
        let started = Instant::now();

        let service = self.clone();
        let form = request.metadata;
        let outcome = tokio::task::spawn_blocking(move || service.run_model(kind, &form))
            .await
            .unwrap_or_else(|e| Err(join_failure(e)));

        self.finish(label, started, &outcome);
        outcome
    }

    /// Characterize every model of an uploaded ZIP archive
    pub async fn characterize_dataset(
        &self,
        request: UploadRequest,
    ) -> Result<DatasetResult, RequestFailure> {
        let kind = UploadValidator::classify(&request).map_err(at(RequestStage::Received))?;
        let label = kind.label();
        let started = Instant::now();

        let service = self.clone();
        let outcome = tokio::task::spawn_blocking(move || service.run_dataset(kind))
            .await
            .unwrap_or_else(|e| Err(join_failure(e)));

        self.finish(label, started, &outcome);
        outcome
    }

    /// Characterize a model file on the local filesystem
    pub fn characterize_file(
        &self,
        path: &Path,
        form: &MetadataForm,
    ) -> Result<CharacterizationResult, DomainError> {
        let model = self.ingester.ingest(path)?;
        let name = file_stem(&path.to_string_lossy());

        self.invoker.characterize(&model, FmMetadata::named(name), form)
    }

    fn finish<T>(&self, label: &str, started: Instant, outcome: &Result<T, RequestFailure>) {
        let elapsed = started.elapsed();
        record_characterization(label, outcome.is_ok(), elapsed);

        match outcome {
            Ok(_) => info!(
                kind = label,
                duration_ms = elapsed.as_millis() as u64,
                "Characterization request completed"
            ),
            Err(failure) if failure.error.is_client_error() => warn!(
                kind = label,
                stage = %failure.stage,
                error = %failure.error,
                "Characterization request rejected"
            ),
            Err(failure) => error!(
                kind = label,
                stage = %failure.stage,
                error = %failure.error,
                "Characterization request failed"
            ),
        }
    }

    fn run_model(
        &self,
        kind: UploadKind,
        form: &MetadataForm,
    ) -> Result<CharacterizationResult, RequestFailure> {
        match kind {
            UploadKind::Single(file) => self.run_single(&file, form),
            UploadKind::Example(name) => self.run_example(&name, form),
            UploadKind::Zip(file) => Err(RequestFailure::new(
                RequestStage::Received,
                DomainError::validation(format!(
                    "'{}' is an archive, please use the dataset form",
                    file.filename
                )),
            )),
        }
    }

    fn run_single(
        &self,
        file: &UploadedFile,
        form: &MetadataForm,
    ) -> Result<CharacterizationResult, RequestFailure> {
        let upload = self
            .temp_files
            .materialize(&file.bytes, &file.filename)
            .map_err(at(RequestStage::Validated))?;

        let outcome = self
            .ingester
            .ingest(upload.path())
            .map_err(|e| e.with_path(&file.filename))
            .map_err(at(RequestStage::Validated))
            .and_then(|model| {
                self.invoker
                    .characterize(&model, FmMetadata::named(file.stem()), form)
                    .map_err(at(RequestStage::Ingested))
            });

        upload.release();
        outcome
    }

    fn run_example(
        &self,
        name: &str,
        form: &MetadataForm,
    ) -> Result<CharacterizationResult, RequestFailure> {
        let example = self.catalog.get(name).ok_or_else(|| {
            RequestFailure::new(
                RequestStage::Received,
                DomainError::validation(format!("Unknown example model '{}'", name)),
            )
        })?;

        debug!(example = name, filename = %example.filename, "Loading example model");

        let model = self
            .ingester
            .ingest(&self.models_dir.join(&example.filename))
            .map_err(|e| e.with_path(&example.filename))
            .map_err(at(RequestStage::Validated))?;

        self.invoker
            .characterize(&model, example.metadata(), form)
            .map_err(at(RequestStage::Ingested))
    }

    fn run_dataset(&self, kind: UploadKind) -> Result<DatasetResult, RequestFailure> {
        let file = match kind {
            UploadKind::Zip(file) => file,
            other => {
                return Err(RequestFailure::new(
                    RequestStage::Received,
                    DomainError::validation(format!(
                        "Expected a ZIP upload, got a {} request",
                        other.label()
                    )),
                ));
            }
        };

        let upload = self
            .temp_files
            .materialize(&file.bytes, &file.filename)
            .map_err(at(RequestStage::Validated))?;

        let archive = match self.extractor.extract(upload.path()) {
            Ok(archive) => archive,
            Err(e) => {
                upload.release();
                return Err(RequestFailure::new(RequestStage::Validated, e));
            }
        };

        let outcome = self
            .processor
            .process(archive.members(), archive.path(), &file.filename)
            .map_err(at(RequestStage::Validated));

        archive.release();
        upload.release();
        outcome
    }
}

fn join_failure(error: tokio::task::JoinError) -> RequestFailure {
    RequestFailure::new(
        RequestStage::Validated,
        DomainError::internal(format!("Characterization task failed: {}", error)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use bytes::Bytes;
    use tempfile::TempDir;

    use crate::domain::characterization::FactValue;
    use crate::domain::upload::FormKind;
    use crate::infrastructure::characterization::StructuralCharacterizer;
    use crate::testing::{dir_entries, zip_bytes, CAR_XML, PIZZA_UVL};

    struct Fixture {
        scratch: TempDir,
        service: CharacterizationService,
    }

    fn fixture() -> Fixture {
        let scratch = TempDir::new().unwrap();
        let service = CharacterizationService::new(
            Arc::new(ExampleCatalog::builtin()),
            concat!(env!("CARGO_MANIFEST_DIR"), "/resources/models"),
            TempFileManager::new(scratch.path()).unwrap(),
            CharacterizationInvoker::new(Arc::new(StructuralCharacterizer::new())),
        );

        Fixture { scratch, service }
    }

    fn model_request(name: &str, content: &str) -> UploadRequest {
        UploadRequest::new(FormKind::Model)
            .with_model_file(UploadedFile::new(name, Bytes::from(content.to_string())))
    }

    fn zip_request(name: &str, entries: &[(&str, &str)]) -> UploadRequest {
        UploadRequest::new(FormKind::Dataset)
            .with_zip_file(UploadedFile::new(name, Bytes::from(zip_bytes(entries))))
    }

    #[tokio::test]
    async fn test_single_upload_defaults_name_to_file_stem() {
        let f = fixture();

        let result = f
            .service
            .characterize_model(model_request("pizzas.uvl", PIZZA_UVL))
            .await
            .unwrap();

        assert_eq!(result.metadata.name, "pizzas");
        assert_eq!(result.tree["metrics"][0]["value"], 12);
        let reparsed: serde_json::Value = serde_json::from_str(&result.json).unwrap();
        assert_eq!(reparsed, result.tree);
        assert!(dir_entries(f.scratch.path()).is_empty());
    }

    #[tokio::test]
    async fn test_missing_input_is_rejected_before_touching_scratch() {
        let f = fixture();

        let failure = f
            .service
            .characterize_model(UploadRequest::new(FormKind::Model))
            .await
            .unwrap_err();

        assert_eq!(failure.stage, RequestStage::Received);
        assert!(matches!(failure.error, DomainError::Validation { .. }));
        assert!(dir_entries(f.scratch.path()).is_empty());
    }

    #[tokio::test]
    async fn test_invalid_model_reports_uploaded_name_and_cleans_up() {
        let f = fixture();

        let failure = f
            .service
            .characterize_model(model_request("broken.xml", "<featureModel>"))
            .await
            .unwrap_err();

        assert_eq!(failure.stage, RequestStage::Validated);
        assert!(failure.error.user_message().contains("'broken.xml'"));
        assert!(dir_entries(f.scratch.path()).is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_single_upload_is_format_error() {
        let f = fixture();

        let failure = f
            .service
            .characterize_model(model_request("model.json", "{}"))
            .await
            .unwrap_err();

        assert!(matches!(failure.error, DomainError::Format { .. }));
        assert!(dir_entries(f.scratch.path()).is_empty());
    }

    #[tokio::test]
    async fn test_example_keeps_catalog_author_unless_overridden() {
        let f = fixture();
        let request = UploadRequest::new(FormKind::Model).with_example("Car");

        let result = f.service.characterize_model(request.clone()).await.unwrap();
        assert_eq!(result.metadata.author, "FM Fact Label");
        assert_eq!(result.metadata.domains, "Automotive");

        let form = MetadataForm {
            author: "B".to_string(),
            ..MetadataForm::default()
        };
        let result = f
            .service
            .characterize_model(request.with_metadata(form))
            .await
            .unwrap();
        assert_eq!(result.metadata.author, "B");
        assert_eq!(result.metadata.name, "Car");
    }

    #[tokio::test]
    async fn test_every_builtin_example_characterizes() {
        let f = fixture();
        let names: Vec<String> = f.service.catalog().iter().map(|e| e.name.clone()).collect();

        for name in names {
            let request = UploadRequest::new(FormKind::Model).with_example(name.clone());
            let result = f.service.characterize_model(request).await.unwrap();
            assert_eq!(result.metadata.name, name);
        }
    }

    #[tokio::test]
    async fn test_unknown_example_is_validation_error() {
        let f = fixture();
        let request = UploadRequest::new(FormKind::Model).with_example("Nope");

        let failure = f.service.characterize_model(request).await.unwrap_err();
        assert!(matches!(failure.error, DomainError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_uploads_with_same_name_are_independent() {
        let f = fixture();
        let small = "features\n    Small\n";

        let (first, second) = tokio::join!(
            f.service.characterize_model(model_request("model.uvl", PIZZA_UVL)),
            f.service.characterize_model(model_request("model.uvl", small)),
        );

        let first = first.unwrap();
        let second = second.unwrap();
        assert_eq!(first.tree["metrics"][0]["value"], 12);
        assert_eq!(second.tree["metrics"][0]["value"], 1);
        assert!(dir_entries(f.scratch.path()).is_empty());
    }

    #[tokio::test]
    async fn test_dataset_with_supported_and_unsupported_members() {
        let f = fixture();
        let request = zip_request(
            "models.ZIP",
            &[("pizzas.uvl", PIZZA_UVL), ("car.xml", CAR_XML), ("readme.txt", "x")],
        );

        let dataset = f.service.characterize_dataset(request).await.unwrap();

        assert_eq!(dataset.label, "models.ZIP");
        assert_eq!(dataset.results.len(), 2);
        assert_eq!(dataset.skipped, vec!["readme.txt"]);
        assert!(dataset.failures.is_empty());
        assert!(dir_entries(f.scratch.path()).is_empty());
    }

    #[tokio::test]
    async fn test_dataset_without_models() {
        let f = fixture();
        let request = zip_request("docs.zip", &[("a.txt", "a"), ("b/", "")]);

        let failure = f.service.characterize_dataset(request).await.unwrap_err();

        assert!(failure.error.user_message().starts_with("No valid files found"));
        assert!(dir_entries(f.scratch.path()).is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_zip_cleans_up() {
        let f = fixture();
        let request = UploadRequest::new(FormKind::Dataset)
            .with_zip_file(UploadedFile::new("bad.zip", Bytes::from_static(b"PK not really")));

        let failure = f.service.characterize_dataset(request).await.unwrap_err();

        assert!(matches!(failure.error, DomainError::Archive { .. }));
        assert!(dir_entries(f.scratch.path()).is_empty());
    }

    #[tokio::test]
    async fn test_zip_with_wrong_extension_is_rejected() {
        let f = fixture();
        let request = zip_request("models.tar", &[("a.uvl", PIZZA_UVL)]);

        let failure = f.service.characterize_dataset(request).await.unwrap_err();
        assert_eq!(failure.stage, RequestStage::Received);
    }

    #[test]
    fn test_characterize_local_file() {
        let f = fixture();
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("resources/models/car.xml");

        let result = f
            .service
            .characterize_file(&path, &MetadataForm::default())
            .unwrap();

        assert_eq!(result.metadata.name, "car");
        assert!(matches!(
            serde_json::from_value::<FactValue>(result.tree["analysis"][0]["value"].clone()),
            Ok(FactValue::Int(_))
        ));
    }
}
