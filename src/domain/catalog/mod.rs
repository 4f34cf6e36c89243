//! Example model catalog
//!
//! Built once at startup and shared read-only between requests.

use serde::{Deserialize, Serialize};

use crate::domain::characterization::{join_keywords, FmMetadata};
use crate::domain::DomainError;

/// A built-in example feature model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleModel {
    pub name: String,
    /// File name relative to the catalog's model directory
    pub filename: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub year: String,
}

impl ExampleModel {
    /// Default report metadata for this example
    pub fn metadata(&self) -> FmMetadata {
        FmMetadata {
            name: self.name.clone(),
            description: self.description.clone(),
            author: self.author.clone(),
            year: self.year.clone(),
            tags: join_keywords(&self.keywords),
            reference: self.reference.clone(),
            domains: self.domain.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    examples: Vec<ExampleModel>,
}

/// Immutable, ordered catalog of example models
#[derive(Debug, Clone, Default)]
pub struct ExampleCatalog {
    examples: Vec<ExampleModel>,
}

impl ExampleCatalog {
    /// Build a catalog; example names must be unique and non-empty
    pub fn new(examples: Vec<ExampleModel>) -> Result<Self, DomainError> {
        for (index, example) in examples.iter().enumerate() {
            if example.name.trim().is_empty() {
                return Err(DomainError::configuration(format!(
                    "Example #{} has an empty name",
                    index + 1
                )));
            }

            if example.filename.trim().is_empty() {
                return Err(DomainError::configuration(format!(
                    "Example '{}' has no filename",
                    example.name
                )));
            }

            if examples[..index].iter().any(|e| e.name == example.name) {
                return Err(DomainError::configuration(format!(
                    "Duplicate example '{}'",
                    example.name
                )));
            }
        }

        Ok(Self { examples })
    }

    /// Parse a catalog from TOML (`[[examples]]` tables)
    pub fn from_toml_str(content: &str) -> Result<Self, DomainError> {
        let file: CatalogFile = toml::from_str(content)
            .map_err(|e| DomainError::configuration(format!("Invalid example catalog: {}", e)))?;

        Self::new(file.examples)
    }

    /// The catalog shipped with the service, matching `resources/models`
    pub fn builtin() -> Self {
        let example = |name: &str, filename: &str, description: &str, keywords: &[&str], domain: &str| {
            ExampleModel {
                name: name.to_string(),
                filename: filename.to_string(),
                description: description.to_string(),
                author: "FM Fact Label".to_string(),
                reference: String::new(),
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
                domain: domain.to_string(),
                year: "2022".to_string(),
            }
        };

        Self {
            examples: vec![
                example(
                    "Pizzas",
                    "pizzas.uvl",
                    "Toy model of pizza configurations used in teaching.",
                    &["pizza", "toy example"],
                    "Food",
                ),
                example(
                    "Car",
                    "car.xml",
                    "Small automotive product line in FeatureIDE format.",
                    &["car", "automotive"],
                    "Automotive",
                ),
                example(
                    "Smart home",
                    "smart_home.uvl",
                    "Home automation system with sensors, actuators and a controller.",
                    &["iot", "smart home", "cardinality"],
                    "IoT",
                ),
            ],
        }
    }

    pub fn get(&self, name: &str) -> Option<&ExampleModel> {
        self.examples.iter().find(|e| e.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExampleModel> {
        self.examples.iter()
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }
}
