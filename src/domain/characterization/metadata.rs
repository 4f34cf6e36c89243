//! Descriptive metadata attached to a characterization report

use serde::{Deserialize, Serialize};

/// Metadata record of a characterization report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FmMetadata {
    pub name: String,
    pub description: String,
    pub author: String,
    pub year: String,
    /// Keywords joined into a single comma-separated string
    pub tags: String,
    pub reference: String,
    pub domains: String,
}

impl FmMetadata {
    /// Metadata with only a display name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Overlay the non-empty fields of a submitted form.
    ///
    /// Blank fields keep the current value, so defaults taken from an example
    /// model or from the filename survive an empty form.
    pub fn apply_form(&mut self, form: &MetadataForm) {
        if form.is_empty() {
            return;
        }

        overlay(&mut self.name, &form.name);
        overlay(&mut self.description, &normalize_newlines(&form.description));
        overlay(&mut self.author, &form.author);
        overlay(&mut self.reference, &form.reference);
        overlay(&mut self.tags, &join_keywords(form.keywords.split(',')));
        overlay(&mut self.domains, &form.domain);
        overlay(&mut self.year, &form.year);
    }
}

fn overlay(target: &mut String, value: &str) {
    let value = value.trim();

    if !value.is_empty() {
        *target = value.to_string();
    }
}

/// Collapse each line break (`\r\n`, `\n` or `\r`) into a single space
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

/// Join a keyword sequence into one `", "`-delimited string, dropping blanks
pub fn join_keywords<I, S>(keywords: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keywords
        .into_iter()
        .filter_map(|k| {
            let k = k.as_ref().trim();
            (!k.is_empty()).then(|| k.to_string())
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Free-text metadata fields submitted with the upload form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataForm {
    pub name: String,
    pub description: String,
    pub author: String,
    pub reference: String,
    /// Comma-separated keywords
    pub keywords: String,
    pub domain: String,
    pub year: String,
}

impl MetadataForm {
    pub fn is_empty(&self) -> bool {
        [
            &self.name,
            &self.description,
            &self.author,
            &self.reference,
            &self.keywords,
            &self.domain,
            &self.year,
        ]
        .iter()
        .all(|field| field.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_form_keeps_defaults() {
        let mut metadata = FmMetadata {
            name: "Pizzas".to_string(),
            author: "A".to_string(),
            ..FmMetadata::default()
        };

        metadata.apply_form(&MetadataForm::default());

        assert_eq!(metadata.name, "Pizzas");
        assert_eq!(metadata.author, "A");
    }

    #[test]
    fn test_blank_form_keeps_example_metadata() {
        let original = FmMetadata {
            name: "Car".to_string(),
            description: "Small product line".to_string(),
            tags: "car, automotive".to_string(),
            ..FmMetadata::default()
        };
        let form = MetadataForm {
            name: "  ".to_string(),
            keywords: "   ".to_string(),
            description: "\r\n".to_string(),
            ..MetadataForm::default()
        };
        assert!(form.is_empty());

        let mut metadata = original.clone();
        metadata.apply_form(&form);

        assert_eq!(metadata, original);
    }

    #[test]
    fn test_non_empty_form_overrides_defaults() {
        let mut metadata = FmMetadata {
            author: "A".to_string(),
            ..FmMetadata::default()
        };
        let form = MetadataForm {
            author: "B".to_string(),
            year: " 2024 ".to_string(),
            ..MetadataForm::default()
        };

        metadata.apply_form(&form);

        assert_eq!(metadata.author, "B");
        assert_eq!(metadata.year, "2024");
    }

    #[test]
    fn test_whitespace_only_field_is_empty() {
        let mut metadata = FmMetadata::named("Model");
        let form = MetadataForm {
            name: "   ".to_string(),
            ..MetadataForm::default()
        };

        metadata.apply_form(&form);
        assert_eq!(metadata.name, "Model");
    }

    #[test]
    fn test_description_newlines_normalized() {
        let mut metadata = FmMetadata::default();
        let form = MetadataForm {
            description: "first line\r\nsecond\nthird".to_string(),
            ..MetadataForm::default()
        };

        metadata.apply_form(&form);
        assert_eq!(metadata.description, "first line second third");
    }

    #[test]
    fn test_keywords_joined() {
        assert_eq!(join_keywords(["food", " pizza ", ""]), "food, pizza");

        let mut metadata = FmMetadata::default();
        let form = MetadataForm {
            keywords: "a,b ,  c".to_string(),
            ..MetadataForm::default()
        };
        metadata.apply_form(&form);
        assert_eq!(metadata.tags, "a, b, c");
    }

    #[test]
    fn test_form_is_empty() {
        assert!(MetadataForm::default().is_empty());
        assert!(!MetadataForm {
            domain: "Automotive".to_string(),
            ..MetadataForm::default()
        }
        .is_empty());
    }
}
