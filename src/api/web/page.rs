//! Server-rendered upload page

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::domain::catalog::ExampleCatalog;
use crate::domain::characterization::CharacterizationResult;
use crate::domain::upload::file_stem;

use crate::api::types::upload::{FIELD_EXAMPLE, FIELD_MODEL, FIELD_ZIP};

/// What the page shows below the forms
#[derive(Debug, Clone, Default)]
pub enum PageOutcome {
    #[default]
    Empty,
    /// `fm_facts`: one characterization
    Facts(Box<CharacterizationResult>),
    /// `file_error`: message for the single model form
    FileError(String),
    /// `fm_dataset_facts`: aggregated dataset JSON and the archive name
    DatasetFacts { json: String, archive: String },
    /// `zip_file_error`: message for the dataset form
    ZipError(String),
}

/// Render the whole page
pub fn render_page(catalog: &ExampleCatalog, outcome: &PageOutcome) -> String {
    let mut page = String::with_capacity(8 * 1024);

    page.push_str(PAGE_HEAD);
    page.push_str(&model_form(catalog, outcome));
    page.push_str(&dataset_form(outcome));

    match outcome {
        PageOutcome::Facts(result) => page.push_str(&facts_section(result)),
        PageOutcome::DatasetFacts { json, archive } => {
            page.push_str(&dataset_section(json, archive))
        }
        PageOutcome::Empty | PageOutcome::FileError(_) | PageOutcome::ZipError(_) => {}
    }

    page.push_str(PAGE_TAIL);
    page
}

fn model_form(catalog: &ExampleCatalog, outcome: &PageOutcome) -> String {
    let options: String = catalog
        .iter()
        .map(|example| {
            format!(
                r#"<option value="{name}" title="{description}">{name}</option>"#,
                name = escape_html(&example.name),
                description = escape_html(&example.description),
            )
        })
        .collect::<Vec<_>>()
        .join("\n          ");

    let error = match outcome {
        PageOutcome::FileError(message) => error_block("file_error", message),
        _ => String::new(),
    };

    format!(
        r#"
    <section>
      <h2>Characterize a feature model</h2>
      <form method="post" action="/" enctype="multipart/form-data">
        <label>Feature model (.uvl, .xml) <input type="file" name="{model}" accept=".uvl,.xml"></label>
        <label>or an example
          <select name="{example}">
          <option value="">-- none --</option>
          {options}
          </select>
        </label>
        <label>Name <input type="text" name="inputName"></label>
        <label>Description <textarea name="inputDescription"></textarea></label>
        <label>Author <input type="text" name="inputAuthor"></label>
        <label>Reference <input type="text" name="inputReference"></label>
        <label>Keywords <input type="text" name="inputKeywords"></label>
        <label>Domain <input type="text" name="inputDomain"></label>
        <label>Year <input type="text" name="inputYear"></label>
        <button type="submit">Get FM Fact Label</button>
      </form>
      {error}
    </section>
"#,
        model = FIELD_MODEL,
        example = FIELD_EXAMPLE,
        options = options,
        error = error,
    )
}

fn dataset_form(outcome: &PageOutcome) -> String {
    let error = match outcome {
        PageOutcome::ZipError(message) => error_block("zip_file_error", message),
        _ => String::new(),
    };

    format!(
        r#"
    <section>
      <h2>Characterize a dataset</h2>
      <form method="post" action="/upload_zip" enctype="multipart/form-data">
        <label>ZIP archive of feature models <input type="file" name="{zip}" accept=".zip" required></label>
        <button type="submit">Get dataset facts</button>
      </form>
      {error}
    </section>
"#,
        zip = FIELD_ZIP,
        error = error,
    )
}

fn facts_section(result: &CharacterizationResult) -> String {
    let stem = result.download_stem();

    format!(
        r#"
    <section id="fm_facts_section">
      <h2>FM Fact Label: {name}</h2>
      <p>
        <a download="{stem}.json" href="{json_href}">Download JSON</a>
        <a download="{stem}.txt" href="{text_href}">Download text</a>
      </p>
      <pre class="label">{text}</pre>
      <script type="application/json" id="fm_facts">{json}</script>
    </section>
"#,
        name = escape_html(&result.metadata.name),
        stem = escape_html(&stem),
        json_href = data_uri("application/json", &result.json),
        text_href = data_uri("text/plain;charset=utf-8", &result.text),
        text = escape_html(&result.text),
        json = embed_json(&result.json),
    )
}

fn dataset_section(json: &str, archive: &str) -> String {
    let stem = format!("{}_fm_facts", file_stem(archive));

    format!(
        r#"
    <section id="fm_dataset_facts_section">
      <h2>Dataset facts: {archive}</h2>
      <p><a download="{stem}.json" href="{json_href}">Download JSON</a></p>
      <pre class="dataset">{pretty}</pre>
      <script type="application/json" id="fm_dataset_facts">{json}</script>
    </section>
"#,
        archive = escape_html(archive),
        stem = escape_html(&stem),
        json_href = data_uri("application/json", json),
        pretty = escape_html(json),
        json = embed_json(json),
    )
}

fn error_block(id: &str, message: &str) -> String {
    format!(
        r#"<p class="error" id="{}">{}</p>"#,
        id,
        escape_html(message)
    )
}

/// `data:` URI carrying `content` base64-encoded
pub fn data_uri(media_type: &str, content: &str) -> String {
    format!("data:{};base64,{}", media_type, STANDARD.encode(content))
}

/// Escape text for HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }

    escaped
}

/// JSON safe to place inside a `<script>` element
fn embed_json(json: &str) -> String {
    json.replace("</", "<\\/")
}

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>FM Fact Label</title>
  <style>
    body { font-family: Arial, sans-serif; margin: 40px; max-width: 960px; }
    form label { display: block; margin: 6px 0; }
    .error { color: #b00020; font-weight: bold; }
    pre { background: #f4f4f4; padding: 10px; border-radius: 5px; overflow-x: auto; }
  </style>
</head>
<body>
  <h1>FM Fact Label</h1>
  <main>
"#;

const PAGE_TAIL: &str = r#"
  </main>
</body>
</html>
"#;
