//! Shared test fixtures

use std::io::{Cursor, Write};

use zip::write::FileOptions;
use zip::ZipWriter;

pub const PIZZA_UVL: &str = include_str!("../resources/models/pizzas.uvl");
pub const CAR_XML: &str = include_str!("../resources/models/car.xml");
pub const SMART_HOME_UVL: &str = include_str!("../resources/models/smart_home.uvl");

/// Build a ZIP archive in memory; names ending in `/` become directory entries
pub fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default();

    for (name, content) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
    }

    writer.finish().unwrap().into_inner()
}

/// Names of the entries currently in `dir`
pub fn dir_entries(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
