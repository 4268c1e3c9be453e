//! Common routines for reading and describing input files.
use anyhow::{Context, Result};
use documented::DocumentedFields;
use serde::Serialize;
use serde::de::{Deserialize, DeserializeOwned, Deserializer};
use std::fmt::Write;
use std::fs;
use std::path::Path;

/// Read a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// The deserialised TOML data or an error if the file is invalid or doesn't exist.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Format an error message to include the file path. To be used with `anyhow::Context`.
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().to_string_lossy())
}

/// Deserialise a proportion, checking that it lies in the range [0, 1].
pub fn deserialise_proportion<'de, D>(deserialiser: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value: f64 = Deserialize::deserialize(deserialiser)?;
    if !(0.0..=1.0).contains(&value) {
        Err(serde::de::Error::custom("Value must be between 0 and 1"))?;
    }

    Ok(value)
}

/// Render a TOML template for `value`, with every parameter commented out.
///
/// Each field's doc comment is included above it, so the generated file doubles
/// as reference documentation. Uncommenting a line overrides that parameter.
pub fn to_commented_toml<T>(value: &T, header: &str) -> Result<String>
where
    T: Serialize + DocumentedFields,
{
    let toml_str = toml::to_string(value).context("Could not serialise default values")?;
    let mut contents = header.to_string();
    for line in toml_str.lines() {
        let (field, _) = line
            .split_once('=')
            .context("Unexpected line in serialised TOML")?;
        let docs = T::get_field_docs(field.trim())
            .with_context(|| format!("Missing doc comment for field {}", field.trim()))?;
        contents.push('\n');
        for doc_line in docs.lines() {
            writeln!(contents, "# # {}", doc_line.trim())?;
        }
        writeln!(contents, "# {line}")?;
    }

    Ok(contents)
}
