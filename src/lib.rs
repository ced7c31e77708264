//! Fill Docker Template - placeholder substitution for Dockerfile templates
//!
//! This library reads a Dockerfile template, replaces `@@NAME` placeholders
//! with text blocks from a [`SubstitutionTable`], and writes the result to a
//! file named `Dockerfile` next to the template.
//!
//! # Example
//!
//! ```rust
//! use fill_docker_template::{fill_str, SubstitutionTable};
//!
//! let table = SubstitutionTable::chapel_apt();
//! let dockerfile = fill_str("FROM ubuntu:22.04\n@@INSTALL", &table).unwrap();
//! assert!(dockerfile.contains("RUN make install"));
//! ```

pub mod error;
pub mod table;
pub mod template;

pub use error::TemplateError;
pub use table::{SubstitutionTable, TableError};
pub use template::Template;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Name of the file written next to the template
pub const OUTPUT_FILE_NAME: &str = "Dockerfile";

/// Errors that can occur while filling a template
#[derive(Debug, Error)]
pub enum FillError {
    /// Template file missing, unreadable or not UTF-8
    #[error("failed to read template '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Undefined or malformed placeholders
    #[error("template errors: {}", format_template_errors(.0))]
    Template(Vec<TemplateError>),

    /// Output location not writable
    #[error("failed to write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Substitution table could not be loaded
    #[error("substitution table error: {0}")]
    Table(#[from] TableError),

    /// `~` was used but no home directory is known
    #[error("cannot expand '~': home directory is unknown")]
    HomeDirectory,

    /// Current directory needed to absolutize a relative path
    #[error("cannot resolve relative path: {0}")]
    CurrentDirectory(std::io::Error),
}

impl From<Vec<TemplateError>> for FillError {
    fn from(errors: Vec<TemplateError>) -> Self {
        FillError::Template(errors)
    }
}

fn format_template_errors(errors: &[TemplateError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Substitute placeholders in template text
///
/// ```rust
/// use fill_docker_template::{fill_str, SubstitutionTable};
///
/// let table = SubstitutionTable::from_entries([("GREETING", "hello")]).unwrap();
/// assert_eq!(fill_str("@@GREETING, @@{GREETING}!", &table).unwrap(), "hello, hello!");
/// assert!(fill_str("@@MISSING", &table).is_err());
/// ```
pub fn fill_str(source: &str, table: &SubstitutionTable) -> Result<String, FillError> {
    let template = Template::new(source);
    Ok(template.substitute(table)?)
}

/// Path of the generated Dockerfile for a template
///
/// The output always lands in the template's own directory.
pub fn output_path(template_path: &Path) -> PathBuf {
    match template_path.parent() {
        Some(dir) => dir.join(OUTPUT_FILE_NAME),
        None => PathBuf::from(OUTPUT_FILE_NAME),
    }
}

/// Read a template, substitute it, and write `Dockerfile` next to it
///
/// Returns the path written. Nothing is written when substitution fails.
pub fn fill(template_path: &Path, table: &SubstitutionTable) -> Result<PathBuf, FillError> {
    let source = read_template(template_path)?;
    let result = fill_str(&source, table)?;
    write_dockerfile(template_path, &result)
}

/// Write filled text to the `Dockerfile` beside `template_path`
pub fn write_dockerfile(template_path: &Path, contents: &str) -> Result<PathBuf, FillError> {
    let output = output_path(template_path);
    std::fs::write(&output, contents.as_bytes()).map_err(|source| FillError::Write {
        path: output.clone(),
        source,
    })?;
    debug!(path = %output.display(), bytes = contents.len(), "wrote dockerfile");
    Ok(output)
}

/// Validate a template against a table without writing anything
///
/// Returns the placeholder names the template references, in order of first
/// appearance.
pub fn check(template_path: &Path, table: &SubstitutionTable) -> Result<Vec<String>, FillError> {
    let source = read_template(template_path)?;
    check_str(&source, table)
}

/// In-memory form of [`check`]
pub fn check_str(source: &str, table: &SubstitutionTable) -> Result<Vec<String>, FillError> {
    let template = Template::new(source);
    let names: Vec<String> = template
        .identifiers()
        .into_iter()
        .map(str::to_string)
        .collect();
    debug!(
        placeholders = names.len(),
        well_formed = template.is_valid(),
        "checked template"
    );
    template.substitute(table)?;
    Ok(names)
}

/// Read template text from disk
pub fn read_template(path: &Path) -> Result<String, FillError> {
    let source = std::fs::read_to_string(path).map_err(|source| FillError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = source.len(), "read template");
    Ok(source)
}

/// Expand a leading `~` and make the path absolute
pub fn resolve_template_path(raw: &Path) -> Result<PathBuf, FillError> {
    let expanded = expand_home(raw)?;
    if expanded.is_absolute() {
        return Ok(expanded);
    }
    let cwd = std::env::current_dir().map_err(FillError::CurrentDirectory)?;
    Ok(cwd.join(expanded))
}

fn expand_home(raw: &Path) -> Result<PathBuf, FillError> {
    let mut components = raw.components();
    match components.next() {
        Some(std::path::Component::Normal(first)) if first == "~" => {
            let home = dirs::home_dir().ok_or(FillError::HomeDirectory)?;
            Ok(home.join(components.as_path()))
        }
        _ => Ok(raw.to_path_buf()),
    }
}
