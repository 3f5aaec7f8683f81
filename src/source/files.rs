use crate::error::{I18nError, I18nResult};
use crate::messages::MessageSet;
use crate::options::SUPPLEMENTAL_PREFIX;
use crate::source::MessageProvider;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Load messages from a single JSON file
///
/// The JSON file should have the following structure:
/// ```json
/// {
///     "@metadata": { ... },  // Ignored
///     "auth.failed": "These credentials do not match our records.",
///     "validation": { "required": "The :attribute field is required." }
/// }
/// ```
///
/// Nested objects and arrays are flattened into dot-separated keys.
///
/// # Errors
/// - File not found
/// - Invalid JSON
/// - Root is not an object
pub fn load_messages_from_file(path: &Path) -> I18nResult<MessageSet> {
    let content = fs::read_to_string(path)
        .map_err(|e| I18nError::Io(format!("Failed to read file '{}': {}", path.display(), e)))?;

    parse_file_content(path, &content)
}

fn parse_file_content(path: &Path, content: &str) -> I18nResult<MessageSet> {
    MessageSet::from_json_str(content).map_err(|e| {
        I18nError::Parse(format!(
            "Failed to parse messages from '{}': {}",
            path.display(),
            e
        ))
    })
}

/// Load all messages from a directory of JSON files
///
/// The filename (without extension) is used as the language tag:
/// `en.json` -> `"en"`, `pt_BR.json` -> `"pt_BR"`, `php_en.json` -> `"php_en"`.
pub fn load_all_messages_from_dir(dir: &Path) -> I18nResult<HashMap<String, MessageSet>> {
    if !dir.is_dir() {
        return Err(I18nError::Io(format!(
            "Not a directory: {}",
            dir.display()
        )));
    }

    let mut all_messages = HashMap::new();
    for path in json_files(dir)? {
        let tag = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| I18nError::Io(format!("Invalid filename: {}", path.display())))?
            .to_string();

        all_messages.insert(tag, load_messages_from_file(&path)?);
    }

    if all_messages.is_empty() {
        warn!(dir = %dir.display(), "no JSON files found");
    }

    Ok(all_messages)
}

fn json_files(dir: &Path) -> I18nResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| {
        I18nError::Io(format!(
            "Failed to read directory '{}': {}",
            dir.display(),
            e
        ))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Whether `dir` holds supplemental (`php_*.json`) message files.
pub fn has_supplemental_files(dir: &Path) -> bool {
    json_files(dir)
        .map(|files| {
            files.iter().any(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with(SUPPLEMENTAL_PREFIX))
            })
        })
        .unwrap_or(false)
}

/// Reads `<dir>/<tag>.json` for each requested language.
///
/// A missing file is an unknown language and yields no messages.
#[derive(Debug, Clone)]
pub struct JsonDirProvider {
    dir: PathBuf,
}

impl JsonDirProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonDirProvider { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, tag: &str) -> I18nResult<PathBuf> {
        if tag.is_empty() || tag.contains(|c: char| c == '/' || c == '\\') || tag.contains("..") {
            return Err(I18nError::Config(format!("Invalid language tag: {:?}", tag)));
        }
        Ok(self.dir.join(format!("{}.json", tag)))
    }
}

#[async_trait]
impl MessageProvider for JsonDirProvider {
    async fn fetch(&self, tag: &str) -> I18nResult<MessageSet> {
        let path = self.path_for(tag)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => parse_file_content(&path, &content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no message file");
                Ok(MessageSet::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn fetch_blocking(&self, tag: &str) -> Option<I18nResult<MessageSet>> {
        let path = match self.path_for(tag) {
            Ok(path) => path,
            Err(e) => return Some(Err(e)),
        };
        if !path.exists() {
            debug!(path = %path.display(), "no message file");
            return Some(Ok(MessageSet::new()));
        }
        Some(load_messages_from_file(&path))
    }

    fn provider_name(&self) -> &str {
        "JSON Directory"
    }
}
