//! Reading schema, instance and `--ref` documents from disk.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde_json::Value;

/// Read a JSON or YAML document. `.yaml` and `.yml` files are parsed as
/// YAML, everything else as JSON.
pub fn load_document(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse YAML in {}", path.display()))?,
        _ => serde_json::from_str(&content)
            .with_context(|| format!("failed to parse JSON in {}", path.display()))?,
    };
    tracing::debug!(path = %path.display(), "loaded document");
    Ok(value)
}

/// Parse a `--ref` argument of the form `<uri>=<file>`.
pub fn parse_ref(arg: &str) -> Result<(String, PathBuf)> {
    let Some((uri, file)) = arg.split_once('=') else {
        bail!("expected <uri>=<file>, got {arg:?}");
    };
    if uri.is_empty() || file.is_empty() {
        bail!("expected <uri>=<file>, got {arg:?}");
    }
    Ok((uri.to_string(), PathBuf::from(file)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn load_json_and_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("doc.json");
        let yaml_path = dir.path().join("doc.yaml");
        std::fs::write(&json_path, r#"{"a": [1, 2]}"#).unwrap();
        std::fs::write(&yaml_path, "a:\n  - 1\n  - 2\n").unwrap();

        assert_eq!(load_document(&json_path).unwrap(), json!({"a": [1, 2]}));
        assert_eq!(load_document(&yaml_path).unwrap(), json!({"a": [1, 2]}));
    }

    #[test]
    fn load_reports_path_on_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load_document(&path).unwrap_err();
        assert!(format!("{err}").contains("broken.json"));
    }

    #[test]
    fn load_missing_file_fails() {
        assert!(load_document(Path::new("/nonexistent/schema.json")).is_err());
    }

    #[test]
    fn parse_ref_splits_on_first_equals() {
        let (uri, file) = parse_ref("urn:defs=a=b.json").unwrap();
        assert_eq!(uri, "urn:defs");
        assert_eq!(file, PathBuf::from("a=b.json"));
        assert!(parse_ref("no-separator").is_err());
        assert!(parse_ref("=file.json").is_err());
    }
}
