use std::fs;
use std::path::{Path, PathBuf};

use crate::model::catalog::{Catalog, CatalogFile};

/// Error type for catalog loading
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("could not read catalog {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse catalog {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("catalog {0} has no taskType")]
    MissingType(PathBuf),
}

/// Read a catalog definition file.
pub fn read_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let text = fs::read_to_string(path).map_err(|e| CatalogError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let file: CatalogFile = serde_json::from_str(&text).map_err(|e| CatalogError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    if file.task_type.trim().is_empty() {
        return Err(CatalogError::MissingType(path.to_path_buf()));
    }
    log::debug!(
        "loaded catalog {} with {} tasks",
        file.task_type,
        file.tasks.len()
    );
    Ok(Catalog::from_file(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn reads_catalog_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        fs::write(
            &path,
            r#"{"taskType":"LEAGUE_5","name":"Raging Echoes","tasks":[
                {"id":10,"name":"Open the bank","tier":"Easy","points":10},
                {"id":20,"name":"Kill a goblin","completionPercent":91.5}
            ]}"#,
        )
        .unwrap();
        let catalog = read_catalog(&path).unwrap();
        assert_eq!(catalog.type_key, "LEAGUE_5");
        assert_eq!(catalog.name, "Raging Echoes");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.task(20).unwrap().def.completion_percent, Some(91.5));
    }

    #[test]
    fn missing_type_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        fs::write(&path, r#"{"taskType":"  ","tasks":[]}"#).unwrap();
        assert!(matches!(read_catalog(&path), Err(CatalogError::MissingType(_))));
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            read_catalog(&dir.path().join("nope.json")),
            Err(CatalogError::ReadError { .. })
        ));
    }
}
