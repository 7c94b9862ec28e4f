use crate::aggregator::ResultDocument;
use crate::error::AggregateError;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes `document` to `<folder>/<file_name>` as 2-space indented JSON.
///
/// The folder is created when missing. Content goes to a sibling temp file
/// first and is renamed into place, so a failed write never leaves a partial
/// result behind and an earlier result is only replaced on success.
pub fn write_results(
    folder: &Path,
    file_name: &str,
    document: &ResultDocument,
) -> Result<PathBuf, AggregateError> {
    let bytes = serde_json::to_vec_pretty(document)?;

    fs::create_dir_all(folder).map_err(|e| AggregateError::io(folder, e))?;
    let target = folder.join(file_name);
    let staging = folder.join(format!(".{}.tmp", file_name));

    if let Err(e) = write_file(&staging, &bytes) {
        let _ = fs::remove_file(&staging);
        return Err(AggregateError::io(&staging, e));
    }
    if let Err(e) = fs::rename(&staging, &target) {
        let _ = fs::remove_file(&staging);
        return Err(AggregateError::io(&target, e));
    }

    log::debug!("Wrote {} bytes to {}", bytes.len(), target.display());
    Ok(target)
}

fn write_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(bytes)?;
    writer.flush()?;
    writer.get_ref().sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{FilterSelection, aggregate_listings};
    use anyhow::Result;
    use serde_json::{Value, json};

    fn sample_document() -> ResultDocument {
        let listings = json!([
            {"info": {"price": 100, "roomsNo": 2}},
            {"info": {"price": 50, "roomsNo": 3}}
        ]);
        aggregate_listings(
            listings.as_array().unwrap(),
            &FilterSelection::new("roomsNo", Vec::<String>::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_creates_nested_folder_and_writes_pretty_json() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let folder = dir.path().join("data").join("outputs");

        let path = write_results(&folder, "results.json", &sample_document())?;
        assert_eq!(path, folder.join("results.json"));

        let text = fs::read_to_string(&path)?;
        assert!(text.starts_with("{\n  \"2\": {\n    \"totalPrice\": 100,"));
        let parsed: Value = serde_json::from_str(&text)?;
        assert_eq!(parsed["3"]["averagePrice"], json!(50.0));
        assert!(!folder.join(".results.json.tmp").exists());
        Ok(())
    }

    #[test]
    fn test_overwrites_previous_results() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let target = dir.path().join("results.json");
        fs::write(&target, "{\"stale\": true, \"padding\": \"xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx\"}")?;

        write_results(dir.path(), "results.json", &ResultDocument::default())?;
        assert_eq!(fs::read_to_string(&target)?, "{}");
        Ok(())
    }

    #[test]
    fn test_folder_blocked_by_file_is_io_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let blocker = dir.path().join("outputs");
        fs::write(&blocker, "not a directory")?;

        let err = write_results(&blocker, "results.json", &sample_document()).unwrap_err();
        assert!(matches!(err, AggregateError::Io { .. }));
        Ok(())
    }
}
