use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::core::error::StorageError;
use crate::core::models::ledger::DailyLedger;

/// Read a day file. `Ok(None)` when it does not exist; unparsable content is an
/// error and the file is left untouched.
pub fn load(path: &Path) -> Result<Option<DailyLedger>, StorageError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StorageError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let mut ledger: DailyLedger =
        serde_json::from_str(&content).map_err(|source| StorageError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;

    if let Some(stored) = ledger.reconcile() {
        tracing::warn!(
            path = %path.display(),
            stored,
            recomputed = ledger.daily_total,
            "daily_total did not match entry sum"
        );
    }

    Ok(Some(ledger))
}

/// Replace the day file with `ledger`, pretty-printed. Goes through a temp file
/// in the same directory so readers never see a partial write.
pub fn save(path: &Path, ledger: &DailyLedger) -> Result<(), StorageError> {
    let json = serde_json::to_vec_pretty(ledger).map_err(StorageError::Serialize)?;

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let write_err = |source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(&json).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::entry::{Metadata, UsageEntry};
    use chrono::{Local, SubsecRound};
    use tempfile::TempDir;

    fn sample() -> DailyLedger {
        let mut metadata = Metadata::new();
        metadata.insert("model".into(), "flux-dev".into());
        metadata.insert("prompt_length".into(), 42.into());
        let mut ledger = DailyLedger::empty();
        ledger.push(UsageEntry {
            timestamp: Local::now().trunc_subsecs(6),
            service: "fal.ai (Images)".into(),
            operation: "image_generation".into(),
            cost_usd: 0.003,
            metadata,
        });
        ledger
    }

    #[test]
    fn load_missing_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(load(&dir.path().join("2025-01-01.json")).unwrap().is_none());
    }

    #[test]
    fn save_then_load_is_identical() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("2025-01-01.json");
        let ledger = sample();
        save(&path, &ledger).unwrap();
        assert_eq!(load(&path).unwrap().unwrap(), ledger);
    }

    #[test]
    fn saved_file_is_pretty_printed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("2025-01-01.json");
        save(&path, &sample()).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("{\n  \"entries\": ["));
        assert!(raw.contains("\n  \"daily_total\": 0.003"));
        // No temp files left behind.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn corrupt_file_is_an_error_and_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("2025-01-01.json");
        std::fs::write(&path, "{\"entries\": [").unwrap();
        let err = load(&path).unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"entries\": [");
    }

    #[test]
    fn drifted_total_is_recomputed_on_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("2025-01-01.json");
        std::fs::write(
            &path,
            r#"{"entries":[{"timestamp":"2025-01-01T08:00:00","service":"Suno","operation":"music_generation","cost_usd":0.25,"metadata":{}}],"daily_total":7.0}"#,
        )
        .unwrap();
        let ledger = load(&path).unwrap().unwrap();
        assert_eq!(ledger.daily_total, 0.25);
    }
}
