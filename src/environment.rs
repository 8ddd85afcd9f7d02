//! Process-wide setup.
//!
//! Layout models and OCR engines are heavy; checking for them once per
//! process is enough. [`initialize`] guards an arbitrary setup routine with a
//! single flag, and [`check_dependencies`] is the routine [`crate::init`]
//! runs.

use std::sync::Mutex;

use crate::config::DetectionConfig;
use crate::error::{Error, Result};

static INITIALIZED: Mutex<bool> = Mutex::new(false);

/// Run `setup` unless a previous call already succeeded.
///
/// The flag is checked and set while the lock is held, so concurrent callers
/// never run `setup` twice. A failing `setup` leaves the flag clear and the
/// next call retries. Returns `true` if `setup` ran and succeeded now.
pub fn initialize<F>(setup: F) -> Result<bool>
where
    F: FnOnce() -> Result<()>,
{
    let mut initialized = INITIALIZED
        .lock()
        .map_err(|_| Error::Other("initialization lock poisoned".to_string()))?;
    if *initialized {
        return Ok(false);
    }
    setup()?;
    *initialized = true;
    log::debug!("docviz environment initialized");
    Ok(true)
}

/// Whether a previous [`initialize`] call succeeded.
pub fn is_initialized() -> bool {
    INITIALIZED.lock().map(|flag| *flag).unwrap_or(false)
}

/// Verify that the artifacts `config` needs are present.
pub fn check_dependencies(config: &DetectionConfig) -> Result<()> {
    if !config.model_path.is_file() {
        log::warn!("Layout model not found at {}", config.model_path.display());
        return Err(Error::ModelUnavailable(config.model_path.clone()));
    }
    log::debug!(
        "Using {:?} layout model {} on {}",
        config.backend,
        config.model_path.display(),
        config.device
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_check_dependencies_missing_model() {
        let config = DetectionConfig::new().with_model_path("/nonexistent/model.pt");
        let err = check_dependencies(&config).unwrap_err();
        assert!(matches!(err, Error::ModelUnavailable(_)));
    }

    #[test]
    fn test_check_dependencies_present_model() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"weights").unwrap();
        let config = DetectionConfig::new().with_model_path(file.path());
        assert!(check_dependencies(&config).is_ok());
    }

    // Touches the process-wide flag, so all assertions live in one test.
    #[test]
    fn test_initialize_runs_once_and_retries_after_failure() {
        let mut calls = 0;
        let first = initialize(|| {
            calls += 1;
            Err(Error::Other("not yet".to_string()))
        });
        assert!(first.is_err());

        let second = initialize(|| {
            calls += 1;
            Ok(())
        })
        .unwrap();
        let third = initialize(|| {
            calls += 1;
            Ok(())
        })
        .unwrap();

        assert!(second);
        assert!(!third);
        assert_eq!(calls, 2);
        assert!(is_initialized());
    }
}
