//! Load a run configuration from TOML.
//!
//! Every section is optional; missing fields take their defaults and unknown
//! fields are rejected.

use std::fs;
use std::path::Path;

use crate::domain::RunConfig;
use crate::error::{AppError, EXIT_INPUT};

pub fn load_run_config(path: &Path) -> Result<RunConfig, AppError> {
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to read config '{}': {e}", path.display())))?;
    parse_run_config(&text)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Invalid config '{}': {e}", path.display())))
}

pub fn parse_run_config(text: &str) -> Result<RunConfig, toml::de::Error> {
    toml::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DataKind;

    #[test]
    fn loads_from_disk() {
        let path = std::env::temp_dir().join(format!("fes-config-{}.toml", std::process::id()));
        fs::write(
            &path,
            "seed = 3\n[data]\nkind = \"grouped\"\nnum_groups = 3\n[evaluation]\nn_repeats = 2\n",
        )
        .unwrap();

        let cfg = load_run_config(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(cfg.seed, Some(3));
        assert_eq!(cfg.data.kind, DataKind::Grouped);
        assert_eq!(cfg.data.num_groups, Some(3));
        assert_eq!(cfg.evaluation.n_repeats, 2);
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let err = load_run_config(Path::new("/nonexistent/fes.toml")).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_INPUT);
    }

    #[test]
    fn empty_text_is_all_defaults() {
        assert_eq!(parse_run_config("").unwrap(), RunConfig::default());
    }
}
