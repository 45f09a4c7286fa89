//! Configuration loading and validation

mod schema;

pub use schema::*;

use anyhow::Result;
use std::path::Path;

/// Load configuration from a YAML file
pub fn load_config(path: &Path) -> Result<ChimeConfig> {
    let contents = std::fs::read_to_string(path)?;
    let config: ChimeConfig = serde_yaml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_minimal_config() {
        let yaml = r#"
dataset:
  path: cars.csv
  label_column: Model
  value_column: Time
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.audio.sample_rate, 44100);
        assert_eq!(config.dataset.label_column, "Model");
    }

    #[test]
    fn test_load_rejects_invalid_config() {
        let yaml = r#"
playback:
  note_low: 90
  note_high: 60

dataset:
  path: cars.csv
  label_column: Model
  value_column: Time
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        assert!(load_config(file.path()).is_err());
    }
}
