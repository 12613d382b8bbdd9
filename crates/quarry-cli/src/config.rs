use std::path::Path;

use quarry_config::config::{generate_default_config, Config};

use crate::{cli::ConfigAction, error::CliResult};

pub fn run_config(action: Option<ConfigAction>, path: &Path, config: &Config) -> CliResult<()> {
    match action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => {
            let document = config.to_annotated_document()?;
            print!("{document}");
        }
        ConfigAction::Init => {
            generate_default_config(path)?;
        }
        ConfigAction::Path => {
            println!("{}", path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_init_writes_annotated_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("quarry").join("config.toml");
        let config = Config::default_config();

        run_config(Some(ConfigAction::Init), &path, &config).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("per_page = 15"));
        assert_eq!(Config::load(&path).unwrap(), config);

        assert!(run_config(Some(ConfigAction::Init), &path, &config).is_err());
    }
}
