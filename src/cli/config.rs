//! Config command handlers

use crate::cli::ConfigInitArgs;
use std::fs;

const EXAMPLE_CONFIG: &str = include_str!("../../easel.example.toml");

/// Handle `easel config init` command
pub fn handle_config_init(args: &ConfigInitArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.output.exists() && !args.force {
        return Err(format!(
            "File already exists: {}. Use --force to overwrite.",
            args.output.display()
        )
        .into());
    }

    fs::write(&args.output, EXAMPLE_CONFIG)?;

    println!("✓ Configuration file created: {}", args.output.display());
    println!("  Set DOUBAO_API_KEY and DOUBAO_ENDPOINT_ID, then run `easel serve`.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EaselConfig;

    #[test]
    fn test_config_init_creates_loadable_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let output_path = temp_dir.path().join("easel.toml");

        handle_config_init(&ConfigInitArgs {
            output: output_path.clone(),
            force: false,
        })
        .unwrap();

        let config = EaselConfig::load(Some(&output_path)).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_init_no_overwrite() {
        let temp_dir = tempfile::tempdir().unwrap();
        let output_path = temp_dir.path().join("easel.toml");
        std::fs::write(&output_path, "existing").unwrap();

        let result = handle_config_init(&ConfigInitArgs {
            output: output_path.clone(),
            force: false,
        });
        assert!(result.is_err());
        assert_eq!(std::fs::read_to_string(&output_path).unwrap(), "existing");
    }

    #[test]
    fn test_config_init_force_overwrites() {
        let temp_dir = tempfile::tempdir().unwrap();
        let output_path = temp_dir.path().join("easel.toml");
        std::fs::write(&output_path, "old content").unwrap();

        handle_config_init(&ConfigInitArgs {
            output: output_path.clone(),
            force: true,
        })
        .unwrap();

        let content = std::fs::read_to_string(&output_path).unwrap();
        assert!(content.contains("[fallback]"));
    }
}
