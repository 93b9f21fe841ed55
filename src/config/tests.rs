use super::*;
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn config_file_persistence() {
        let temp_dir = TempDir::new().expect("should create TempDir successfully");
        let config_path = temp_dir.path().join("config.toml");

        let mut original_config = Config::default();
        original_config.checks.min_rust_version = "1.88.0".to_string();
        original_config.checks.required_env_vars = vec!["DATABASE_URL".to_string()];

        let toml_content = toml::to_string_pretty(&original_config)
            .expect("config should convert to toml string successfully");
        fs::write(&config_path, toml_content).expect("should write to config_path successfully");

        let content =
            fs::read_to_string(&config_path).expect("should read from config_path successfully");
        let loaded_config: Config = toml::from_str(&content).expect("should parse toml correctly");

        assert_eq!(original_config, loaded_config);
    }

    #[test]
    fn invalid_toml_handling() {
        let invalid_toml = r#"
            [server
            name = "unified-stack"
        "#;

        let result: Result<Config, toml::de::Error> = toml::from_str(invalid_toml);
        assert!(result.is_err());
    }

    #[test]
    fn partial_config_with_defaults() {
        let partial_toml = r#"
            [checks]
            env_file = ".env"
        "#;

        let config: Config = toml::from_str(partial_toml).expect("partial config parses");
        assert_eq!(config.checks.env_file, std::path::PathBuf::from(".env"));
        assert_eq!(config.checks.config_file, CheckConfig::default().config_file);
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn invalid_values_fail_load() {
        let temp_dir = TempDir::new().expect("should create TempDir successfully");
        let config_path = temp_dir.path().join("config.toml");
        fs::write(
            &config_path,
            r#"
            [checks]
            min_rust_version = "latest"
            "#,
        )
        .expect("should write config");

        assert!(Config::load_from(&config_path).is_err());
    }

    #[test]
    #[serial]
    fn config_dir_is_under_home() {
        if let Ok(dir) = get_config_dir() {
            assert!(dir.ends_with(".unified-stack-mcp") || dir.ends_with("unified-stack-mcp"));
        }
    }

    #[test]
    #[serial]
    fn config_file_lives_in_config_dir() {
        if let (Ok(dir), Ok(file)) = (get_config_dir(), Config::config_file_path()) {
            assert_eq!(file, dir.join("config.toml"));
        }
    }
}
