use super::*;
use std::fs;
use tempfile::TempDir;

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn config_file_persistence() {
        let temp_dir = TempDir::new().expect("should create TempDir successfully");
        let config_path = temp_dir.path().join("config.toml");

        let original_config = Config {
            embedding: EmbeddingConfig {
                base_url: "http://localhost:11434/v1/".to_string(),
                model: "nomic-embed-text".to_string(),
                dimension: 768,
                api_key_env: "OLLAMA_API_KEY".to_string(),
                timeout_seconds: 60,
                retry_attempts: 2,
            },
            ..Config::default()
        };

        let toml_content = toml::to_string_pretty(&original_config)
            .expect("config should convert to toml string successfully");
        fs::write(&config_path, toml_content).expect("should write to config_path successfully");

        let content =
            fs::read_to_string(&config_path).expect("should read from config_path successfully");
        let loaded_config: Config = toml::from_str(&content).expect("should parse toml correctly");

        assert_eq!(original_config, loaded_config);
    }

    #[test]
    fn config_dir_override() {
        let temp_dir = TempDir::new().expect("should create TempDir successfully");

        let dir = get_config_dir(Some(temp_dir.path())).expect("override should resolve");

        assert_eq!(dir, temp_dir.path());
    }

    #[test]
    fn invalid_toml_handling() {
        let invalid_toml = r#"
            [embedding
            model = "text-embedding-004"
            dimension = "invalid_dimension"
        "#;

        let result: Result<Config, toml::de::Error> = toml::from_str(invalid_toml);
        assert!(result.is_err());
    }

    #[test]
    fn wrong_value_type_is_rejected() {
        let invalid_toml = r#"
            [retrieval]
            top_k = "three"
        "#;

        let result: Result<Config, toml::de::Error> = toml::from_str(invalid_toml);
        assert!(result.is_err());
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let config: Config = toml::from_str("").expect("empty toml should parse");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn complete_valid_config() {
        let valid_toml = r#"
            [embedding]
            base_url = "https://api.openai.com/v1/"
            model = "text-embedding-3-small"
            dimension = 1536
            api_key_env = "OPENAI_API_KEY"
            timeout_seconds = 20
            retry_attempts = 5

            [chunking]
            chunk_size = 400
            overlap = 40

            [retrieval]
            top_k = 5
        "#;

        let config: Config = toml::from_str(valid_toml).expect("should parse toml successfully");
        assert!(config.validate().is_ok());
        assert_eq!(config.embedding.model, "text-embedding-3-small");
        assert_eq!(config.embedding.dimension, 1536);
        assert_eq!(config.embedding.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.embedding.timeout_seconds, 20);
        assert_eq!(config.embedding.retry_attempts, 5);
        assert_eq!(config.chunking.chunk_size, 400);
        assert_eq!(config.chunking.overlap, 40);
        assert_eq!(config.retrieval.top_k, 5);
    }

    #[test]
    fn dimension_boundary_validation() {
        let mut config = EmbeddingConfig::default();

        assert!(config.set_dimension(1).is_ok());
        assert!(config.set_dimension(8192).is_ok());
        assert!(config.set_dimension(0).is_err());
        assert!(config.set_dimension(8193).is_err());
    }

    #[test]
    fn base_url_variants() {
        let cases = vec![
            ("http://localhost:11434/v1", "http://localhost:11434/v1/"),
            ("http://127.0.0.1:8080/", "http://127.0.0.1:8080/"),
            (
                "https://generativelanguage.googleapis.com/v1beta/openai/",
                "https://generativelanguage.googleapis.com/v1beta/openai/",
            ),
        ];

        for (base_url, expected_url) in cases {
            let config = EmbeddingConfig {
                base_url: base_url.to_string(),
                ..EmbeddingConfig::default()
            };

            let url = config.base_url().expect("base_url is ok");
            assert_eq!(url.as_str(), expected_url);
        }
    }

    #[test]
    fn error_display_messages() {
        let errors = vec![
            ConfigError::InvalidProtocol("ftp".to_string()),
            ConfigError::InvalidEmbeddingDimension(0),
            ConfigError::InvalidTopK(0),
            ConfigError::InvalidModel(String::new()),
            ConfigError::InvalidUrl("invalid-url".to_string()),
        ];

        for error in errors {
            let message = format!("{error}");
            assert!(!message.is_empty());
            assert!(message.len() > 10);
        }
    }
}
