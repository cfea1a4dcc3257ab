use dataki::config::Config;

#[test]
fn test_config_validation_rejects_non_http_url() {
    let config = Config {
        api_key: Some("test-key".to_string()),
        model: "gemini-2.0-flash".to_string(),
        api_url: "ftp://api.dataki.ai/v1/chat".to_string(),
    };

    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_requires_key_for_remote_endpoint() {
    let config = Config {
        api_key: None,
        model: "gemini-2.0-flash".to_string(),
        api_url: "https://api.dataki.ai/v1/chat".to_string(),
    };

    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_allows_local_endpoint_without_api_key() {
    let config = Config {
        api_key: None,
        model: "local-model".to_string(),
        api_url: "http://localhost:8000/v1/chat".to_string(),
    };

    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation_rejects_blank_model() {
    let config = Config {
        api_key: Some("test-key".to_string()),
        model: "  ".to_string(),
        api_url: "https://api.dataki.ai/v1/chat".to_string(),
    };

    assert!(config.validate().is_err());
}
