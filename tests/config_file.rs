use std::io::Write;

use neardup::{ConfigLoadError, DuplicateCache, EntryCodec, NeardupConfig};
use tempfile::NamedTempFile;

#[test]
fn cache_built_from_yaml_file() {
    let yaml = r#"
version: "1"
cache:
  num_seeds: 120
  num_bands: 12
  char_ngram: 6
  random_state: 17
  storage: "plain"
check:
  min_similarity: 0.7
log_level: "warn"
"#;
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();

    let config = NeardupConfig::from_file(file.path()).unwrap();
    assert_eq!(config.log_level, "warn");
    assert_eq!(config.cache_config().storage, EntryCodec::Plain);

    let cache = DuplicateCache::new(config.cache_config()).unwrap();
    assert_eq!(cache.hasher().num_seeds(), 120);
    assert_eq!(cache.hasher().char_ngram(), 6);

    let opts = config.check_options();
    assert!(!cache.is_duplicate_with("configured from a yaml file", &opts).unwrap());
    assert!(cache.is_duplicate_with("configured from a yaml file", &opts).unwrap());
    assert_eq!(cache.stats().index.rows_per_band, 10);
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = NeardupConfig::from_file(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, ConfigLoadError::FileRead(_)));
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"version: \"1\"\ncache: [not, a, map]\n").unwrap();
    let err = NeardupConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigLoadError::YamlParse(_)));
}

#[test]
fn reserved_width_fails_when_cache_is_built() {
    let config = NeardupConfig::from_yaml("version: \"1\"\ncache:\n  hashbytes: 16\n").unwrap();
    let err = DuplicateCache::new(config.cache_config()).unwrap_err();
    assert!(err.is_unsupported());
}
