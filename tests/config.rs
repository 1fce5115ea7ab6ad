use ferrous_autowire::{
    Canonicalization, Container, ContainerConfig, DiError, Key, TypeCatalog,
    DEFAULT_REFLECTION_CACHE_CAPACITY,
};
use serial_test::serial;
use std::env;
use std::sync::Arc;

const PREFIX: &str = "AUTOWIRE_CONFIG_TEST";

fn clear_env() {
    for name in ["REFLECTION_CACHE_CAPACITY", "MAX_DEPTH", "CANONICALIZATION"] {
        env::remove_var(format!("{PREFIX}_{name}"));
    }
}

#[test]
#[serial]
fn unset_environment_gives_defaults() {
    clear_env();
    let config = ContainerConfig::from_env_with_prefix(PREFIX).unwrap();
    assert_eq!(config, ContainerConfig::default());
    assert_eq!(config.reflection_cache_capacity, DEFAULT_REFLECTION_CACHE_CAPACITY);
}

#[test]
#[serial]
fn environment_overrides_each_setting() {
    clear_env();
    env::set_var(format!("{PREFIX}_REFLECTION_CACHE_CAPACITY"), "3");
    env::set_var(format!("{PREFIX}_MAX_DEPTH"), " 12 ");
    env::set_var(format!("{PREFIX}_CANONICALIZATION"), "aliases_then_mappings");

    let config = ContainerConfig::from_env_with_prefix(PREFIX).unwrap();
    clear_env();

    assert_eq!(config.reflection_cache_capacity, 3);
    assert_eq!(config.max_depth, 12);
    assert_eq!(config.canonicalization, Canonicalization::AliasesThenMappings);
}

#[test]
#[serial]
fn invalid_environment_value_is_rejected() {
    clear_env();
    env::set_var(format!("{PREFIX}_MAX_DEPTH"), "0");
    let result = ContainerConfig::from_env_with_prefix(PREFIX);
    clear_env();

    assert!(matches!(result, Err(DiError::InvalidConfig(_))));
}

#[test]
#[serial]
fn loaded_config_drives_the_container() {
    clear_env();
    env::set_var(format!("{PREFIX}_REFLECTION_CACHE_CAPACITY"), "1");
    let config = ContainerConfig::from_env_with_prefix(PREFIX).unwrap();
    clear_env();

    let catalog = TypeCatalog::new();
    catalog.register_as::<u8>("one").construct_with(|| 1);
    catalog.register_as::<u8>("two").construct_with(|| 2);
    let container = Container::with_config(Arc::new(catalog), config).unwrap();

    container.resolve(&Key::new("one")).unwrap();
    container.resolve(&Key::new("two")).unwrap();
    assert_eq!(container.cached_descriptors(), 1);
    assert!(container.is_descriptor_cached(&Key::new("two")));
}

#[test]
fn container_rejects_zero_depth() {
    let result = Container::with_config(
        Arc::new(TypeCatalog::new()),
        ContainerConfig::default().with_max_depth(0),
    );
    assert!(matches!(result, Err(DiError::InvalidConfig(_))));
}

#[cfg(feature = "config")]
#[test]
fn json_config_round_trips_through_serde() {
    let config = ContainerConfig::default()
        .with_max_depth(32)
        .with_canonicalization(Canonicalization::AliasesThenMappings);
    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains("\"aliases_then_mappings\""));
    assert_eq!(ContainerConfig::from_json_str(&json).unwrap(), config);

    assert!(ContainerConfig::from_json_str("{ \"max_depth\": 0 }").is_err());
    assert!(ContainerConfig::from_json_str("not json").is_err());
}
