use dynamap_core::config::ConfigOverride;
use dynamap_schema::{EntityBuilder, config};

// Single test: the process layer is global to this test binary.
#[test]
fn process_layer_sits_between_defaults_and_entity_layer() {
    config::set_process_config_json(r#"{ "key_separator": "|", "sort_key_attr_name": "RK" }"#)
        .expect("valid json");

    let plain = EntityBuilder::new("app::User")
        .table("main")
        .partition_key_field("id")
        .build()
        .expect("builds");
    assert_eq!(plain.config.key_separator, "|");
    assert_eq!(plain.config.sort_key_attr_name, "RK");
    assert_eq!(plain.config.partition_key_attr_name, "pk");

    let custom = EntityBuilder::new("app::Order")
        .table("main")
        .partition_key_field("id")
        .config(ConfigOverride::default().key_separator("/"))
        .build()
        .expect("builds");
    assert_eq!(custom.config.key_separator, "/");
    assert_eq!(custom.config.sort_key_attr_name, "RK");

    config::clear_process_config();
    assert!(config::process_config().is_empty());

    // already-built types keep their resolved config
    assert_eq!(plain.config.key_separator, "|");
    let later = EntityBuilder::new("app::Later")
        .table("main")
        .partition_key_field("id")
        .build()
        .expect("builds");
    assert_eq!(later.config.key_separator, "#");

    assert!(config::set_process_config_json("{ not json").is_err());
}
