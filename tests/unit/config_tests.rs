//! Synthesis settings and their effect on emitted identifiers.

use anyhow::Result;
use construct_synth::config::SynthConfig;
use construct_synth::core::SynthError;
use construct_synth::tree::Tree;

#[test]
fn test_full_toml() -> Result<()> {
    let config = SynthConfig::from_toml_str(
        r#"
max_token_depth = 32
hash_length = 12
max_human_length = 100
fingerprint_length = 16
"#,
    )?;
    assert_eq!(
        config,
        SynthConfig {
            max_token_depth: 32,
            hash_length: 12,
            max_human_length: 100,
            fingerprint_length: 16,
        }
    );
    Ok(())
}

#[test]
fn test_validation_errors_name_the_key() {
    let err = SynthConfig::from_toml_str("max_token_depth = 0").unwrap_err();
    assert!(err.to_string().contains("max_token_depth"), "{err}");
    assert!(!err.is_build_time());

    let err = SynthConfig::from_toml_str("hash_length = 65").unwrap_err();
    assert!(err.to_string().contains("hash_length"), "{err}");
}

#[test]
fn test_unknown_type_is_a_config_error() {
    assert!(matches!(
        SynthConfig::from_toml_str("hash_length = -1"),
        Err(SynthError::Config { .. })
    ));
}

#[test]
fn test_hash_length_shapes_logical_ids() -> Result<()> {
    let id_with = |config: SynthConfig| -> Result<String> {
        let mut tree = Tree::with_config(config);
        let stack = tree.add_stack("prod")?;
        let group = tree.add_construct(stack, "group")?;
        let queue = tree.add_resource(group, "Queue", "T")?;
        Ok(tree.freeze()?.logical_id(queue)?.to_string())
    };

    let short = id_with(SynthConfig::default())?;
    let long = id_with(SynthConfig::from_toml_str("hash_length = 16")?)?;
    assert_eq!(short.len(), "groupQueue".len() + 8);
    assert_eq!(long.len(), "groupQueue".len() + 16);
    assert!(long.starts_with(&short), "{short} / {long}");
    Ok(())
}

#[test]
fn test_human_prefix_is_bounded() -> Result<()> {
    let config = SynthConfig::from_toml_str("max_human_length = 5")?;
    let mut tree = Tree::with_config(config);
    let stack = tree.add_stack("prod")?;
    let group = tree.add_construct(stack, "averylongscope")?;
    let queue = tree.add_resource(group, "Queue", "T")?;

    let frozen = tree.freeze()?;
    let id = frozen.logical_id(queue)?;
    assert!(id.starts_with("avery"), "{id}");
    assert_eq!(id.len(), 5 + 8);
    Ok(())
}

#[test]
fn test_fingerprint_length_applies() -> Result<()> {
    let config = SynthConfig::from_toml_str("fingerprint_length = 10")?;
    let mut tree = Tree::with_config(config);
    let stack = tree.add_stack("prod")?;
    let version = tree.add_resource(stack, "Version", "T")?;
    tree.add_to_fingerprint(version, "code")?;

    let frozen = tree.freeze()?;
    assert_eq!(frozen.logical_id(version)?.len(), "Version".len() + 10);
    Ok(())
}
