//! Exports, imports and plain outputs.

use anyhow::Result;
use construct_synth::core::SynthError;
use construct_synth::token::{Token, Value};
use construct_synth::tree::Tree;
use serde_json::json;

#[test]
fn test_export_then_import_across_stacks() -> Result<()> {
    let mut tree = Tree::new();
    let producer = tree.add_stack("producer")?;
    let consumer = tree.add_stack("consumer")?;
    let api = tree.add_resource(producer, "Api", "AWS::ApiGateway::RestApi")?;

    let record = tree.export(api)?;
    let user = tree.add_resource(consumer, "User", "T")?;
    tree.set_property(user, "ApiId", record.import_value())?;

    let frozen = tree.freeze()?;
    let producer_doc = serde_json::to_value(frozen.synthesize(producer)?)?;
    assert_eq!(
        producer_doc["Outputs"][record.name()],
        json!({"Value": {"Ref": "Api"}, "Export": {"Name": record.name()}})
    );

    let consumer_doc = serde_json::to_value(frozen.synthesize(consumer)?)?;
    assert_eq!(
        consumer_doc["Resources"]["User"]["Properties"]["ApiId"],
        json!({"Fn::ImportValue": record.name()})
    );
    Ok(())
}

#[test]
fn test_export_names_are_stable_and_distinct() -> Result<()> {
    let name = |stack_name: &str| -> Result<String> {
        let mut tree = Tree::new();
        let stack = tree.add_stack(stack_name)?;
        let api = tree.add_resource(stack, "Api", "T")?;
        Ok(tree.export(api)?.name().to_string())
    };
    assert_eq!(name("one")?, name("one")?);
    assert_ne!(name("one")?, name("two")?);
    assert!(name("one")?.starts_with("oneApiRef"));
    Ok(())
}

#[test]
fn test_export_value_with_segment() -> Result<()> {
    let mut tree = Tree::new();
    let stack = tree.add_stack("shared")?;
    let api = tree.add_resource(stack, "Api", "T")?;

    let root = tree.export_value(api, "RootResourceId", Token::get_att(api, "RootResourceId"))?;
    let id = tree.export(api)?;
    assert_ne!(root.name(), id.name());
    assert!(root.name().starts_with("sharedApiRootResourceId"));

    let names: Vec<_> = tree.outputs_of(stack).map(|(n, _)| n.to_string()).collect();
    assert_eq!(names, vec![root.name().to_string(), id.name().to_string()]);
    Ok(())
}

#[test]
fn test_repeated_export_is_idempotent() -> Result<()> {
    let mut tree = Tree::new();
    let stack = tree.add_stack("shared")?;
    let api = tree.add_resource(stack, "Api", "T")?;

    let first = tree.export_value(api, "Url", "https://example.com")?;
    let second = tree.export_value(api, "Url", "https://example.com")?;
    assert_eq!(first, second);
    assert_eq!(tree.outputs_of(stack).count(), 1);

    let err = tree.export_value(api, "Url", "https://other.example.com").unwrap_err();
    assert_eq!(
        err,
        SynthError::ExportConflict {
            name: first.name().to_string()
        }
    );
    Ok(())
}

#[test]
fn test_import_stand_in_reused() -> Result<()> {
    let mut tree = Tree::new();
    let stack = tree.add_stack("consumer")?;
    let first = tree.import(stack, "SharedApiId")?;
    let second = tree.import(stack, "SharedApiId")?;
    assert_eq!(first, second);
    assert_eq!(tree.path(first)?.to_string(), "/consumer/SharedApiId");
    Ok(())
}

#[test]
fn test_import_of_name_outside_local_id_alphabet() -> Result<()> {
    let mut tree = Tree::new();
    let stack = tree.add_stack("consumer")?;
    let first = tree.import(stack, "producer:ExportsOutputRefApi1234")?;
    let second = tree.import(stack, "producer:ExportsOutputRefApi1234")?;
    let other = tree.import(stack, "producer;ExportsOutputRefApi1234")?;
    assert_eq!(first, second);
    assert_ne!(first, other);

    let path = tree.path(first)?.to_string();
    assert!(path.starts_with("/consumer/producerExportsOutputRefApi1234-"), "{path}");
    assert!(matches!(tree.import(stack, ""), Err(SynthError::InvalidIdentifier { .. })));

    let frozen = tree.freeze()?;
    assert_eq!(
        frozen.resolve(&Token::reference(first).into(), Some(stack))?,
        json!({"Fn::ImportValue": "producer:ExportsOutputRefApi1234"})
    );
    Ok(())
}

#[test]
fn test_import_resolves_only_in_its_stack() -> Result<()> {
    let mut tree = Tree::new();
    let home = tree.add_stack("home")?;
    let away = tree.add_stack("away")?;
    let imported = tree.import(home, "SharedApiId")?;

    let frozen = tree.freeze()?;
    let value = Value::from(Token::reference(imported));
    assert_eq!(
        frozen.resolve(&value, Some(home))?,
        json!({"Fn::ImportValue": "SharedApiId"})
    );
    assert!(matches!(
        frozen.resolve(&value, Some(away)),
        Err(SynthError::UnresolvedScope { .. })
    ));
    assert!(matches!(
        frozen.resolve(&value, None),
        Err(SynthError::UnresolvedScope { .. })
    ));
    Ok(())
}

#[test]
fn test_direct_cross_stack_reference_is_unresolved() -> Result<()> {
    let mut tree = Tree::new();
    let producer = tree.add_stack("producer")?;
    let consumer = tree.add_stack("consumer")?;
    let api = tree.add_resource(producer, "Api", "T")?;
    let user = tree.add_resource(consumer, "User", "T")?;
    tree.set_property(user, "ApiId", Token::reference(api))?;

    let frozen = tree.freeze()?;
    assert!(frozen.synthesize(producer).is_ok());
    assert!(matches!(
        frozen.synthesize(consumer),
        Err(SynthError::UnresolvedScope { .. })
    ));
    Ok(())
}

#[test]
fn test_plain_output_shape() -> Result<()> {
    let mut tree = Tree::new();
    let stack = tree.add_stack("web")?;
    let bucket = tree.add_resource(stack, "Bucket", "T")?;
    let name = tree.add_output(
        bucket,
        "WebsiteUrl",
        Token::get_att(bucket, "WebsiteURL"),
        Some("Public URL"),
    )?;

    let doc = serde_json::to_value(tree.freeze()?.synthesize(stack)?)?;
    assert_eq!(
        doc["Outputs"][name.as_str()],
        json!({"Value": {"Fn::GetAtt": ["Bucket", "WebsiteURL"]}, "Description": "Public URL"})
    );
    Ok(())
}

#[test]
fn test_outputs_need_a_stack() -> Result<()> {
    let mut tree = Tree::new();
    let loose = tree.add_resource(tree.root(), "Loose", "T")?;
    assert!(matches!(
        tree.add_output(loose, "Id", "x", None),
        Err(SynthError::UnresolvedScope { .. })
    ));
    Ok(())
}
