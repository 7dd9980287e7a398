//! Sharing an API between stacks through exports.

use anyhow::Result;
use construct_synth::token::Token;
use construct_synth::tree::Tree;
use serde_json::json;

use crate::common::{ImportedRestApi, METHOD_TYPE, RestApi, single_id_of_type};

#[test]
fn test_api_shared_through_export() -> Result<()> {
    let mut tree = Tree::new();
    let producer = tree.add_stack("shared")?;
    let consumer = tree.add_stack("orders")?;

    let api = RestApi::new(&mut tree, producer, "api")?;
    api.add_method(&mut tree, &api.root, "GET")?;
    let id_export = tree.export_value(api.scope, "RestApiId", Token::reference(api.api))?;
    let root_export = tree.export_value(
        api.scope,
        "RootResourceId",
        Token::get_att(api.api, "RootResourceId"),
    )?;

    let imported = ImportedRestApi::new(&mut tree, consumer, "api", id_export.name())?;
    let root_id = tree.import(imported.scope, root_export.name())?;
    let method_scope = tree.add_construct(imported.scope, "POST")?;
    let method = tree.add_resource(method_scope, "Resource", METHOD_TYPE)?;
    tree.set_property(method, "HttpMethod", "POST")?;
    tree.set_property(method, "ResourceId", Token::reference(root_id))?;
    tree.set_property(method, "RestApiId", Token::reference(imported.rest_api_id))?;
    tree.add_dependency(consumer, producer)?;

    let frozen = tree.freeze()?;
    assert_eq!(frozen.stacks_in_order(), &[producer, consumer]);

    let assembly = serde_json::to_value(frozen.synthesize_all()?)?;
    let shared = &assembly["shared"];
    let api_id = frozen.logical_id(api.api)?;
    assert_eq!(
        shared["Outputs"][id_export.name()],
        json!({"Value": {"Ref": api_id}, "Export": {"Name": id_export.name()}})
    );
    assert_eq!(
        shared["Outputs"][root_export.name()]["Value"],
        json!({"Fn::GetAtt": [api_id, "RootResourceId"]})
    );

    let orders = &assembly["orders"];
    let method_id = frozen.logical_id(method)?;
    assert_eq!(
        orders["Resources"][method_id]["Properties"],
        json!({
            "HttpMethod": "POST",
            "ResourceId": {"Fn::ImportValue": root_export.name()},
            "RestApiId": {"Fn::ImportValue": id_export.name()}
        })
    );
    // imports are not resources and never appear in DependsOn
    assert!(orders["Resources"][method_id].get("DependsOn").is_none());
    assert!(orders.get("Outputs").is_none());
    Ok(())
}

#[test]
fn test_imported_api_re_exported() -> Result<()> {
    let mut tree = Tree::new();
    let stack = tree.add_stack("edge")?;
    let imported = ImportedRestApi::new(&mut tree, stack, "api", "UpstreamApiId")?;
    imported.add_root_method(&mut tree, "abc123", "GET")?;

    let record = tree.export_value(
        imported.scope,
        "RestApiId",
        Token::reference(imported.rest_api_id),
    )?;
    assert!(record.name().starts_with("edgeapiRestApiId"), "{}", record.name());

    let template = tree.freeze()?.synthesize(stack)?;
    let method_id = single_id_of_type(&template, METHOD_TYPE);
    assert_eq!(
        template.resources[&method_id].properties["RestApiId"],
        json!({"Fn::ImportValue": "UpstreamApiId"})
    );
    assert_eq!(
        template.outputs[record.name()].value,
        json!({"Fn::ImportValue": "UpstreamApiId"})
    );
    Ok(())
}

#[test]
fn test_same_shape_in_two_stacks_keeps_ids() -> Result<()> {
    let mut tree = Tree::new();
    let blue = tree.add_stack("blue")?;
    let green = tree.add_stack("green")?;
    let blue_api = RestApi::new(&mut tree, blue, "api")?;
    let green_api = RestApi::new(&mut tree, green, "api")?;
    blue_api.add_method(&mut tree, &blue_api.root, "GET")?;
    green_api.add_method(&mut tree, &green_api.root, "GET")?;

    let frozen = tree.freeze()?;
    assert_eq!(frozen.logical_id(blue_api.api)?, frozen.logical_id(green_api.api)?);
    assert_eq!(
        frozen.logical_id(blue_api.deployment)?,
        frozen.logical_id(green_api.deployment)?
    );

    let assembly = frozen.synthesize_all()?;
    assert_eq!(assembly.template("blue"), assembly.template("green"));
    Ok(())
}
