//! Token encodings.

use anyhow::Result;
use construct_synth::core::SynthError;
use construct_synth::token::{ArnComponents, ArnSeparator, PseudoParameter, Token, Value};
use construct_synth::tree::{ParameterSpec, Tree};
use serde_json::json;

#[test]
fn test_reference_and_attribute() -> Result<()> {
    let mut tree = Tree::new();
    let stack = tree.add_stack("prod")?;
    let bucket = tree.add_resource(stack, "Bucket", "AWS::S3::Bucket")?;
    let frozen = tree.freeze()?;

    assert_eq!(
        frozen.resolve(&Token::reference(bucket).into(), Some(stack))?,
        json!({"Ref": "Bucket"})
    );
    assert_eq!(
        frozen.resolve(&Token::get_att(bucket, "Arn").into(), Some(stack))?,
        json!({"Fn::GetAtt": ["Bucket", "Arn"]})
    );
    Ok(())
}

#[test]
fn test_parameter_reference() -> Result<()> {
    let mut tree = Tree::new();
    let stack = tree.add_stack("prod")?;
    let param = tree.add_parameter(stack, "Env", ParameterSpec::new("String"))?;
    let frozen = tree.freeze()?;

    assert_eq!(frozen.resolve(&Token::reference(param).into(), None)?, json!({"Ref": "Env"}));
    assert!(matches!(
        frozen.resolve(&Token::get_att(param, "Value").into(), None),
        Err(SynthError::InvalidReference { .. })
    ));
    Ok(())
}

#[test]
fn test_reference_to_composite_is_invalid() -> Result<()> {
    let mut tree = Tree::new();
    let stack = tree.add_stack("prod")?;
    let group = tree.add_construct(stack, "group")?;
    let frozen = tree.freeze()?;

    let err = frozen.resolve(&Token::reference(group).into(), Some(stack)).unwrap_err();
    assert!(matches!(err, SynthError::InvalidReference { ref path, .. } if path == "/prod/group"));
    Ok(())
}

#[test]
fn test_join_collapses() -> Result<()> {
    let frozen = Tree::new().freeze()?;
    let resolve = |t: Token| frozen.resolve(&Value::from(t), None);

    assert_eq!(resolve(Token::join(",", Vec::<Value>::new()))?, json!(""));
    assert_eq!(resolve(Token::join(",", ["only"]))?, json!("only"));
    assert_eq!(resolve(Token::join("-", ["a", "b", "c"]))?, json!("a-b-c"));
    assert_eq!(
        resolve(Token::join(",", [Value::from(PseudoParameter::Region)]))?,
        json!({"Ref": "AWS::Region"})
    );
    Ok(())
}

#[test]
fn test_join_with_tokens() -> Result<()> {
    let frozen = Tree::new().freeze()?;
    let value = Value::from(Token::concat([
        Value::from("https://"),
        Value::from(PseudoParameter::Region),
        Value::from(".example.com"),
    ]));

    assert_eq!(
        frozen.resolve(&value, None)?,
        json!({"Fn::Join": ["", ["https://", {"Ref": "AWS::Region"}, ".example.com"]]})
    );
    Ok(())
}

#[test]
fn test_nested_join_of_literals_collapses_inside_outer_join() -> Result<()> {
    let frozen = Tree::new().freeze()?;
    let inner = Token::join("-", ["a", "b"]);
    let outer = Token::join("/", [Value::from(inner), Value::from(PseudoParameter::AccountId)]);

    assert_eq!(
        frozen.resolve(&outer.into(), None)?,
        json!({"Fn::Join": ["/", ["a-b", {"Ref": "AWS::AccountId"}]]})
    );
    Ok(())
}

#[test]
fn test_nested_all_literal_join_is_a_literal() -> Result<()> {
    let frozen = Tree::new().freeze()?;
    let outer = Token::join(",", [Value::from(Token::join("", ["a", "b"])), Value::from("c")]);
    assert_eq!(frozen.resolve(&outer.into(), None)?, json!("ab,c"));

    let deep = Token::join(
        "/",
        [Value::from(Token::join("-", [Value::from(Token::join("", ["x", "y"])), Value::from("z")])), Value::from("w")],
    );
    assert_eq!(frozen.resolve(&deep.into(), None)?, json!("xy-z/w"));
    Ok(())
}

#[test]
fn test_arn_defaults_to_pseudo_parameters() -> Result<()> {
    let frozen = Tree::new().freeze()?;
    let arn = Token::arn(
        ArnComponents::new("iam", "policy")
            .with_region("")
            .with_account("aws")
            .with_resource_name(ArnSeparator::Slash, "service-role/AmazonAPIGatewayPushToCloudWatchLogs"),
    );

    assert_eq!(
        frozen.resolve(&arn.into(), None)?,
        json!({"Fn::Join": ["", [
            "arn", ":", {"Ref": "AWS::Partition"}, ":", "iam", ":", "", ":", "aws", ":",
            "policy", "/", "service-role/AmazonAPIGatewayPushToCloudWatchLogs"
        ]]})
    );
    Ok(())
}

#[test]
fn test_arn_with_reference_resource() -> Result<()> {
    let mut tree = Tree::new();
    let stack = tree.add_stack("prod")?;
    let api = tree.add_resource(stack, "Api", "AWS::ApiGateway::RestApi")?;
    let frozen = tree.freeze()?;

    let arn = Token::arn(
        ArnComponents::new("execute-api", Token::reference(api))
            .with_resource_name(ArnSeparator::Slash, "*"),
    );
    assert_eq!(
        frozen.resolve(&arn.into(), Some(stack))?,
        json!({"Fn::Join": ["", [
            "arn", ":", {"Ref": "AWS::Partition"}, ":", "execute-api", ":",
            {"Ref": "AWS::Region"}, ":", {"Ref": "AWS::AccountId"}, ":",
            {"Ref": "Api"}, "/", "*"
        ]]})
    );
    Ok(())
}

#[test]
fn test_import_value_token() -> Result<()> {
    let frozen = Tree::new().freeze()?;
    assert_eq!(
        frozen.resolve(&Token::import_value("SharedVpcId").into(), None)?,
        json!({"Fn::ImportValue": "SharedVpcId"})
    );
    Ok(())
}

#[test]
fn test_value_conversions() {
    assert_eq!(Value::from(serde_json::json!({"a": [1, "b"]})).to_plain_json(), Some(json!({"a": [1, "b"]})));
    assert_eq!(Value::from(None::<&str>).to_plain_json(), Some(json!(null)));
    assert!(Value::from(Token::pseudo(PseudoParameter::StackName)).contains_tokens());
    assert!(Value::from(Token::pseudo(PseudoParameter::StackName)).to_plain_json().is_none());
}

#[test]
fn test_references_are_discovered_through_nesting() -> Result<()> {
    let mut tree = Tree::new();
    let stack = tree.add_stack("prod")?;
    let a = tree.add_resource(stack, "A", "T")?;
    let b = tree.add_resource(stack, "B", "T")?;

    let value = Value::mapping([
        ("Outer", Value::sequence([Value::from(Token::get_att(b, "Arn"))])),
        ("Joined", Value::from(Token::concat([Value::from("x"), Value::from(Token::reference(a))]))),
    ]);
    assert_eq!(value.references(), vec![b, a]);
    Ok(())
}
