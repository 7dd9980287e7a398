//! Recursive resolution of nested values.

use anyhow::Result;
use construct_synth::config::SynthConfig;
use construct_synth::core::SynthError;
use construct_synth::token::{PseudoParameter, Token, Value};
use construct_synth::tree::Tree;
use serde_json::json;
use std::sync::{Arc, Mutex};

#[test]
fn test_mapping_key_order_is_preserved() -> Result<()> {
    let frozen = Tree::new().freeze()?;
    let value = Value::mapping([
        ("Zeta", Value::from(1)),
        ("Alpha", Value::from(PseudoParameter::StackName)),
        ("Mid", Value::mapping([("y", Value::from(true)), ("x", Value::null())])),
    ]);

    let out = frozen.resolve(&value, None)?;
    let keys: Vec<_> = out.as_object().map(|o| o.keys().cloned().collect()).unwrap_or_default();
    assert_eq!(keys, vec!["Zeta", "Alpha", "Mid"]);
    let inner: Vec<_> = out["Mid"].as_object().map(|o| o.keys().cloned().collect()).unwrap_or_default();
    assert_eq!(inner, vec!["y", "x"]);
    Ok(())
}

#[test]
fn test_resolution_reaches_plain_values() -> Result<()> {
    let mut tree = Tree::new();
    let stack = tree.add_stack("prod")?;
    let bucket = tree.add_resource(stack, "Bucket", "AWS::S3::Bucket")?;
    let frozen = tree.freeze()?;

    let lazy_arn = Token::lazy("bucket arn", move |_| Ok(Value::from(Token::get_att(bucket, "Arn"))));
    let value = Value::sequence([
        Value::from(lazy_arn),
        Value::from(Token::join(":", [Value::from("x"), Value::from(Token::reference(bucket))])),
    ]);

    assert_eq!(
        frozen.resolve(&value, Some(stack))?,
        json!([
            {"Fn::GetAtt": ["Bucket", "Arn"]},
            {"Fn::Join": [":", ["x", {"Ref": "Bucket"}]]}
        ])
    );
    Ok(())
}

#[test]
fn test_lazy_sees_consuming_context() -> Result<()> {
    let mut tree = Tree::new();
    let stack = tree.add_stack("prod")?;
    let bucket = tree.add_resource(stack, "Bucket", "AWS::S3::Bucket")?;
    let frozen = tree.freeze()?;

    let describe = Token::lazy("describe", move |ctx| {
        let id = ctx.logical_id(bucket)?;
        let consumer = ctx.consumer().map(|s| ctx.tree().path(s)).transpose()?;
        Ok(Value::from(format!(
            "{id} in {}",
            consumer.map_or_else(|| "nowhere".to_string(), |p| p.to_string())
        )))
    });

    assert_eq!(frozen.resolve(&describe.clone().into(), Some(stack))?, json!("Bucket in /prod"));
    assert_eq!(frozen.resolve(&describe.into(), None)?, json!("Bucket in nowhere"));
    Ok(())
}

#[test]
fn test_resolution_is_deterministic() -> Result<()> {
    let mut tree = Tree::new();
    let stack = tree.add_stack("prod")?;
    let bucket = tree.add_resource(stack, "Bucket", "AWS::S3::Bucket")?;
    let frozen = tree.freeze()?;

    let calls = Arc::new(Mutex::new(0usize));
    let counter = Arc::clone(&calls);
    let value = Value::mapping([(
        "Arn",
        Value::from(Token::lazy("counted", move |_| {
            if let Ok(mut n) = counter.lock() {
                *n += 1;
            }
            Ok(Value::from(Token::get_att(bucket, "Arn")))
        })),
    )]);

    let first = frozen.resolve(&value, Some(stack))?;
    let second = frozen.resolve(&value, Some(stack))?;
    assert_eq!(first, second);
    assert_eq!(*calls.lock().unwrap(), 2);
    Ok(())
}

#[test]
fn test_overflow_respects_configured_depth() -> Result<()> {
    fn chain(remaining: usize) -> Token {
        Token::lazy("chain", move |_| {
            Ok(if remaining == 0 {
                Value::from("end")
            } else {
                Value::from(chain(remaining - 1))
            })
        })
    }

    let config = SynthConfig {
        max_token_depth: 5,
        ..SynthConfig::default()
    };
    let frozen = Tree::with_config(config).freeze()?;

    // five nested steps fit exactly
    assert_eq!(frozen.resolve(&chain(4).into(), None)?, json!("end"));

    let err = frozen.resolve(&chain(5).into(), None).unwrap_err();
    assert_eq!(
        err,
        SynthError::TokenResolutionOverflow {
            depth: 5,
            token: "Lazy(chain)".to_string(),
        }
    );
    Ok(())
}

#[test]
fn test_mutually_recursive_lazies_are_cyclic() -> Result<()> {
    let frozen = Tree::new().freeze()?;

    let slot_b: Arc<Mutex<Option<Token>>> = Arc::new(Mutex::new(None));
    let b_for_a = Arc::clone(&slot_b);
    let a = Token::lazy("a", move |_| {
        let b = b_for_a.lock().ok().and_then(|g| g.clone());
        Ok(Value::from(b))
    });
    let a_for_b = a.clone();
    let b = Token::lazy("b", move |_| Ok(Value::mapping([("Nested", a_for_b.clone())])));
    *slot_b.lock().unwrap() = Some(b);

    let err = frozen.resolve(&a.into(), None).unwrap_err();
    assert_eq!(
        err,
        SynthError::CyclicToken {
            token: "Lazy(a)".to_string()
        }
    );
    Ok(())
}

#[test]
fn test_errors_from_lazies_propagate() -> Result<()> {
    let frozen = Tree::new().freeze()?;
    let failing = Token::lazy("failing", |ctx| {
        Err(SynthError::InvalidReference {
            path: ctx.tree().path(ctx.tree().root())?.to_string(),
            reason: "nothing to see".to_string(),
        })
    });
    let value = Value::sequence([Value::from("ok"), Value::from(failing)]);
    assert!(matches!(
        frozen.resolve(&value, None),
        Err(SynthError::InvalidReference { .. })
    ));
    Ok(())
}
