//! Synthesis fails as a whole, with the offending paths.

use anyhow::Result;
use construct_synth::core::{SynthError, user_friendly_error};
use construct_synth::token::Token;
use construct_synth::tree::Tree;

use crate::common::RestApi;

#[test]
fn test_cycle_through_composite_dependency() -> Result<()> {
    let mut tree = Tree::new();
    let stack = tree.add_stack("prod")?;
    let api = RestApi::new(&mut tree, stack, "api")?;
    let authorizer = tree.add_resource(stack, "Authorizer", "AWS::ApiGateway::Authorizer")?;
    tree.set_property(authorizer, "RestApiId", Token::reference(api.api))?;
    // the API now waits on something that waits on the API
    tree.add_dependency(api.api, authorizer)?;

    let err = tree.freeze().unwrap_err();
    let SynthError::Cycle { cycle } = &err else {
        panic!("expected a cycle, got {err}");
    };
    assert!(cycle.contains("/prod/Authorizer"), "{cycle}");
    assert!(cycle.contains("/prod/api/Resource"), "{cycle}");
    Ok(())
}

#[test]
fn test_error_in_one_stack_fails_the_assembly() -> Result<()> {
    let mut tree = Tree::new();
    let good = tree.add_stack("good")?;
    let bad = tree.add_stack("bad")?;
    tree.add_resource(good, "Bucket", "T")?;
    let other = tree.add_resource(good, "Other", "T")?;
    let user = tree.add_resource(bad, "User", "T")?;
    tree.set_property(user, "Target", Token::reference(other))?;

    let frozen = tree.freeze()?;
    assert!(frozen.synthesize(good).is_ok());
    assert!(matches!(
        frozen.synthesize_all(),
        Err(SynthError::UnresolvedScope { ref path, .. }) if path == "/good/Other"
    ));
    Ok(())
}

#[test]
fn test_build_errors_leave_tree_usable() -> Result<()> {
    let mut tree = Tree::new();
    let stack = tree.add_stack("prod")?;
    let api = RestApi::new(&mut tree, stack, "api")?;
    api.add_method(&mut tree, &api.root, "GET")?;

    let err = api.add_method(&mut tree, &api.root, "GET").unwrap_err();
    let err = err.downcast::<SynthError>()?;
    assert!(err.is_build_time());
    assert!(tree.add_stack("bad/name").is_err());

    let template = tree.freeze()?.synthesize(stack)?;
    assert_eq!(template.resources.len(), 4);
    Ok(())
}

#[test]
fn test_friendly_error_for_cycle() {
    let error = SynthError::Cycle {
        cycle: "/prod/A → /prod/B → /prod/A".to_string(),
    };
    let ctx = user_friendly_error(anyhow::Error::new(error.clone()));
    assert_eq!(ctx.error, error);
    assert!(ctx.suggestion.is_some());
}
