//! Output depends on tree shape only.

use construct_synth::test_utils::{attach_path, synth_all_json};
use construct_synth::token::Token;
use construct_synth::tree::Tree;
use proptest::prelude::*;
use std::collections::BTreeSet;

use crate::common::RestApi;

/// Paths like `s1/g0/g2/R3`: lowercase scopes and uppercase leaves never
/// collide at one level.
fn path_strategy() -> impl Strategy<Value = String> {
    (0..3u8, prop::collection::vec(0..3u8, 0..3), 0..6u8).prop_map(|(stack, scopes, leaf)| {
        let mut path = format!("s{stack}");
        for scope in scopes {
            path.push_str(&format!("/g{scope}"));
        }
        path.push_str(&format!("/R{leaf}"));
        path
    })
}

fn build(paths: &[&String]) -> serde_json::Value {
    let mut tree = Tree::new();
    for path in paths {
        let node = attach_path(&mut tree, path, "T").unwrap();
        tree.set_property(node, "Source", path.as_str()).unwrap();
        tree.set_property(node, "Self", Token::get_att(node, "Arn")).unwrap();
    }
    synth_all_json(tree).unwrap()
}

proptest! {
    #[test]
    fn test_attach_order_is_irrelevant(paths in prop::collection::btree_set(path_strategy(), 1..24)) {
        let forward: Vec<&String> = paths.iter().collect();
        let backward: Vec<&String> = paths.iter().rev().collect();
        prop_assert_eq!(build(&forward), build(&backward));
    }

    #[test]
    fn test_logical_ids_fit_the_bound(paths in prop::collection::btree_set(path_strategy(), 1..24)) {
        let forward: Vec<&String> = paths.iter().collect();
        let doc = build(&forward);
        for template in doc.as_object().unwrap().values() {
            for id in template["Resources"].as_object().unwrap().keys() {
                prop_assert!(id.len() <= 255);
                prop_assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
            }
        }
    }
}

#[test]
fn test_synthesizing_twice_is_identical() -> anyhow::Result<()> {
    let mut tree = Tree::new();
    let stack = tree.add_stack("prod")?;
    let api = RestApi::new(&mut tree, stack, "api")?;
    let pets = api.add_path(&mut tree, &api.root, "pets")?;
    api.add_method(&mut tree, &pets, "GET")?;
    api.add_method(&mut tree, &pets, "PUT")?;

    let frozen = tree.freeze()?;
    let first = serde_json::to_string(&frozen.synthesize_all()?)?;
    let second = serde_json::to_string(&frozen.synthesize_all()?)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_distinct_stacks_set_is_preserved() {
    let paths: BTreeSet<String> = ["a/R0", "b/g1/R1", "c/g0/g1/R2"].into_iter().map(String::from).collect();
    let forward: Vec<&String> = paths.iter().collect();
    let doc = build(&forward);
    let names: Vec<_> = doc.as_object().unwrap().keys().cloned().collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}
