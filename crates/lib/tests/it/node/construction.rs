use formtree::{NodeOptions, NodeType, Plugin, create_node};
use serde_json::{Value, json};
use std::{cell::Cell, rc::Rc};

use crate::helpers::*;

fn shout(value: Value) -> Value {
    json!(format!("{}!", value.as_str().unwrap_or_default()))
}

#[test]
fn test_create_defaults() {
    let node = create_node(NodeOptions::new()).unwrap();

    assert_eq!(node.node_type(), NodeType::Input);
    assert_eq!(node.value().unwrap(), json!(null));
    assert!(node.parent().unwrap().is_none());
    assert!(node.children().is_empty());
    assert!(node.plugins().unwrap().is_empty());
    assert!(!node.name().unwrap().is_empty());
    assert_eq!(node.config().unwrap().delimiter(), ".");
}

#[test]
fn test_create_with_parent_attaches() {
    let form = group("form");
    let email = input_in(&form, "email");

    assert_eq!(email.parent().unwrap(), Some(form.clone()));
    assert_eq!(form.children(), vec![email.clone()]);
    assert_eq!(email.root().unwrap(), form);
    assert!(!email.is_root());
}

#[test]
fn test_create_with_value() {
    let node = create_node(NodeOptions::new().name("age").value(42)).unwrap();
    assert_eq!(node.value().unwrap(), json!(42));
}

#[test]
fn test_create_with_children_links_them_back() {
    let a = create_node(NodeOptions::new().name("a")).unwrap();
    let b = create_node(NodeOptions::new().name("b")).unwrap();

    let form = create_node(
        NodeOptions::new()
            .name("form")
            .node_type(NodeType::Group)
            .children([a.clone(), b.clone(), a.clone()]),
    )
    .unwrap();

    assert_eq!(form.children(), vec![a.clone(), b.clone()]);
    assert_eq!(a.parent().unwrap(), Some(form.clone()));
    assert_eq!(b.parent().unwrap(), Some(form.clone()));
    assert!(a.config().unwrap().ptr_eq(&form.config().unwrap()));
}

#[test]
fn test_create_with_children_steals_from_previous_parent() {
    let old = group("old");
    let moved = input_in(&old, "moved");

    let form = create_node(
        NodeOptions::new()
            .name("form")
            .node_type(NodeType::Group)
            .child(&moved),
    )
    .unwrap();

    assert!(old.children().is_empty());
    assert_eq!(moved.parent().unwrap(), Some(form));
}

#[test]
fn test_create_applies_plugins() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let plugin = Plugin::from_fn(move |node| {
        counter.set(counter.get() + 1);
        // Plugins run during init and can register hooks on the node.
        node.hooks().input.register(shout);
    });

    let node = create_node(NodeOptions::new().name("shout").plugin(&plugin)).unwrap();
    node.input("hey").unwrap();

    assert_eq!(calls.get(), 1);
    assert_eq!(node.plugins().unwrap(), vec![plugin]);
    assert_eq!(node.value().unwrap(), json!("hey!"));
}

#[test]
fn test_child_inherits_parent_plugins_on_create() {
    let (plugin, applied) = recording_plugin(formtree::Propagate::Descend);
    let form = create_node(
        NodeOptions::new()
            .name("form")
            .node_type(NodeType::Group)
            .plugin(&plugin),
    )
    .unwrap();
    let email = input_in(&form, "email");

    assert_eq!(*applied.borrow(), vec!["form", "email"]);
    assert_eq!(email.plugins().unwrap(), vec![plugin]);
}

#[test]
fn test_list_children_named_by_index() {
    let items = list("items");
    let a = create_node(NodeOptions::new().name("a").parent(&items)).unwrap();
    let b = create_node(NodeOptions::new().parent(&items)).unwrap();

    assert_eq!(a.name().unwrap(), "0");
    assert_eq!(b.name().unwrap(), "1");
    assert_address(&b, "items.1");

    items.remove(&a).unwrap();
    assert_eq!(b.name().unwrap(), "0");
    // Detached, an index-named node has no position to report.
    assert_eq!(a.name().unwrap(), "");
}

#[test]
fn test_named_node_added_to_list_uses_index() {
    let items = list("items");
    let named = create_node(NodeOptions::new().name("keep")).unwrap();
    items.add(&named).unwrap();

    assert_eq!(named.name().unwrap(), "0");
    items.remove(&named).unwrap();
    assert_eq!(named.name().unwrap(), "keep");
}

#[test]
fn test_invalid_config_override_fails_construction() {
    let err = create_node(NodeOptions::new().config("delimiter", 5)).unwrap_err();
    assert!(err.is_config_error());
}
