use formtree::{NodeOptions, NodeType, Plugin, create_node};
use serde_json::{Value, json};
use std::{cell::RefCell, rc::Rc};

use crate::helpers::*;

fn normalize_email(value: Value) -> Value {
    json!(value.as_str().unwrap_or_default().trim().to_lowercase())
}

fn append(suffix: &'static str) -> impl Fn(Value) -> Value {
    move |value| json!(format!("{}{suffix}", value.as_str().unwrap_or_default()))
}

#[test]
fn test_input_hook_transforms_before_commit() {
    let form = group("form");
    let email = input_in(&form, "email");
    email.hooks().input.register(normalize_email);

    form.input(json!({"email": "  Ada@Example.COM "})).unwrap();

    assert_eq!(email.value().unwrap(), json!("ada@example.com"));
}

#[test]
fn test_middleware_runs_in_registration_order() {
    let field = create_node(NodeOptions::new().name("field")).unwrap();
    let hooks = field.hooks();
    hooks.input.register(append("a"));
    hooks.input.register(append("b"));
    hooks.commit.register(append("c"));

    field.input("").unwrap();

    assert_eq!(field.value().unwrap(), json!("abc"));
    assert_eq!(hooks.input.len(), 2);
    assert_eq!(hooks.commit.len(), 1);
}

#[test]
fn test_parent_input_hook_can_reshape_payload() {
    let form = group("form");
    let a = input_in(&form, "a");
    form.hooks().input.register(|v| match v {
        Value::String(s) => json!({ "a": s }),
        other => other,
    });

    form.input("wrapped").unwrap();

    assert_eq!(a.value().unwrap(), json!("wrapped"));
}

#[test]
fn test_commit_hook_not_run_for_composites() {
    let form = group("form");
    let a = input_in(&form, "a");
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    form.hooks().commit.register(move |v| {
        log.borrow_mut().push(v.clone());
        v
    });

    form.input(json!({"a": 1})).unwrap();

    assert!(seen.borrow().is_empty());
    assert_eq!(a.value().unwrap(), json!(1));
}

#[test]
fn test_init_hook_sees_built_node() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    // The init pipeline only exists once the node does, so register it from a
    // plugin, which runs during init just before the hook is dispatched.
    let plugin = Plugin::from_fn(move |node| {
        let log = Rc::clone(&log);
        node.hooks().init.register(move |node| {
            let address = node.address().unwrap_or_default().join(".");
            log.borrow_mut().push(address);
            node
        });
    });

    let form = create_node(
        NodeOptions::new()
            .name("form")
            .node_type(NodeType::Group)
            .plugin(&plugin),
    )
    .unwrap();
    let email = input_in(&form, "email");
    let returned = create_node(NodeOptions::new().name("age").parent(&form)).unwrap();

    assert_eq!(*seen.borrow(), vec!["form", "form.email", "form.age"]);
    assert_eq!(returned.parent().unwrap(), Some(form));
    assert_eq!(email.name().unwrap(), "email");
}

#[test]
fn test_init_hook_can_replace_node() {
    let replacement = group("replacement");
    let swap = replacement.clone();
    let plugin = Plugin::from_fn(move |node| {
        let swap = swap.clone();
        node.hooks().init.register(move |_| swap.clone());
    });

    let created = create_node(NodeOptions::new().name("original").plugin(&plugin)).unwrap();

    assert_eq!(created, replacement);
}

#[test]
fn test_dispatcher_names() {
    let node = group("form");
    let hooks = node.hooks();
    assert_eq!(hooks.init.name(), "init");
    assert_eq!(hooks.input.name(), "input");
    assert_eq!(hooks.commit.name(), "commit");
    assert!(hooks.init.is_empty());
}
