use formtree::{
    Node, NodeOptions, NodeType, Propagate, create_node,
    node::{Op, Reply, Trap},
};
use serde_json::json;

use crate::helpers::*;

#[test]
fn test_add_is_bidirectional() {
    let form = group("form");
    let email = create_node(NodeOptions::new().name("email")).unwrap();

    let returned = form.add(&email).unwrap();

    assert_eq!(returned, form);
    assert_eq!(form.children(), vec![email.clone()]);
    assert_eq!(email.parent().unwrap(), Some(form));
}

#[test]
fn test_add_twice_does_not_duplicate() {
    let form = group("form");
    let email = input_in(&form, "email");

    form.add(&email).unwrap();
    form.add(&email).unwrap();

    assert_eq!(form.children().len(), 1);
}

#[test]
fn test_remove_clears_parent() {
    let (form, _user, _first, _last, email) = setup_form();

    form.remove(&email).unwrap();

    assert_eq!(child_names(&form), vec!["user"]);
    assert!(email.parent().unwrap().is_none());
    assert!(email.is_root());
}

#[test]
fn test_remove_absent_child_is_noop() {
    let (form, user, first, _last, _email) = setup_form();

    form.remove(&first).unwrap();

    assert_eq!(child_names(&form), vec!["user", "email"]);
    assert_eq!(first.parent().unwrap(), Some(user));
}

#[test]
fn test_reparent_via_add() {
    let a = group("a");
    let b = group("b");
    let moving = input_in(&a, "moving");

    b.add(&moving).unwrap();

    assert!(a.children().is_empty());
    assert_eq!(b.children(), vec![moving.clone()]);
    assert_eq!(moving.parent().unwrap(), Some(b.clone()));
    assert_address(&moving, "b.moving");
}

#[test]
fn test_reparent_via_set_parent() {
    let a = group("a");
    let b = group("b");
    let moving = input_in(&a, "moving");

    assert!(moving.set_parent(Some(&b)).unwrap());

    assert!(!a.children().contains(&moving));
    assert_eq!(b.children().iter().filter(|c| **c == moving).count(), 1);
    assert_eq!(moving.parent().unwrap(), Some(b));
}

#[test]
fn test_set_parent_none_detaches_link() {
    let form = group("form");
    let email = input_in(&form, "email");

    assert!(email.set_parent(None).unwrap());
    assert!(email.parent().unwrap().is_none());
}

#[test]
fn test_invalid_parent_assignment_returns_false() {
    let form = group("form");
    let email = input_in(&form, "email");

    let accepted = email
        .assign(Op::Parent, Reply::Value(json!("not a node")))
        .unwrap();

    assert!(!accepted);
    assert_eq!(email.parent().unwrap(), Some(form));
}

#[test]
fn test_reparent_adopts_new_config_and_plugins() {
    let (plugin, applied) = recording_plugin(Propagate::Descend);
    let a = group("a");
    let b = create_node(
        NodeOptions::new()
            .name("b")
            .node_type(NodeType::Group)
            .config("delimiter", "/"),
    )
    .unwrap();
    b.use_plugin(&plugin).unwrap();

    let moving = group_in(&a, "moving");
    let leaf = input_in(&moving, "leaf");
    b.add(&moving).unwrap();

    let config = b.config().unwrap();
    assert!(moving.config().unwrap().ptr_eq(&config));
    assert!(leaf.config().unwrap().ptr_eq(&config));
    assert_eq!(*applied.borrow(), vec!["b", "moving", "leaf"]);
}

#[test]
fn test_redirected_parent_assignment_is_followed() {
    let requested = group("requested");
    let actual = group("actual");
    let child = create_node(NodeOptions::new().name("child")).unwrap();

    // Any attempt to attach this child lands it under `actual` instead.
    let default = child.trap(Op::Parent).unwrap();
    let getter = default.clone();
    let target = actual.clone();
    let set = move |node: &Node, value: Reply| match value {
        Reply::Node(_) => default.set(Op::Parent, node, Reply::Node(target.clone())),
        other => default.set(Op::Parent, node, other),
    };
    let redirect = Trap::new(move |node, call| getter.get(node, call)).with_setter(set);
    child.intercept(Op::Parent, redirect);

    requested.add(&child).unwrap();

    assert!(requested.children().is_empty());
    assert_eq!(actual.children(), vec![child.clone()]);
    assert_eq!(child.parent().unwrap(), Some(actual));
}

#[test]
fn test_self_attachment_is_refused() {
    let a = group("a");

    let err = a.add(&a).unwrap_err();

    assert!(err.is_cyclic_attachment());
    assert!(a.children().is_empty());
    assert!(a.is_root());
}

#[test]
fn test_ancestor_attachment_is_refused() {
    let (form, user, first, ..) = setup_form();

    assert!(first.add(&form).unwrap_err().is_cyclic_attachment());
    assert!(user.add(&form).unwrap_err().is_cyclic_attachment());
    let err = form.set_parent(Some(&first)).unwrap_err();
    assert!(err.is_cyclic_attachment());

    assert!(form.is_root());
    assert!(first.children().is_empty());
    assert_eq!(child_names(&form), vec!["user", "email"]);
    assert_address(&first, "form.user.first");
}

#[test]
fn test_descendant_can_move_up() {
    let (form, user, first, ..) = setup_form();

    form.add(&first).unwrap();

    assert_eq!(child_names(&form), vec!["user", "email", "first"]);
    assert_eq!(child_names(&user), vec!["last"]);
    assert_address(&first, "form.first");
}
