use formtree::{NodeOptions, create_node, search::SearchGoal};
use serde_json::json;

use crate::helpers::*;

#[test]
fn test_level_order_prefers_shallow_match() {
    let root = group("root");
    let x = group_in(&root, "x");
    group_in(&root, "y");
    let z = group_in(&root, "z");
    let inner = group_in(&x, "inner");
    let deep = input_in(&inner, "target");
    let shallow = input_in(&z, "target");

    let found = root.find("target", "name").unwrap();

    assert_eq!(found.as_ref(), Some(&shallow));
    assert_ne!(found, Some(deep));
    assert_address(&shallow, "root.z.target");
}

#[test]
fn test_search_includes_start_node() {
    let (form, user, ..) = setup_form();
    assert_eq!(
        form.find("form", SearchGoal::default()).unwrap(),
        Some(form.clone())
    );
    assert_eq!(user.find("form", "name").unwrap(), None);
}

#[test]
fn test_search_fields() {
    let (form, user, first, last, email) = setup_form();
    email.input("ada@example.com").unwrap();

    assert_eq!(form.find("ada@example.com", "value").unwrap(), Some(email));
    assert_eq!(
        form.find("form.user.last", "address").unwrap(),
        Some(last.clone())
    );
    // `user` itself sits at index 0, so only its second child matches 1.
    assert_eq!(user.find("1", "index").unwrap(), Some(last));
    assert_eq!(user.find("first", "name").unwrap(), Some(first));
    assert_eq!(form.find("0", "index").unwrap(), Some(user));
    assert_eq!(form.find("anything", "unknown").unwrap(), None);
}

#[test]
fn test_search_by_numeric_value() {
    let form = group("form");
    let age = create_node(NodeOptions::new().name("age").parent(&form)).unwrap();
    age.input(30).unwrap();

    assert_eq!(form.find("30", "value").unwrap(), Some(age));
}

#[test]
fn test_predicate_goal() {
    let (form, _user, _first, last, _email) = setup_form();

    let goal = SearchGoal::predicate(|node, term| {
        node.name().is_ok_and(|name| name.starts_with(term)) && node.children().is_empty()
    });

    assert_eq!(form.find("la", goal.clone()).unwrap(), Some(last));
    assert_eq!(form.find("us", goal).unwrap(), None);
}

#[test]
fn test_find_through_trap_dispatch() {
    let (form, _user, first, ..) = setup_form();
    first.input(json!("Ada")).unwrap();

    let reply = form
        .dispatch(
            formtree::node::Op::Find,
            formtree::node::Call::Search {
                term: "Ada".to_string(),
                goal: SearchGoal::field("value"),
            },
        )
        .unwrap();

    assert_eq!(
        reply.into_maybe_node(formtree::node::Op::Find).unwrap(),
        Some(first)
    );
}
