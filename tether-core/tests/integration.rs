//! Integration Tests for the Renderer
//!
//! These tests drive the public entry points end to end: markup in, live
//! nodes out, store writes reflected in the nodes, teardown releasing every
//! subscription.

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use serde_json::json;

use tether_core::dom::NodeType;
use tether_core::reactive::{Key, Subscriber, SubscriberId};
use tether_core::{
    remove_node, teardown_bindings, BindingKind, BindingRegistry, Document, ElementTemplate, Error,
    Event, Function, Node, Observable, RenderConfig, Renderer, Scope, TemplateSource, Value,
};

fn renderer() -> Renderer {
    Renderer::new(Document::new())
}

fn scope(data: serde_json::Value) -> Scope {
    Scope::from_json(data).unwrap()
}

fn collection(scope: &Scope, key: &str) -> Observable {
    scope.get(key).as_collection().unwrap().clone()
}

fn texts(nodes: &[Node]) -> Vec<String> {
    nodes.iter().map(Node::text_content).collect()
}

fn ids(nodes: &[Node]) -> Vec<String> {
    nodes
        .iter()
        .map(|node| node.get_attribute("id").unwrap_or_default())
        .collect()
}

/// Test that a text fragment joins its interpolations into live text.
#[test]
fn live_text_fragment_tracks_every_interpolation() {
    let scope = scope(json!({"bar": "hello", "qux": "world"}));
    let frag = renderer()
        .create_live_text_fragment("foo {{bar}} baz {{qux}}", Some(&scope))
        .unwrap();

    assert_eq!(frag.text_content(), "foo hello baz world");

    scope.set("bar", "bar").unwrap();
    scope.set("qux", "qux").unwrap();
    assert_eq!(frag.text_content(), "foo bar baz qux");

    scope.set("bar", "one").unwrap();
    scope.set("qux", "two").unwrap();
    assert_eq!(frag.text_content(), "foo one baz two");

    teardown_bindings(&frag);
    assert_eq!(scope.store().total_dependents(), 0);
}

#[test]
fn static_text_fragment() {
    let frag = renderer().create_live_text_fragment("hello world", None).unwrap();
    assert_eq!(frag.text_content(), "hello world");
}

#[test]
fn creates_native_element() {
    let p = renderer().create_live_element(&ElementTemplate::new("p"));
    assert!(p.is_element());
    assert_eq!(p.tag_name().as_deref(), Some("P"));
    assert!(p.component().is_none());
}

#[test]
fn creates_custom_element() {
    struct TestComponent {
        template: &'static str,
    }

    let renderer = renderer();
    renderer
        .document()
        .custom_elements()
        .define("test-component", || TestComponent { template: "" })
        .unwrap();

    let element = renderer.create_live_element(&ElementTemplate::new("test-component"));
    let component = element.component_as::<TestComponent>().unwrap();
    assert_eq!(component.template, "");
    assert_eq!(element.tag_name().as_deref(), Some("TEST-COMPONENT"));
}

/// Test that removing a bound text node releases its binding.
#[test]
fn removing_text_node_tears_down_its_binding() {
    let scope = scope(json!({"foo": "bar"}));
    let frag = renderer().create_live_text_fragment("{{foo}}", Some(&scope)).unwrap();
    let node = frag.first_child().unwrap();

    let bindings = BindingRegistry::bindings_for(&node);
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].kind(), &BindingKind::Text);
    assert_eq!(bindings[0].handler_count(), 1);

    remove_node(&node);

    assert!(BindingRegistry::bindings_for(&node).is_empty());
    assert_eq!(BindingRegistry::count_within(&frag), 0);
    assert_eq!(bindings[0].handler_count(), 0);
    assert!(node.parent().is_none());
    assert_eq!(scope.store().total_dependents(), 0);
}

#[test]
fn removing_fragment_tears_down_child_bindings() {
    let scope = scope(json!({"foo": "bar", "baz": "qux"}));
    let frag = renderer()
        .create_live_text_fragment("{{foo}} {{baz}}", Some(&scope))
        .unwrap();

    remove_node(&frag);

    assert_eq!(BindingRegistry::count_within(&frag), 0);
    assert_eq!(scope.store().total_dependents(), 0);
}

#[test]
fn teardown_reaches_deeply_nested_bindings() {
    let renderer = renderer();
    let scope = scope(json!({"foo": "bar", "baz": "qux"}));
    let p = renderer.create_live_element(&ElementTemplate::new("p"));
    let sub_p = renderer.create_live_element(&ElementTemplate::new("p"));

    p.append_child(&renderer.create_live_text_fragment("{{foo}}", Some(&scope)).unwrap());
    p.append_child(&sub_p);
    sub_p.append_child(&renderer.create_live_text_fragment("{{baz}}", Some(&scope)).unwrap());

    assert_eq!(BindingRegistry::count_within(&p), 2);

    teardown_bindings(&p);

    assert_eq!(BindingRegistry::count_within(&p), 0);
    assert_eq!(scope.store().total_dependents(), 0);
    // Teardown does not detach.
    assert_eq!(p.text_content(), "barqux");
}

#[test]
fn interpolated_text_is_a_single_node() {
    let scope = scope(json!({"foo": "bar"}));
    let frag = renderer().create_live_text_fragment("{{foo}}", Some(&scope)).unwrap();

    assert_eq!(frag.child_count(), 1);
    assert_eq!(frag.first_child().unwrap().node_value().as_deref(), Some("bar"));

    teardown_bindings(&frag);
}

#[test]
fn renders_static_fragment_from_html() {
    let frag = renderer()
        .render_fragment_from_html("<div><p>Hello World</p></div>", None)
        .unwrap();

    let div = frag.first_child().unwrap();
    let p = div.first_child().unwrap();
    assert_eq!(div.tag_name().as_deref(), Some("DIV"));
    assert_eq!(p.tag_name().as_deref(), Some("P"));
    assert_eq!(p.first_child().unwrap().node_value().as_deref(), Some("Hello World"));
    assert_eq!(BindingRegistry::count_within(&frag), 0);
}

#[test]
fn static_fragment_keeps_template_text_verbatim() {
    let frag = renderer()
        .render_fragment_from_html(r#"<p m-if="x">{{greeting}}</p>"#, None)
        .unwrap();
    let p = frag.first_child().unwrap();
    assert_eq!(p.text_content(), "{{greeting}}");
    assert_eq!(p.get_attribute("m-if").as_deref(), Some("x"));
}

/// Test that a live fragment updates text in place.
#[test]
fn renders_live_fragment_from_html() {
    let scope = scope(json!({"greeting": "Hello World"}));
    let frag = renderer()
        .render_fragment_from_html("<div><p>{{greeting}}</p></div>", Some(&scope))
        .unwrap();

    let div = frag.first_child().unwrap();
    let p = div.first_child().unwrap();
    let text = p.first_child().unwrap();
    assert_eq!(div.tag_name().as_deref(), Some("DIV"));
    assert_eq!(p.tag_name().as_deref(), Some("P"));
    assert_eq!(text.node_value().as_deref(), Some("Hello World"));

    scope.set("greeting", "Hello Everyone").unwrap();

    assert_eq!(text.node_value().as_deref(), Some("Hello Everyone"));
    assert_eq!(frag.first_child(), Some(div.clone()));
    assert_eq!(div.first_child(), Some(p));

    teardown_bindings(&frag);
}

#[test]
fn live_attribute_composes_interpolations() {
    let scope = scope(json!({"id": "foo", "otherThing": "bar"}));
    let frag = renderer()
        .render_fragment_from_html(r#"<div id="{{id}}-{{otherThing}}"></div>"#, Some(&scope))
        .unwrap();
    let div = frag.first_child().unwrap();

    assert_eq!(div.get_attribute("id").as_deref(), Some("foo-bar"));

    scope.set("id", "bar").unwrap();
    scope.set("otherThing", "baz").unwrap();
    assert_eq!(div.get_attribute("id").as_deref(), Some("bar-baz"));

    scope.set("id", "hello").unwrap();
    scope.set("otherThing", "world").unwrap();
    assert_eq!(div.get_attribute("id").as_deref(), Some("hello-world"));

    teardown_bindings(&div);
    assert_eq!(scope.store().total_dependents(), 0);
}

/// Test that `m-on` calls the scope method with the owning store as receiver.
#[test]
fn binds_event_to_handler_in_scope() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let store = Observable::object();
    let log = calls.clone();
    store
        .set(
            "handler",
            Function::new(move |receiver, event, _| {
                log.borrow_mut().push((receiver.id(), event.kind().to_string()));
                Ok(())
            }),
        )
        .unwrap();
    let scope = Scope::new(store.clone());

    let frag = renderer()
        .render_fragment_from_html(r#"<button m-on:click="handler"></button>"#, Some(&scope))
        .unwrap();
    let button = frag.first_child().unwrap();

    button.dispatch_event(Event::new("click"));
    assert_eq!(*calls.borrow(), vec![(store.id(), "click".to_string())]);

    teardown_bindings(&button);
    assert_eq!(BindingRegistry::count_within(&button), 0);
    assert_eq!(button.listener_count(), 0);

    button.dispatch_event(Event::new("click"));
    assert_eq!(calls.borrow().len(), 1);
}

#[test]
fn list_items_call_handlers_with_their_child_scope() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let scope = scope(json!({"items": ["foo", "bar"]}));
    let log = seen.clone();
    scope
        .set(
            "handler",
            Function::new(move |_, event, item_scope| {
                assert_eq!(event.kind(), "click");
                log.borrow_mut().push(item_scope.get("$value").to_text());
                Ok(())
            }),
        )
        .unwrap();

    let frag = renderer()
        .render_fragment_from_html(
            r#"<button m-for="items" m-on:click="handler"></button>"#,
            Some(&scope),
        )
        .unwrap();
    let buttons = frag.get_elements_by_tag_name("button");
    assert_eq!(buttons.len(), 2);

    buttons[0].dispatch_event(Event::new("click"));
    buttons[1].dispatch_event(Event::new("click"));
    assert_eq!(*seen.borrow(), vec!["foo".to_string(), "bar".to_string()]);

    teardown_bindings(&frag);
    assert_eq!(BindingRegistry::count_within(&frag), 0);
    assert_eq!(scope.store().total_dependents(), 0);
}

#[test]
fn missing_or_failing_handlers_do_not_panic() {
    let scope = scope(json!({"notAFunction": 1}));
    scope
        .set(
            "failing",
            Function::new(|_, _, _| {
                Err(Error::HandlerFailed {
                    handler: "failing".into(),
                    reason: "boom".into(),
                })
            }),
        )
        .unwrap();

    let frag = renderer()
        .render_fragment_from_html(
            r#"<a m-on:click="missing"></a><b m-on:click="notAFunction"></b><i m-on:click="failing"></i>"#,
            Some(&scope),
        )
        .unwrap();
    for node in frag.children() {
        node.dispatch_event(Event::new("click"));
    }
    teardown_bindings(&frag);
}

/// Test that `m-if` swaps the element for an empty placeholder and back.
#[test]
fn conditionally_renders_child() {
    let scope = scope(json!({"shown": true}));
    let frag = renderer()
        .render_fragment_from_html("<div m-if=\"shown\">Hello World!</div>", Some(&scope))
        .unwrap();

    let first = frag.first_child().unwrap();
    assert_eq!(first.node_type(), NodeType::Element);
    assert_eq!(first.text_content(), "Hello World!");

    scope.set("shown", false).unwrap();
    let first = frag.first_child().unwrap();
    assert_eq!(first.node_type(), NodeType::Text);
    assert_eq!(first.text_content(), "");
    assert_eq!(frag.child_count(), 1);

    scope.set("shown", true).unwrap();
    let first = frag.first_child().unwrap();
    assert_eq!(first.node_type(), NodeType::Element);
    assert_eq!(first.text_content(), "Hello World!");

    teardown_bindings(&frag);
    assert_eq!(scope.store().total_dependents(), 0);
}

/// Test that toggling a conditional reclaims each hidden branch.
#[test]
fn repeated_toggles_keep_node_count_bounded() {
    let renderer = renderer();
    let scope = scope(json!({"shown": true}));
    let frag = renderer
        .render_fragment_from_html("<div m-if=\"shown\"><p>hi</p></div>", Some(&scope))
        .unwrap();

    scope.set("shown", false).unwrap();
    let hidden = renderer.document().node_count();
    scope.set("shown", true).unwrap();
    let shown = renderer.document().node_count();
    assert_eq!(shown, hidden + 3);

    for _ in 0..1_000 {
        scope.set("shown", false).unwrap();
        scope.set("shown", true).unwrap();
    }
    assert_eq!(renderer.document().node_count(), shown);
    assert_eq!(frag.text_content(), "hi");

    scope.set("shown", false).unwrap();
    assert_eq!(renderer.document().node_count(), hidden);

    teardown_bindings(&frag);
}

#[test]
fn hidden_branch_releases_its_bindings() {
    let scope = scope(json!({"shown": true, "message": "hi"}));
    let frag = renderer()
        .render_fragment_from_html("<p m-if=\"shown\">{{message}}</p>", Some(&scope))
        .unwrap();
    let p = frag.first_child().unwrap();
    assert_eq!(scope.store().dependent_count(&tether_core::reactive::Key::prop("message")), 1);

    scope.set("shown", false).unwrap();
    assert_eq!(BindingRegistry::count_within(&p), 0);
    assert_eq!(scope.store().dependent_count(&tether_core::reactive::Key::prop("message")), 0);

    // The condition binding survives the swap.
    let placeholder = frag.first_child().unwrap();
    let bindings = BindingRegistry::bindings_for(&placeholder);
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].kind(), &BindingKind::Conditional);

    teardown_bindings(&frag);
}

/// Test that `m-for` renders objects and appends without re-rendering.
#[test]
fn renders_live_list_from_array_of_objects() {
    let scope = scope(json!({
        "items": [{"name": "bar"}, {"name": "baz"}, {"name": "qux"}]
    }));
    let frag = renderer()
        .render_fragment_from_html(
            r#"<ul><li m-for="items" id="item-{{$index}}">{{name}}</li></il>"#,
            Some(&scope),
        )
        .unwrap();

    let before = frag.get_elements_by_tag_name("li");
    assert_eq!(texts(&before), vec!["bar", "baz", "qux"]);
    assert_eq!(ids(&before), vec!["item-0", "item-1", "item-2"]);

    collection(&scope, "items")
        .push(Value::from_json(json!({"name": "foo"})))
        .unwrap();

    let after = frag.get_elements_by_tag_name("li");
    assert_eq!(texts(&after), vec!["bar", "baz", "qux", "foo"]);
    assert_eq!(ids(&after), vec!["item-0", "item-1", "item-2", "item-3"]);
    assert_eq!(&after[..3], &before[..]);

    teardown_bindings(&frag);
    assert_eq!(BindingRegistry::count_within(&frag), 0);
    assert_eq!(collection(&scope, "items").total_dependents(), 0);
}

#[test]
fn renders_live_list_from_array_of_strings() {
    let scope = scope(json!({"items": ["foo", "bar", "baz"]}));
    let frag = renderer()
        .render_fragment_from_html(r#"<ul><li m-for="items">{{$value}}</li></il>"#, Some(&scope))
        .unwrap();

    assert_eq!(texts(&frag.get_elements_by_tag_name("li")), vec!["foo", "bar", "baz"]);

    collection(&scope, "items").set_index(1, "BAR").unwrap();
    assert_eq!(texts(&frag.get_elements_by_tag_name("li")), vec!["foo", "BAR", "baz"]);

    teardown_bindings(&frag);
}

#[test]
fn renders_live_list_from_object_of_objects() {
    let scope = scope(json!({
        "items": {
            "first": {"name": "foo"},
            "second": {"name": "bar"},
            "third": {"name": "baz"}
        }
    }));
    let frag = renderer()
        .render_fragment_from_html(
            r#"<ul><li m-for="items" id="{{$index}}">{{name}}</li></il>"#,
            Some(&scope),
        )
        .unwrap();

    let items = frag.get_elements_by_tag_name("li");
    assert_eq!(texts(&items), vec!["foo", "bar", "baz"]);
    assert_eq!(ids(&items), vec!["first", "second", "third"]);

    collection(&scope, "items")
        .set("fourth", Value::from_json(json!({"name": "qux"})))
        .unwrap();
    let items = frag.get_elements_by_tag_name("li");
    assert_eq!(ids(&items), vec!["first", "second", "third", "fourth"]);

    teardown_bindings(&frag);
}

/// Test that removal and reordering keep surviving items' nodes.
#[test]
fn list_removal_and_reorder_reuse_nodes() {
    let scope = scope(json!({
        "items": [{"name": "a"}, {"name": "b"}, {"name": "c"}]
    }));
    let frag = renderer()
        .render_fragment_from_html(
            r#"<ul><li m-for="items" id="{{$index}}">{{name}}</li></ul>"#,
            Some(&scope),
        )
        .unwrap();
    let items = collection(&scope, "items");
    let original = frag.get_elements_by_tag_name("li");

    let removed = items.remove_index(1).unwrap();
    let after_removal = frag.get_elements_by_tag_name("li");
    assert_eq!(texts(&after_removal), vec!["a", "c"]);
    assert_eq!(ids(&after_removal), vec!["0", "1"]);
    assert_eq!(after_removal, vec![original[0].clone(), original[2].clone()]);
    assert!(original[1].parent().is_none());
    assert_eq!(BindingRegistry::count_within(&original[1]), 0);
    assert_eq!(removed.as_collection().unwrap().total_dependents(), 0);

    let (a, c) = (items.get_index(0), items.get_index(1));
    scope.set("items", Observable::array_from([c, a])).unwrap();
    let reordered = frag.get_elements_by_tag_name("li");
    assert_eq!(texts(&reordered), vec!["c", "a"]);
    assert_eq!(ids(&reordered), vec!["0", "1"]);
    assert_eq!(reordered, vec![original[2].clone(), original[0].clone()]);
    assert_eq!(items.total_dependents(), 0);

    teardown_bindings(&frag);
}

#[test]
fn list_items_can_be_conditional() {
    let scope = scope(json!({
        "items": [{"name": "a", "visible": true}, {"name": "b", "visible": false}]
    }));
    let frag = renderer()
        .render_fragment_from_html(
            r#"<ul><li m-for="items" m-if="visible">{{name}}</li></ul>"#,
            Some(&scope),
        )
        .unwrap();
    assert_eq!(texts(&frag.get_elements_by_tag_name("li")), vec!["a"]);

    let second = collection(&scope, "items").get_index(1);
    second.as_collection().unwrap().set("visible", true).unwrap();
    assert_eq!(texts(&frag.get_elements_by_tag_name("li")), vec!["a", "b"]);

    collection(&scope, "items").remove_index(0).unwrap();
    assert_eq!(texts(&frag.get_elements_by_tag_name("li")), vec!["b"]);

    teardown_bindings(&frag);
    assert_eq!(second.as_collection().unwrap().total_dependents(), 0);
}

#[test]
fn nested_lists_tear_down_completely() {
    let scope = scope(json!({
        "groups": [
            {"title": "one", "entries": ["a", "b"]},
            {"title": "two", "entries": ["c"]}
        ]
    }));
    let frag = renderer()
        .render_fragment_from_html(
            r#"<section m-for="groups"><h2>{{title}}</h2><span m-for="entries">{{$value}}</span></section>"#,
            Some(&scope),
        )
        .unwrap();
    assert_eq!(texts(&frag.get_elements_by_tag_name("span")), vec!["a", "b", "c"]);

    let groups = collection(&scope, "groups");
    let first = groups.get_index(0);
    let entries = first.as_collection().unwrap().get("entries");
    entries.as_collection().unwrap().push("z").unwrap();
    assert_eq!(texts(&frag.get_elements_by_tag_name("span")), vec!["a", "b", "z", "c"]);

    teardown_bindings(&frag);
    assert_eq!(BindingRegistry::count_within(&frag), 0);
    assert_eq!(groups.total_dependents(), 0);
    assert_eq!(entries.as_collection().unwrap().total_dependents(), 0);
    assert_eq!(scope.store().total_dependents(), 0);
}

#[test]
fn renders_template_from_string() {
    let frag = renderer()
        .render(TemplateSource::from("<p></p>"), &Scope::new(Observable::object()))
        .unwrap();
    assert_eq!(frag.first_child().unwrap().tag_name().as_deref(), Some("P"));
}

#[test]
fn renders_template_from_script_element() {
    let renderer = renderer();
    let script = renderer.document().create_element("script");
    script.append_child(&renderer.document().create_text_node("<p></p>"));

    let frag = renderer
        .render(TemplateSource::from(&script), &Scope::new(Observable::object()))
        .unwrap();
    assert_eq!(frag.first_child().unwrap().tag_name().as_deref(), Some("P"));
}

/// Test that `m-bind:value` syncs in both directions.
#[test]
fn two_way_binds_input_value() {
    let scope = scope(json!({"message": "foo"}));
    let frag = renderer()
        .render("<input m-bind:value=\"message\">".into(), &scope)
        .unwrap();
    let input = frag.first_child().unwrap();

    assert_eq!(input.value(), "foo");

    input.set_value("bar");
    input.dispatch_event(Event::new("input"));
    assert_eq!(scope.get("message"), Value::from("bar"));
    assert_eq!(input.value(), "bar");

    scope.set("message", "baz").unwrap();
    assert_eq!(input.value(), "baz");

    teardown_bindings(&frag);
    assert_eq!(input.listener_count(), 0);
}

/// A dependent that rewrites the value during the write-back wins.
#[test]
fn two_way_reflects_value_normalized_during_write_back() {
    let scope = scope(json!({"message": "foo"}));
    let frag = renderer()
        .render("<input m-bind:value=\"message\">".into(), &scope)
        .unwrap();
    let input = frag.first_child().unwrap();

    let store = scope.store().clone();
    let normalizer = store.clone();
    store.subscribe(
        Key::prop("message"),
        Subscriber::new(SubscriberId::new(), move || {
            let text = normalizer.get_untracked("message").to_text();
            let upper = text.to_uppercase();
            if upper != text {
                normalizer.set("message", upper).unwrap();
            }
        }),
    );

    input.set_value("bar");
    input.dispatch_event(Event::new("input"));
    assert_eq!(scope.get("message"), Value::from("BAR"));
    assert_eq!(input.value(), "BAR");

    teardown_bindings(&frag);
}

#[test]
fn two_way_binds_checkbox() {
    let scope = scope(json!({"form": {"agreed": false}}));
    let frag = renderer()
        .render(
            "<input type=\"checkbox\" m-bind:checked=\"form.agreed\">".into(),
            &scope,
        )
        .unwrap();
    let checkbox = frag.first_child().unwrap();
    assert!(!checkbox.checked());

    checkbox.set_checked(true);
    checkbox.dispatch_event(Event::new("change"));
    assert_eq!(scope.get_path(&"form.agreed".parse().unwrap()), Value::from(true));

    scope
        .set_path(&"form.agreed".parse().unwrap(), false)
        .unwrap();
    assert!(!checkbox.checked());

    teardown_bindings(&frag);
}

#[test]
fn setup_errors_surface_at_render_time() {
    let renderer = renderer();
    let scope = scope(json!({"a": 1, "b": 2}));

    assert!(matches!(
        renderer.render("<p>{{ a. }}</p>".into(), &scope),
        Err(Error::MalformedExpression { .. })
    ));
    assert!(matches!(
        renderer.render("<p m-show=\"a\"></p>".into(), &scope),
        Err(Error::UnsupportedDirective { .. })
    ));
    assert!(matches!(
        renderer.render("<input m-bind:value=\"{{a}}-{{b}}\">".into(), &scope),
        Err(Error::NotBindable { .. })
    ));
    assert!(matches!(
        renderer.render("<div class=\"x".into(), &scope),
        Err(Error::Markup { .. })
    ));
    assert_eq!(scope.store().total_dependents(), 0);
}

#[test]
fn writes_through_scalars_are_invalid_paths() {
    let scope = scope(json!({"title": "x"}));
    assert!(matches!(
        scope.set_path(&"title.length".parse().unwrap(), 1),
        Err(Error::InvalidPath { .. })
    ));
}

#[test]
fn custom_syntax_from_config() {
    let config = RenderConfig::from_json(
        r#"{"directive_prefix": "x-", "open_delimiter": "[[", "close_delimiter": "]]"}"#,
    )
    .unwrap();
    let renderer = Renderer::with_config(Document::new(), config).unwrap();
    let scope = scope(json!({"on": true, "msg": "hi"}));

    let frag = renderer
        .render("<p x-if=\"on\">[[msg]] {{msg}}</p>".into(), &scope)
        .unwrap();
    assert_eq!(frag.text_content(), "hi {{msg}}");

    scope.set("on", false).unwrap();
    assert_eq!(frag.text_content(), "");

    teardown_bindings(&frag);
}
