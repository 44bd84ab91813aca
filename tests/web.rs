//! Browser tests for the JavaScript facade.
//!
//! Run with `wasm-pack test --headless --firefox`.

#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::rc::Rc;

use force_graph_wasm::ForceGraphWasm;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen::prelude::*;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn stopped() -> ForceGraphWasm {
    let graph = ForceGraphWasm::new(None).unwrap();
    graph.stop();
    graph
}

#[wasm_bindgen_test]
fn constructor_starts_timer() {
    let graph = ForceGraphWasm::new(Some(40)).unwrap();
    assert!(graph.is_running());
    assert_eq!(graph.period_ms(), Some(40));
    graph.stop();
    assert!(!graph.is_running());
    graph.stop();
}

#[wasm_bindgen_test]
fn edges_create_and_cascade() {
    let graph = stopped();
    assert!(graph.add_edge("A".into(), "B".into(), Some("x".into())).unwrap());
    assert!(graph.add_edge("B".into(), "C".into(), None).unwrap());
    assert!(graph.add_edge("A".into(), "B".into(), Some("x".into())).unwrap());
    assert_eq!(graph.node_count().unwrap(), 3);
    assert_eq!(graph.edge_count().unwrap(), 2);

    assert!(graph.rem_node("B").unwrap());
    assert_eq!(graph.node_count().unwrap(), 2);
    assert_eq!(graph.edge_count().unwrap(), 0);
    assert!(!graph.add_node(String::new()).unwrap());
}

#[wasm_bindgen_test]
fn pointer_queries() {
    let graph = stopped();
    graph.add_node("a".into()).unwrap();
    graph.add_node("b".into()).unwrap();
    graph.set_node_position("a", 0.0, 0.0).unwrap();
    graph.set_node_position("b", 100.0, 0.0).unwrap();

    assert_eq!(graph.get_node_at(12.0, 0.0).unwrap(), Some("a".to_string()));
    assert_eq!(graph.get_node_at(50.0, 0.0).unwrap(), None);
    assert_eq!(graph.nearest_node(70.0, 0.0).unwrap(), Some("b".to_string()));
}

#[wasm_bindgen_test]
fn config_object_is_partial() {
    let config = js_sys::Object::new();
    js_sys::Reflect::set(&config, &"periodMs".into(), &JsValue::from(50)).unwrap();
    let graph = ForceGraphWasm::with_config(config.into()).unwrap();
    assert_eq!(graph.period_ms(), Some(50));
    graph.stop();

    let bad = js_sys::Object::new();
    js_sys::Reflect::set(&bad, &"damping".into(), &JsValue::from(-1.0)).unwrap();
    assert!(ForceGraphWasm::with_config(bad.into()).is_err());
}

#[wasm_bindgen_test]
fn observers_receive_snapshots() {
    let graph = stopped();
    graph.add_edge("a".into(), "b".into(), None).unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let callback = Closure::<dyn FnMut(JsValue)>::new(move |snapshot: JsValue| {
        let tick = js_sys::Reflect::get(&snapshot, &"tick".into()).unwrap();
        sink.borrow_mut().push(tick.as_f64().unwrap_or_default());
    });
    let throwing = js_sys::Function::new_no_args("throw new Error('boom')");

    graph.subscribe(throwing).unwrap();
    let id = graph.subscribe(callback.as_ref().unchecked_ref::<js_sys::Function>().clone()).unwrap();

    graph.tick(25.0).unwrap();
    graph.tick(25.0).unwrap();
    assert_eq!(*seen.borrow(), vec![1.0, 2.0]);

    assert!(graph.unsubscribe(id).unwrap());
    graph.tick(25.0).unwrap();
    assert_eq!(seen.borrow().len(), 2);
}

#[wasm_bindgen_test]
fn dump_lists_successors() {
    let graph = stopped();
    graph.add_edge("A".into(), "B".into(), None).unwrap();
    assert_eq!(graph.dump().unwrap(), "Directed graph.\nA --> B, \nB --> ");
}
