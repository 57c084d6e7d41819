#[path = "fixtures/sample_maps.rs"]
mod fixtures;

use assert_matches::assert_matches;
use fixtures::*;
use mindmap_canvas::{
    AutosaveConfig, EngineConfig, EventType, InteractionMode, PersistedNode, Point,
    PointerTarget, SaveTrigger,
};
use pretty_assertions::assert_eq;

#[test]
fn test_drag_composes_from_start_position() {
    let (mut engine, _) = recording_engine(&single_node_map(), EngineConfig::default());

    engine.on_pointer_down(PointerTarget::Node("n".into()), Point::new(100.0, 100.0));
    assert_eq!(engine.mode(), InteractionMode::DraggingNodes);
    engine.on_pointer_move(Point::new(105.0, 105.0));
    assert_eq!(engine.graph().position_of("n"), Point::new(15.0, 15.0));
    engine.on_pointer_move(Point::new(110.0, 110.0));
    engine.on_pointer_up();

    assert_eq!(engine.graph().position_of("n"), Point::new(20.0, 20.0));
    let node = engine.graph().node("n").unwrap();
    assert_eq!((node.style().x(), node.style().y()), (20.0, 20.0));
    // A real drag is not a click
    assert!(engine.selection().is_empty());
}

#[test]
fn test_click_toggles_selection() {
    let (mut engine, _) = recording_engine(&plans_map(), EngineConfig::default());

    click_node(&mut engine, "a");
    click_node(&mut engine, "b");
    assert_eq!(engine.graph().selected_ids(), vec!["a", "b"]);

    click_node(&mut engine, "a");
    assert_eq!(engine.graph().selected_ids(), vec!["b"]);

    engine.on_pointer_down(PointerTarget::Background, Point::new(5.0, 5.0));
    engine.on_pointer_up();
    assert!(engine.selection().is_empty());
}

#[test]
fn test_pan_drag_keeps_selection() {
    let (mut engine, _) = recording_engine(&plans_map(), EngineConfig::default());
    click_node(&mut engine, "a");

    engine.on_pointer_down(PointerTarget::Background, Point::ZERO);
    engine.on_pointer_move(Point::new(50.0, 0.0));
    engine.on_pointer_up();

    assert_eq!(engine.pan_offset(), Point::new(50.0, 0.0));
    assert!(engine.graph().is_selected("a"));
}

#[test]
fn test_dragging_selected_node_moves_whole_selection() {
    let (mut engine, _) = recording_engine(&plans_map(), EngineConfig::default());
    click_node(&mut engine, "a");
    click_node(&mut engine, "b");

    drag_node(&mut engine, "b", Point::ZERO, &[Point::new(0.0, 30.0)]);

    assert_eq!(engine.graph().position_of("a"), Point::new(300.0, 280.0));
    assert_eq!(engine.graph().position_of("b"), Point::new(500.0, 280.0));
    assert_eq!(engine.graph().position_of("root"), Point::new(400.0, 100.0));
    assert_eq!(engine.graph().selected_ids(), vec!["a", "b"]);
}

#[test]
fn test_dragging_unselected_node_moves_only_it() {
    let (mut engine, _) = recording_engine(&plans_map(), EngineConfig::default());
    click_node(&mut engine, "a");

    drag_node(&mut engine, "b", Point::ZERO, &[Point::new(10.0, 0.0)]);

    assert_eq!(engine.graph().position_of("a"), Point::new(300.0, 250.0));
    assert_eq!(engine.graph().position_of("b"), Point::new(510.0, 250.0));
}

#[test]
fn test_edges_follow_dragged_nodes() {
    let (mut engine, _) = recording_engine(&plans_map(), EngineConfig::default());

    drag_node(&mut engine, "a", Point::ZERO, &[Point::new(-100.0, 50.0)]);

    let graph = engine.graph();
    for edge in graph.edges() {
        assert_eq!(
            edge.points,
            [graph.position_of(&edge.source), graph.position_of(&edge.target)]
        );
    }
    let into_a = graph.edges().iter().find(|e| e.target == "a").unwrap();
    assert_eq!(into_a.points[1], Point::new(200.0, 300.0));
}

#[test]
fn test_edge_highlight_needs_both_ends_selected() {
    let (mut engine, _) = recording_engine(&plans_map(), EngineConfig::default());
    click_node(&mut engine, "a");

    let highlighted = |engine: &mindmap_canvas::CanvasEngine| {
        engine
            .graph()
            .edges()
            .iter()
            .filter(|e| engine.graph().is_edge_highlighted(e))
            .map(|e| (e.source.clone(), e.target.clone()))
            .collect::<Vec<_>>()
    };
    assert!(highlighted(&engine).is_empty());

    click_node(&mut engine, "a1");
    assert_eq!(highlighted(&engine), vec![("a".to_string(), "a1".to_string())]);
}

#[test]
fn test_debounce_coalesces_burst_into_one_save() {
    let (mut engine, saves) = recording_engine(&single_node_map(), EngineConfig::default());

    engine.on_pointer_down(PointerTarget::Node("n".into()), Point::ZERO);
    for step in 1..=5u64 {
        engine.tick(ms(step * 150));
        engine.on_pointer_move(Point::new(step as f32 * 10.0, 0.0));
    }
    engine.on_pointer_up();

    assert_eq!(engine.pending_save_at(), Some(ms(1_750)));
    engine.tick(ms(1_749));
    assert_eq!(saves.borrow().len(), 0);

    assert!(engine.tick(ms(1_750)));
    assert!(!engine.tick(ms(5_000)));
    let saves = saves.borrow();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].style.as_ref().unwrap().x, Some(60.0));
}

#[test]
fn test_periodic_save_without_edits() {
    let (mut engine, saves) = recording_engine(&plans_map(), EngineConfig::default());

    engine.tick(ms(29_999));
    assert_eq!(saves.borrow().len(), 0);
    engine.tick(ms(30_000));
    engine.tick(ms(59_000));
    engine.tick(ms(60_000));

    assert_eq!(saves.borrow().len(), 2);
    assert_eq!(saves.borrow()[1], saves.borrow()[0]);
}

#[test]
fn test_simultaneous_triggers_save_once() {
    let (mut engine, saves) = recording_engine(&plans_map(), EngineConfig::default());

    engine.tick(ms(29_500));
    engine.recolor("a", Some("#bbdefb".to_string()));
    engine.clear_events();
    engine.tick(ms(31_000));

    assert_eq!(saves.borrow().len(), 1);
    assert_matches!(
        &engine.events()[0].event,
        EventType::Saved { triggers, root_id } if root_id == "root"
            && triggers == &vec![SaveTrigger::Debounced, SaveTrigger::Periodic]
    );
}

#[test]
fn test_custom_autosave_timing() {
    let config = EngineConfig {
        autosave: AutosaveConfig {
            debounce_ms: 200,
            period_ms: 5_000,
        },
        ..EngineConfig::default()
    };
    let (mut engine, saves) = recording_engine(&plans_map(), config);

    engine.on_double_click("b");
    engine.on_text_commit("Money");
    engine.tick(ms(200));
    assert_eq!(saves.borrow().len(), 1);
    assert_eq!(saves.borrow()[0].find("b").unwrap().text, "Money");

    engine.tick(ms(5_000));
    assert_eq!(saves.borrow().len(), 2);
}

#[test]
fn test_read_only_blocks_mutation_but_not_navigation() {
    let config = EngineConfig::default().read_only(true);
    let (mut engine, saves) = recording_engine(&plans_map(), config);

    drag_node(&mut engine, "a", Point::ZERO, &[Point::new(40.0, 40.0)]);
    assert_eq!(engine.graph().position_of("a"), Point::new(300.0, 250.0));
    assert!(engine.selection().is_empty());

    assert!(!engine.on_double_click("a"));
    assert!(!engine.recolor("a", Some("#ffcdd2".to_string())));
    click_node(&mut engine, "a");
    assert!(engine.delete_selected().is_empty());
    assert!(engine.graph().is_selected("a"));

    engine.on_pointer_down(PointerTarget::Background, Point::ZERO);
    engine.on_pointer_move(Point::new(-30.0, 10.0));
    engine.on_pointer_up();
    assert_eq!(engine.pan_offset(), Point::new(-30.0, 10.0));

    engine.tick(ms(10_000));
    assert_eq!(saves.borrow().len(), 0);
    assert_eq!(engine.pending_save_at(), None);
}

#[test]
fn test_pointer_leave_cancels_click() {
    let (mut engine, _) = recording_engine(&plans_map(), EngineConfig::default());

    engine.on_pointer_down(PointerTarget::Node("a".into()), Point::ZERO);
    engine.on_pointer_leave();
    engine.on_pointer_up();

    assert!(engine.selection().is_empty());
    assert_eq!(engine.mode(), InteractionMode::Idle);
}

#[test]
fn test_stale_node_id_is_ignored() {
    let (mut engine, _) = recording_engine(&plans_map(), EngineConfig::default());

    engine.on_pointer_down(PointerTarget::Node("gone".into()), Point::ZERO);
    assert!(!engine.on_pointer_move(Point::new(50.0, 50.0)));
    engine.on_pointer_up();

    assert_eq!(engine.graph().node_count(), 4);
    assert!(!engine.on_double_click("gone"));
    assert_eq!(engine.pending_save_at(), None);
}

#[test]
fn test_delete_then_save() {
    let (mut engine, saves) = recording_engine(&plans_map(), EngineConfig::default());
    click_node(&mut engine, "a");

    assert_eq!(engine.delete_selected(), vec!["a".to_string()]);
    engine.tick(ms(1_000));

    let saved = saves.borrow()[0].clone();
    assert_eq!(saved.id, "virtual-root");
    let roots: Vec<&str> = saved.children.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(roots, vec!["root", "a1"]);
}

#[test]
fn test_missing_save_callback_is_silent() {
    let (mut engine, saves) = recording_engine(&plans_map(), EngineConfig::default());
    engine.clear_save_callback();

    engine.recolor("a", None);
    assert!(!engine.tick(ms(1_000)));
    assert!(!engine.save_now());
    assert!(saves.borrow().is_empty());
}

#[test]
fn test_shutdown_stops_timers() {
    let (mut engine, saves) = recording_engine(&plans_map(), EngineConfig::default());
    engine.recolor("a", Some("#ffcdd2".to_string()));

    engine.shutdown();
    engine.tick(ms(100_000));
    engine.recolor("b", None);
    engine.tick(ms(200_000));

    assert!(saves.borrow().is_empty());
    assert!(engine.is_torn_down());
    assert!(engine
        .events()
        .iter()
        .any(|e| matches!(e.event, EventType::TornDown)));
}

#[test]
fn test_reload_resets_interaction_state() {
    let (mut engine, saves) = recording_engine(&plans_map(), EngineConfig::default());
    click_node(&mut engine, "a");
    engine.on_double_click("b");
    engine.on_pointer_down(PointerTarget::Background, Point::ZERO);
    engine.on_pointer_move(Point::new(25.0, 25.0));
    engine.tick(ms(4_000));

    engine.load(&PersistedNode::new("fresh", "Fresh"));

    assert_eq!(engine.graph().node_count(), 1);
    assert!(engine.selection().is_empty());
    assert_eq!(engine.edit_focus(), None);
    assert_eq!(engine.mode(), InteractionMode::Idle);
    assert_eq!(engine.pan_offset(), Point::ZERO);
    assert_eq!(engine.graph().position_of("fresh"), Point::new(400.0, 300.0));

    engine.tick(ms(33_999));
    assert!(saves.borrow().is_empty());
    engine.tick(ms(34_000));
    assert_eq!(saves.borrow()[0].id, "fresh");
}
