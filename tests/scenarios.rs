use masonry_cycle::{
    CellSize, EngineConfig, EngineSettings, Environment, GridPosition, LayoutHost, ListenerCall,
    MasonryEngine, Phase, RecordingHost, RecordingListener, RenderingEngine, Size, Span, pack,
};

type Engine = MasonryEngine<String, RecordingHost<String>, RecordingListener<String>>;

fn engine(count: usize, width: f32, animated: bool) -> Engine {
    let mut host = RecordingHost::new(width, Size::new(100.0, 100.0));
    for i in 0..count {
        host.add_tile(format!("tile-{i}"), Span::unit());
    }
    let env = Environment::new(RenderingEngine::Gecko, 60.0);
    let settings = EngineSettings {
        environment: if animated { env } else { env.automated() },
        ..EngineSettings::default()
    };
    let mut engine = MasonryEngine::new(host, RecordingListener::new(), EngineConfig::with_settings(settings));
    engine.setup(true, false);
    engine.listener_mut().clear();
    engine
}

fn drive(engine: &mut Engine) {
    for _ in 0..64 {
        if !engine.is_in_layout_cycle() && engine.host().pending_deferred().is_empty() {
            return;
        }
        for task in engine.host_mut().take_deferred() {
            engine.run_deferred(task);
        }
        let phase = engine.phase();
        for tile in engine.awaiting_transitions() {
            engine.notify_transition_complete(&tile, phase);
        }
    }
    panic!("engine never returned to idle");
}

#[test]
fn three_columns_wrap_fourth_tile() {
    let tiles: Vec<(&str, Span)> = ["a", "b", "c", "d"].iter().map(|t| (*t, Span::unit())).collect();
    let result = pack(&tiles, CellSize::new(100.0, 100.0), 300.0);
    let positions: Vec<GridPosition> = result.tiles.iter().map(|p| p.position).collect();
    assert_eq!(
        positions,
        vec![
            GridPosition::new(0, 0),
            GridPosition::new(1, 0),
            GridPosition::new(2, 0),
            GridPosition::new(0, 1),
        ]
    );
    assert_eq!(result.rows, 2);
}

#[test]
fn double_wide_tile_pushes_next_to_second_row() {
    let tiles = vec![("wide", Span::new(2, 1)), ("small", Span::unit())];
    let result = pack(&tiles, CellSize::new(100.0, 100.0), 200.0);
    assert_eq!(result.position_of(&"wide"), Some(GridPosition::new(0, 0)));
    assert_eq!(result.position_of(&"small"), Some(GridPosition::new(0, 1)));
    assert_eq!(result.rows, 2);
}

#[test]
fn every_mutation_completes_exactly_once() {
    let mut engine = engine(6, 300.0, true);

    engine.hide_tile("tile-1".to_string());
    engine.host_mut().add_tile("new-a".to_string(), Span::unit());
    engine.insert_tile("new-a".to_string(), 0);
    engine.resize_tile("tile-3".to_string(), Span::new(2, 1)).expect("resize");
    drive(&mut engine);
    assert_eq!(engine.phase(), Phase::None);

    engine.host_mut().add_tile("new-b".to_string(), Span::unit());
    engine.insert_tile("new-b".to_string(), 2);
    engine.hide_tile("tile-4".to_string());
    engine.hide_tile("tile-5".to_string());
    drive(&mut engine);

    let listener = engine.listener();
    for tile in ["new-a", "new-b"] {
        assert_eq!(listener.count(&ListenerCall::Shown(tile.to_string())), 1, "{tile}");
    }
    for tile in ["tile-1", "tile-4", "tile-5"] {
        assert_eq!(listener.count(&ListenerCall::Hidden(tile.to_string())), 1, "{tile}");
    }
    assert_eq!(
        listener.count(&ListenerCall::CycleStarting),
        listener.count(&ListenerCall::CycleEnded)
    );
    assert_eq!(engine.host().span(&"tile-3".to_string()), Span::new(2, 1));
    assert_eq!(engine.order().len(), 5);
}

#[test]
fn fast_forward_from_any_phase_reaches_idle() {
    let mut engine = engine(5, 300.0, true);
    engine.host_mut().add_tile("late".to_string(), Span::unit());
    engine.insert_tile("late".to_string(), 1);
    engine.hide_tile("tile-0".to_string());
    assert!(engine.is_in_layout_cycle());

    engine.finish_layout_cycle();

    assert!(!engine.is_in_layout_cycle());
    assert!(engine.host().pending_deferred().is_empty());
    let listener = engine.listener();
    assert_eq!(listener.count(&ListenerCall::Shown("late".to_string())), 1);
    assert_eq!(listener.count(&ListenerCall::Hidden("tile-0".to_string())), 1);
}

#[test]
fn disabled_animation_never_waits() {
    let mut engine = engine(3, 200.0, false);
    assert!(!engine.is_animation_enabled());

    engine.hide_tile("tile-0".to_string());
    assert!(!engine.is_in_layout_cycle());
    engine.host_mut().set_width(100.0);
    engine.resize_notify();
    assert!(!engine.is_in_layout_cycle());
    assert!(engine.host().pending_deferred().is_empty());
    assert_eq!(engine.last_pack().map(|p| p.rows), Some(2));
}
