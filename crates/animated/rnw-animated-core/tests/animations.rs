mod common;

use std::sync::{Arc, Mutex};

use common::{approx, end_recorder, manager, ms, tag, Manager};
use rnw_animated_core::{AnimatedError, AnimationConfig, AnimationId};
use serde_json::{json, Value as JsonValue};

fn with_value_node(value: f64) -> Manager {
    let mut m = manager();
    m.create_animated_node(tag(1), &json!({ "type": "value", "value": value }))
        .unwrap();
    m
}

fn fixture(name: &str) -> JsonValue {
    rnw_animated_test_fixtures::animations::load(name).expect("animation fixture")
}

#[test]
fn frames_step_through_samples_and_finish_at_the_last_index() {
    let mut m = with_value_node(0.0);
    let log = Arc::new(Mutex::new(Vec::new()));
    m.start_animating_node(
        AnimationId(1),
        tag(1),
        &json!({ "type": "frames", "frames": [0, 0.5, 1], "toValue": 100 }),
        Some(end_recorder(&log, "fade")),
    )
    .unwrap();

    // 60 samples per second: 0 ms, 20 ms and 40 ms land on indices 0, 1 and 2.
    let times = [1_000, 1_020, 1_040];
    let mut values = Vec::new();
    for (i, t) in times.iter().enumerate() {
        let stats = m.run_updates(ms(*t)).unwrap();
        values.push(m.node_value(tag(1)).unwrap());
        let finished_now = i == times.len() - 1;
        assert_eq!(stats.finished_animations, usize::from(finished_now));
    }
    assert_eq!(values, vec![0.0, 50.0, 100.0]);
    assert_eq!(m.active_animation_count(), 0);
    assert_eq!(*log.lock().unwrap(), vec![("fade", true)]);
}

#[test]
fn frames_fixture_runs_linearly() {
    let mut m = with_value_node(0.0);
    m.start_animating_node(AnimationId(1), tag(1), &fixture("frames-linear"), None)
        .unwrap();
    let mut t = 0;
    let mut values = Vec::new();
    while m.has_active_animations() {
        m.run_updates(ms(t)).unwrap();
        values.push(m.node_value(tag(1)).unwrap());
        t += 17;
    }
    assert_eq!(values, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
}

#[test]
fn spring_fixture_settles_and_reports_finished() {
    let mut m = with_value_node(0.0);
    let log = Arc::new(Mutex::new(Vec::new()));
    m.start_animating_node(
        AnimationId(7),
        tag(1),
        &fixture("spring-bounce"),
        Some(end_recorder(&log, "spring")),
    )
    .unwrap();

    let mut peak: f64 = 0.0;
    let mut t = 0;
    while m.has_active_animations() {
        m.run_updates(ms(t)).unwrap();
        peak = peak.max(m.node_value(tag(1)).unwrap());
        t += 16;
        assert!(t < 60_000, "spring never settled");
    }
    assert!(peak > 1.0, "an underdamped spring should overshoot");
    assert_eq!(m.node_value(tag(1)).unwrap(), 1.0);
    assert_eq!(*log.lock().unwrap(), vec![("spring", true)]);
}

#[test]
fn zero_tension_spring_rests_where_friction_stops_it() {
    let mut m = with_value_node(0.0);
    m.start_animating_node(
        AnimationId(1),
        tag(1),
        &json!({
            "type": "spring", "friction": 500, "tension": 0, "toValue": 100,
            "initialVelocity": 1
        }),
        None,
    )
    .unwrap();
    m.run_updates(ms(0)).unwrap();
    assert_eq!(m.active_animation_count(), 1);
    m.run_updates(ms(16)).unwrap();
    assert_eq!(m.active_animation_count(), 0);
    let value = m.node_value(tag(1)).unwrap();
    approx(value, 1.0 / 500.0, 1e-3);
}

#[test]
fn decay_fixture_glides_to_rest() {
    let mut m = with_value_node(10.0);
    m.start_animating_node(AnimationId(1), tag(1), &fixture("decay-fling"), None)
        .unwrap();
    let mut last = 10.0;
    let mut t = 0;
    while m.has_active_animations() {
        m.run_updates(ms(t)).unwrap();
        let v = m.node_value(tag(1)).unwrap();
        assert!(v >= last, "decay must be monotone for a positive fling");
        last = v;
        t += 16;
        assert!(t < 60_000, "decay never finished");
    }
    // Asymptote: 10 + 1.5 / 0.003 = 510.
    assert!(last > 500.0 && last < 510.0, "rested at {last}");
}

#[test]
fn stop_fires_callback_with_not_finished_inline() {
    let mut m = with_value_node(0.0);
    let log = Arc::new(Mutex::new(Vec::new()));
    m.start_animating_node(
        AnimationId(1),
        tag(1),
        &fixture("spring-bounce"),
        Some(end_recorder(&log, "a")),
    )
    .unwrap();
    m.run_updates(ms(0)).unwrap();

    m.stop_animation(AnimationId(1));
    assert_eq!(*log.lock().unwrap(), vec![("a", false)]);
    assert_eq!(m.active_animation_count(), 0);

    // A late stop after completion is expected and silent.
    m.stop_animation(AnimationId(1));
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[test]
fn finished_callbacks_fire_in_start_order() {
    let mut m = with_value_node(0.0);
    m.create_animated_node(tag(2), &json!({ "type": "value", "value": 0 }))
        .unwrap();
    let log = Arc::new(Mutex::new(Vec::new()));
    let short = json!({ "type": "frames", "frames": [0, 1], "toValue": 1 });
    let long = json!({ "type": "frames", "frames": [0, 0.5, 0.7, 1], "toValue": 1 });

    m.start_animating_node(AnimationId(1), tag(1), &short, Some(end_recorder(&log, "first")))
        .unwrap();
    m.start_animating_node(AnimationId(2), tag(2), &long, Some(end_recorder(&log, "long")))
        .unwrap();
    m.start_animating_node(AnimationId(3), tag(2), &short, Some(end_recorder(&log, "third")))
        .unwrap();

    m.run_updates(ms(0)).unwrap();
    let stats = m.run_updates(ms(20)).unwrap();
    assert_eq!(stats.finished_animations, 2);
    assert_eq!(*log.lock().unwrap(), vec![("first", true), ("third", true)]);
    assert_eq!(m.active_animation_count(), 1);
}

#[test]
fn concurrent_drivers_on_one_node_last_in_list_wins() {
    let mut m = with_value_node(0.0);
    m.start_animating_node(
        AnimationId(1),
        tag(1),
        &json!({ "type": "frames", "frames": [0, 0, 1], "toValue": 10 }),
        None,
    )
    .unwrap();
    m.start_animating_node(
        AnimationId(2),
        tag(1),
        &json!({ "type": "frames", "frames": [0, 1, 1], "toValue": 20 }),
        None,
    )
    .unwrap();
    m.run_updates(ms(0)).unwrap();
    m.run_updates(ms(17)).unwrap();
    assert_eq!(m.node_value(tag(1)).unwrap(), 20.0);
    assert_eq!(m.active_animation_count(), 2);
}

#[test]
fn infinite_iterations_keep_running() {
    let mut m = with_value_node(0.0);
    m.start_animating_node(
        AnimationId(1),
        tag(1),
        &json!({ "type": "frames", "frames": [0, 1], "toValue": 5, "iterations": -1 }),
        None,
    )
    .unwrap();
    for frame in 0..50 {
        m.run_updates(ms(frame * 20)).unwrap();
    }
    assert_eq!(m.active_animation_count(), 1);
}

#[test]
fn start_rejects_bad_targets_and_configs() {
    let mut m = with_value_node(0.0);
    m.create_animated_node(tag(2), &json!({ "type": "props", "props": {} }))
        .unwrap();
    let frames = json!({ "type": "frames", "frames": [0, 1], "toValue": 1 });

    assert_eq!(
        m.start_animating_node(AnimationId(1), tag(9), &frames, None)
            .unwrap_err(),
        AnimatedError::NodeNotFound { tag: tag(9) }
    );
    assert!(matches!(
        m.start_animating_node(AnimationId(1), tag(2), &frames, None)
            .unwrap_err(),
        AnimatedError::WrongNodeType { .. }
    ));
    assert_eq!(
        m.start_animating_node(AnimationId(1), tag(1), &json!({ "type": "timing" }), None)
            .unwrap_err(),
        AnimatedError::UnknownAnimationType {
            type_name: "timing".into()
        }
    );
    assert!(matches!(
        m.start_animating_node(
            AnimationId(1),
            tag(1),
            &json!({ "type": "decay", "velocity": 1, "deceleration": 1 }),
            None
        )
        .unwrap_err(),
        AnimatedError::InvalidConfig { .. }
    ));
    assert_eq!(m.active_animation_count(), 0);
}

#[test]
fn set_value_does_not_stop_a_running_animation() {
    let mut m = with_value_node(0.0);
    m.start_animating_node(AnimationId(1), tag(1), &fixture("spring-bounce"), None)
        .unwrap();
    m.run_updates(ms(0)).unwrap();
    m.set_animated_node_value(tag(1), 0.5).unwrap();
    m.run_updates(ms(16)).unwrap();
    assert_eq!(m.active_animation_count(), 1);
}

#[test]
fn tracking_node_retargets_its_animation() {
    let mut m = manager();
    m.create_animated_node(tag(1), &json!({ "type": "value", "value": 0 }))
        .unwrap();
    m.create_animated_node(tag(2), &json!({ "type": "value", "value": 0 }))
        .unwrap();
    m.create_animated_node(
        tag(3),
        &json!({
            "type": "tracking", "animationId": 5, "toValue": 1, "value": 2,
            "animationConfig": { "type": "frames", "frames": [0, 1], "toValue": 0 }
        }),
    )
    .unwrap();
    m.connect_animated_nodes(tag(1), tag(3)).unwrap();

    let log = Arc::new(Mutex::new(Vec::new()));
    m.start_animating_node(
        AnimationId(5),
        tag(2),
        &json!({ "type": "frames", "frames": [0, 1], "toValue": 0 }),
        Some(end_recorder(&log, "tracking")),
    )
    .unwrap();

    m.set_animated_node_value(tag(1), 42.0).unwrap();
    m.run_updates(ms(0)).unwrap();
    // Restarted in place: still one animation, callback carried over, not fired.
    assert_eq!(m.active_animation_count(), 1);
    assert!(log.lock().unwrap().is_empty());

    m.run_updates(ms(100)).unwrap();
    m.run_updates(ms(200)).unwrap();
    assert_eq!(m.node_value(tag(2)).unwrap(), 42.0);
    assert_eq!(*log.lock().unwrap(), vec![("tracking", true)]);
}

#[test]
fn typed_configs_round_trip_through_serde() {
    let config = AnimationConfig::from_json(&fixture("spring-bounce")).unwrap();
    let encoded = serde_json::to_value(&config).unwrap();
    assert_eq!(AnimationConfig::from_json(&encoded).unwrap(), config);
}
