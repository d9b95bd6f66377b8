#![cfg(target_arch = "wasm32")]

use marker_duel::{DuelEngine, GameState, RuleResolution, SensorSnapshot, Side};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

use marker_duel::game::board::Role;

fn facing_snapshot() -> SensorSnapshot {
    SensorSnapshot::default()
        .with_card_at(1, Role::monster(Side::P1, 0))
        .with_card_at(9, Role::monster(Side::P2, 0))
}

fn tick(engine: &mut DuelEngine, snapshot: &SensorSnapshot) -> RuleResolution {
    let json = serde_json::to_string(snapshot).expect("snapshot should serialize");
    let resolution = engine
        .tick_json(&json)
        .unwrap_or_else(|_| panic!("tick should succeed"));
    serde_json::from_str(&resolution).expect("resolution should parse")
}

#[wasm_bindgen_test]
fn pass_marker_drives_a_full_turn() {
    let mut engine = DuelEngine::new(None).expect("engine should start");
    tick(&mut engine, &facing_snapshot());

    let resolution = tick(&mut engine, &facing_snapshot().with_pass_marker(Side::P1));

    assert_eq!(resolution.state.active_player(), Side::P2);
    assert_eq!(resolution.state.life(Side::P1), 460);
    assert!(engine.is_cleanup_pending());
    assert_eq!(engine.active_player(), 2);

    let view = engine.view_json().expect("view should serialize");
    assert!(view.contains("Bone Archer"));
}

#[wasm_bindgen_test]
fn invalid_config_is_rejected() {
    assert!(DuelEngine::new(Some(r#"{ "starting_life": -5 }"#.to_string())).is_err());
}

#[wasm_bindgen_test]
fn free_functions_share_the_same_rules() {
    let state = marker_duel::create_game_state(JsValue::UNDEFINED).expect("state should build");
    let snapshot =
        serde_wasm_bindgen::to_value(&facing_snapshot()).expect("snapshot should convert");
    let resolution = marker_duel::tick(state, snapshot).expect("tick should succeed");
    let resolution: RuleResolution =
        serde_wasm_bindgen::from_value(resolution).expect("resolution should convert");

    let state = serde_wasm_bindgen::to_value(&resolution.state).expect("state should convert");
    let ended = marker_duel::end_turn(state, 1).expect("end turn should succeed");
    let ended: RuleResolution =
        serde_wasm_bindgen::from_value(ended).expect("resolution should convert");
    assert_eq!(ended.state.life(Side::P2), 340);

    let state = serde_wasm_bindgen::to_value(&ended.state).expect("state should convert");
    assert!(marker_duel::end_turn(state, 3).is_err());
}

#[wasm_bindgen_test]
fn saved_state_can_be_restored() {
    let mut engine = DuelEngine::new(None).expect("engine should start");
    tick(&mut engine, &facing_snapshot());
    let saved = engine.state_json().expect("state should serialize");

    let mut restored = DuelEngine::new(None).expect("engine should start");
    restored.set_state_json(&saved).expect("state should load");
    let restored_state: GameState =
        serde_json::from_str(&restored.state_json().expect("state should serialize"))
            .expect("state should parse");
    let saved_state: GameState = serde_json::from_str(&saved).expect("state should parse");
    assert_eq!(restored_state, saved_state);

    assert!(marker_duel::card_catalog().is_ok());
}
