pub mod game;
pub mod utils;

use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

pub use game::{
    BoardState, CardCategory, CardDefinition, CardId, CardInstance, GameEvent, GamePhase,
    GameState, IntegrityError, MatchConfig, MatchView, Role, RuleEngine, RuleError,
    RuleResolution, SensorSnapshot, Side, VictoryReason, VictoryState,
};

#[cfg(all(feature = "wee_alloc", target_arch = "wasm32"))]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
    utils::log::init(log::LevelFilter::Info);
}

/// 调整控制台日志级别（"error"、"warn"、"info"、"debug"、"trace"）。
#[wasm_bindgen(js_name = "setLogLevel")]
pub fn set_log_level(level: Option<String>) {
    utils::log::init(utils::log::parse_level(level.as_deref()));
}

fn to_js_error(error: RuleError) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn make_resolution_json(resolution: RuleResolution) -> Result<String, JsValue> {
    serde_json::to_string(&resolution).map_err(serde_to_js_error)
}

fn resolution_from_events(state: &GameState, events: Vec<GameEvent>) -> RuleResolution {
    RuleResolution::new(state.clone(), events)
}

fn side_from_number(value: u8) -> Result<Side, RuleError> {
    Side::from_number(value).ok_or(RuleError::UnknownSide { value })
}

fn parse_state_json(json: &str) -> Result<GameState, JsValue> {
    let state: GameState = serde_json::from_str(json).map_err(serde_to_js_error)?;
    state
        .integrity_check()
        .map_err(|error| to_js_error(RuleError::IntegrityViolation { error }))?;
    Ok(state)
}

fn config_from_js(config: JsValue) -> Result<MatchConfig, JsValue> {
    if config.is_undefined() || config.is_null() {
        return Ok(MatchConfig::default());
    }
    let config: MatchConfig = from_value(config).map_err(JsValue::from)?;
    config.validate().map_err(to_js_error)?;
    Ok(config)
}

/// 一局对战的宿主对象，由渲染层每帧调用 `tick_json`。
#[wasm_bindgen]
pub struct DuelEngine {
    state: GameState,
    engine: RuleEngine,
}

#[wasm_bindgen]
impl DuelEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<DuelEngine, JsValue> {
        let config = match config_json {
            Some(json) => MatchConfig::from_json(&json).map_err(to_js_error)?,
            None => MatchConfig::default(),
        };
        Ok(DuelEngine {
            state: GameState::new(config),
            engine: RuleEngine::new(),
        })
    }

    pub fn tick_json(&mut self, snapshot_json: &str) -> Result<String, JsValue> {
        let snapshot: SensorSnapshot =
            serde_json::from_str(snapshot_json).map_err(serde_to_js_error)?;
        let events = self
            .engine
            .tick(&mut self.state, &snapshot)
            .map_err(to_js_error)?;
        make_resolution_json(resolution_from_events(&self.state, events))
    }

    /// 以当前玩家的身份结束回合（不依赖结束标记）。
    pub fn end_turn(&mut self) -> Result<String, JsValue> {
        let side = self.state.active_player();
        let events = self
            .engine
            .end_turn(&mut self.state, side)
            .map_err(to_js_error)?;
        make_resolution_json(resolution_from_events(&self.state, events))
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state).map_err(serde_to_js_error)
    }

    pub fn set_state_json(&mut self, json: &str) -> Result<(), JsValue> {
        self.state = parse_state_json(json)?;
        Ok(())
    }

    pub fn view_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&MatchView::from_state(&self.state)).map_err(serde_to_js_error)
    }

    pub fn is_cleanup_pending(&self) -> bool {
        RuleEngine::is_cleanup_pending(&self.state)
    }

    pub fn active_player(&self) -> u8 {
        self.state.active_player().number()
    }
}

/// 按配置（可省略）创建一局新的对战状态。
#[wasm_bindgen(js_name = "createGameState")]
pub fn create_game_state(config: JsValue) -> Result<JsValue, JsValue> {
    let config = config_from_js(config)?;
    to_value(&GameState::new(config)).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "tick")]
pub fn tick(state: JsValue, snapshot: JsValue) -> Result<JsValue, JsValue> {
    let mut state: GameState = from_value(state).map_err(JsValue::from)?;
    let snapshot: SensorSnapshot = from_value(snapshot).map_err(JsValue::from)?;
    let engine = RuleEngine::new();
    match engine.tick(&mut state, &snapshot) {
        Ok(events) => to_value(&RuleResolution::new(state, events)).map_err(JsValue::from),
        Err(error) => Err(to_js_error(error)),
    }
}

#[wasm_bindgen(js_name = "endTurn")]
pub fn end_turn(state: JsValue, player: u8) -> Result<JsValue, JsValue> {
    let mut state: GameState = from_value(state).map_err(JsValue::from)?;
    let side = side_from_number(player).map_err(to_js_error)?;
    let engine = RuleEngine::new();
    match engine.end_turn(&mut state, side) {
        Ok(events) => to_value(&RuleResolution::new(state, events)).map_err(JsValue::from),
        Err(error) => Err(to_js_error(error)),
    }
}

#[wasm_bindgen(js_name = "isCleanupPending")]
pub fn is_cleanup_pending(state: JsValue) -> Result<bool, JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    Ok(RuleEngine::is_cleanup_pending(&state))
}

#[wasm_bindgen(js_name = "validateState")]
pub fn validate_state(state: JsValue) -> Result<(), JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    state
        .integrity_check()
        .map_err(|error| to_js_error(RuleError::IntegrityViolation { error }))?;
    Ok(())
}

#[wasm_bindgen(js_name = "matchView")]
pub fn match_view(state: JsValue) -> Result<JsValue, JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    to_value(&MatchView::from_state(&state)).map_err(JsValue::from)
}

/// 返回 30 张卡牌的静态定义。
#[wasm_bindgen(js_name = "cardCatalog")]
pub fn card_catalog() -> Result<JsValue, JsValue> {
    to_value(&game::catalog::catalog()).map_err(JsValue::from)
}

/// 把识别层报告的标记编号换算成卡牌编号；未知标记返回 `undefined`。
#[wasm_bindgen(js_name = "cardForMarker")]
pub fn card_for_marker(marker: u32) -> Option<CardId> {
    game::catalog::marker_to_card(marker)
}

#[cfg(feature = "console_error_panic_hook")]
fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
fn set_panic_hook() {}
