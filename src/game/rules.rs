use serde::{Deserialize, Serialize};

use super::{
    board::SensorSnapshot,
    combat::CombatResolver,
    effects::EffectResolver,
    state::{GameEvent, GamePhase, GameState, IntegrityError, Side, VictoryState},
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[serde(tag = "type")]
pub enum RuleError {
    #[error("the match is already over")]
    GameFinished,
    #[error("it is not {side}'s turn")]
    NotPlayerTurn { side: Side },
    #[error("destroyed cards must be removed from the board first")]
    CleanupPending,
    #[error("invalid sensor snapshot: {reason}")]
    InvalidSnapshot { reason: String },
    #[error("invalid match config: {reason}")]
    InvalidConfig { reason: String },
    #[error("unknown player number {value}")]
    UnknownSide { value: u8 },
    #[error("state integrity violated: {error}")]
    IntegrityViolation { error: IntegrityError },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleResolution {
    pub state: GameState,
    pub events: Vec<GameEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub victory: Option<VictoryState>,
}

impl RuleResolution {
    pub fn new(state: GameState, mut events: Vec<GameEvent>) -> Self {
        let victory = state.match_state.outcome.clone();
        if let Some(ref outcome) = victory {
            let has_event = events
                .iter()
                .any(|event| matches!(event, GameEvent::GameWon { .. }));
            if !has_event {
                events.push(GameEvent::GameWon {
                    winner: outcome.winner,
                    reason: outcome.reason.clone(),
                });
            }
        }

        Self {
            state,
            events,
            victory,
        }
    }
}

/// 回合状态机：每帧刷新桌面，收到结束回合信号时依次结算陷阱、魔法与战斗。
#[derive(Debug, Default)]
pub struct RuleEngine {
    effects: EffectResolver,
    combat: CombatResolver,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self {
            effects: EffectResolver::new(),
            combat: CombatResolver::new(),
        }
    }

    fn ensure_integrity(state: &GameState) -> Result<(), RuleError> {
        state
            .integrity_check()
            .map_err(|error| RuleError::IntegrityViolation { error })
    }

    fn ensure_snapshot(snapshot: &SensorSnapshot) -> Result<(), RuleError> {
        if let Some(index) = snapshot.role_points.iter().position(|point| !point.is_finite()) {
            return Err(RuleError::InvalidSnapshot {
                reason: format!("role point {index} is not finite"),
            });
        }
        if let Some(sighting) = snapshot
            .cards
            .iter()
            .find(|sighting| !sighting.position.is_finite())
        {
            return Err(RuleError::InvalidSnapshot {
                reason: format!("card {} has a non-finite position", sighting.card_id),
            });
        }
        Ok(())
    }

    fn ensure_can_end_turn(state: &GameState, side: Side) -> Result<(), RuleError> {
        if state.is_finished() {
            return Err(RuleError::GameFinished);
        }
        if state.phase() == GamePhase::Cleanup {
            return Err(RuleError::CleanupPending);
        }
        if state.active_player() != side {
            return Err(RuleError::NotPlayerTurn { side });
        }
        Self::ensure_integrity(state)
    }

    /// 处理一帧识别结果。当前玩家举起结束标记时会在本帧内完成回合结算。
    pub fn tick(
        &self,
        state: &mut GameState,
        snapshot: &SensorSnapshot,
    ) -> Result<Vec<GameEvent>, RuleError> {
        Self::ensure_snapshot(snapshot)?;
        Self::ensure_integrity(state)?;

        let config = state.config.clone();
        let mut events = state.board.refresh(snapshot, &config);

        if state.phase() == GamePhase::Cleanup && state.board.destroyed_in_view().is_empty() {
            log::info!("board cleared, play resumes");
            state.match_state.phase = GamePhase::InProgress;
            state.record_event(GameEvent::CleanupFinished);
            events.push(GameEvent::CleanupFinished);
        }

        let raised: Vec<Side> = events
            .iter()
            .filter_map(|event| match event {
                GameEvent::PassMarkerRaised { side } => Some(*side),
                _ => None,
            })
            .collect();
        for side in raised {
            match self.end_turn(state, side) {
                Ok(turn_events) => events.extend(turn_events),
                Err(error) => log::debug!("ignoring end-turn signal from {side}: {error}"),
            }
        }

        Ok(events)
    }

    pub fn end_turn(&self, state: &mut GameState, side: Side) -> Result<Vec<GameEvent>, RuleError> {
        Self::ensure_can_end_turn(state, side)?;

        let attacker = side;
        let defender = attacker.opponent();
        let turn = state.match_state.turn;
        log::info!("{attacker} ends turn {turn}");

        let mut events = self.effects.resolve_trap(state, defender);
        events.extend(self.effects.resolve_spell(state, attacker));
        events.extend(self.combat.resolve(state, attacker));

        state.match_state.active_player = defender;
        state.match_state.turn += 1;

        events.extend(self.effects.discard_spent_spell(state, attacker));
        events.extend(self.effects.advance_durations(state, turn));

        state.board.clear_triggered();
        events.push(GameEvent::TurnEnded {
            side: attacker,
            turn,
        });

        if let Some(outcome) = state.evaluate_victory(attacker) {
            log::info!("{} has won", outcome.winner);
            events.push(GameEvent::GameWon {
                winner: outcome.winner,
                reason: outcome.reason,
            });
        } else {
            let lingering = state.board.destroyed_in_view();
            if lingering.is_empty() {
                state.match_state.phase = GamePhase::InProgress;
            } else {
                log::info!("waiting for {} destroyed cards to be removed", lingering.len());
                state.match_state.phase = GamePhase::Cleanup;
                events.push(GameEvent::CleanupStarted { cards: lingering });
            }
        }

        state.match_state.event_log.extend(events.iter().cloned());
        Ok(events)
    }

    pub fn is_cleanup_pending(state: &GameState) -> bool {
        state.phase() == GamePhase::Cleanup
    }

    pub fn check_victory(state: &mut GameState) -> Option<VictoryState> {
        let attacker = state.active_player().opponent();
        state.evaluate_victory(attacker)
    }
}
