//! 单元测试共用的对局搭建工具。

use super::{
    board::{Role, SensorSnapshot},
    card::CardInstance,
    catalog::CardId,
    config::MatchConfig,
    state::GameState,
};

pub fn snapshot_with(placements: &[(Role, CardId)]) -> SensorSnapshot {
    placements
        .iter()
        .fold(SensorSnapshot::default(), |snapshot, (role, card_id)| {
            snapshot.with_card_at(*card_id, *role)
        })
}

/// 以默认配置开局，并把卡牌放到指定槽位上。
pub fn placed(placements: &[(Role, CardId)]) -> GameState {
    placed_with(MatchConfig::default(), placements)
}

pub fn placed_with(config: MatchConfig, placements: &[(Role, CardId)]) -> GameState {
    let mut state = GameState::new(config);
    let snapshot = snapshot_with(placements);
    let config = state.config.clone();
    state.board.refresh(&snapshot, &config);
    for (role, card_id) in placements {
        assert_eq!(
            state.board.occupant_of(*role),
            Some(*card_id),
            "fixture failed to place card {card_id} at {role}"
        );
    }
    state
}

pub fn card(state: &GameState, card_id: CardId) -> &CardInstance {
    state
        .board
        .card(card_id)
        .expect("fixture card should exist")
}
