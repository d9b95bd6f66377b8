use serde::Serialize;

use super::{
    board::Role,
    card::CardInstance,
    catalog::{definition, CardCategory, CardId},
    state::{GamePhase, GameState, Side},
};

/// 渲染层需要的全部文字与数值。
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct MatchView {
    pub turn: u32,
    pub active_player: Side,
    pub phase: GamePhase,
    pub players: Vec<PlayerView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanup_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_text: Option<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct PlayerView {
    pub side: Side,
    pub life: i32,
    pub life_text: String,
    pub roles: Vec<RoleView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_spell: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_trap: Option<&'static str>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct RoleView {
    pub role: Role,
    pub label: String,
    pub card: Option<CardView>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct CardView {
    pub card_id: CardId,
    pub name: &'static str,
    pub category: CardCategory,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attack_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_text: Option<String>,
}

impl CardView {
    pub fn new(card: &CardInstance) -> Self {
        let (name, description) = definition(card.card_id)
            .map(|def| (def.name, def.description))
            .unwrap_or(("Unknown", ""));
        let monster = card.is_monster();
        Self {
            card_id: card.card_id,
            name,
            category: card.category,
            description,
            attack_text: monster.then(|| format!("ATK: {}", card.current_attack)),
            health_text: monster
                .then(|| format!("HP: {}/{}", card.current_health, card.default_health)),
        }
    }
}

impl PlayerView {
    fn new(state: &GameState, side: Side) -> Self {
        let side_state = state.side(side);
        let roles = Role::ALL
            .into_iter()
            .filter(|role| role.side == side)
            .map(|role| RoleView {
                role,
                label: role.to_string(),
                card: state.board.occupant(role).map(CardView::new),
            })
            .collect();
        Self {
            side,
            life: side_state.life,
            life_text: format!("{side} Life: {}", side_state.life),
            roles,
            active_spell: side_state.spell.as_ref().map(|spell| spell.effect.code()),
            active_trap: side_state.trap.as_ref().map(|trap| trap.effect.code()),
        }
    }
}

impl MatchView {
    pub fn from_state(state: &GameState) -> Self {
        let cleanup_prompt = (state.phase() == GamePhase::Cleanup).then(|| {
            let names: Vec<&str> = state
                .board
                .destroyed_in_view()
                .into_iter()
                .filter_map(|card_id| definition(card_id).map(|def| def.name))
                .collect();
            format!("Remove destroyed cards from the board: {}", names.join(", "))
        });
        let winner_text = state
            .match_state
            .outcome
            .as_ref()
            .map(|outcome| format!("{} has won", outcome.winner));

        Self {
            turn: state.match_state.turn,
            active_player: state.active_player(),
            phase: state.phase(),
            players: Side::BOTH
                .into_iter()
                .map(|side| PlayerView::new(state, side))
                .collect(),
            cleanup_prompt,
            winner_text,
        }
    }
}

impl From<&GameState> for MatchView {
    fn from(state: &GameState) -> Self {
        Self::from_state(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{
        config::MatchConfig,
        fixtures::{placed, placed_with},
        rules::RuleEngine,
    };

    #[test]
    fn monster_texts_follow_current_values() {
        let mut state = placed(&[(Role::monster(Side::P1, 0), 1)]);
        state.board.damage(1, 40);

        let view = MatchView::from_state(&state);
        let p1 = &view.players[0];
        assert_eq!(p1.life_text, "Player 1 Life: 400");
        let drake = p1.roles[0].card.as_ref().expect("slot should show the drake");
        assert_eq!(drake.name, "Flame Drake");
        assert_eq!(drake.attack_text.as_deref(), Some("ATK: 100"));
        assert_eq!(drake.health_text.as_deref(), Some("HP: 60/100"));
        assert_eq!(p1.roles.len(), 5);
        assert!(view.cleanup_prompt.is_none());
        assert!(view.winner_text.is_none());
    }

    #[test]
    fn spell_cards_have_no_combat_texts() {
        let state = placed(&[(Role::spell(Side::P2), 11)]);
        let view = MatchView::from(&state);
        let spell = view.players[1].roles[3]
            .card
            .as_ref()
            .expect("spell slot should be filled");
        assert!(spell.attack_text.is_none());
        assert!(spell.health_text.is_none());
    }

    #[test]
    fn cleanup_prompt_names_lingering_cards() {
        let mut state = placed(&[
            (Role::monster(Side::P1, 0), 1),
            (Role::monster(Side::P2, 0), 9),
        ]);
        RuleEngine::new()
            .end_turn(&mut state, Side::P1)
            .expect("P1 should be able to end the turn");

        let view = MatchView::from_state(&state);
        assert_eq!(
            view.cleanup_prompt.as_deref(),
            Some("Remove destroyed cards from the board: Bone Archer")
        );
    }

    #[test]
    fn winner_text_is_shown_after_game_over() {
        let mut state = placed_with(
            MatchConfig::default().with_starting_life(4),
            &[
                (Role::monster(Side::P1, 0), 1),
                (Role::monster(Side::P2, 0), 9),
            ],
        );
        RuleEngine::new()
            .end_turn(&mut state, Side::P1)
            .expect("P1 should be able to end the turn");

        let view = MatchView::from_state(&state);
        assert_eq!(view.winner_text.as_deref(), Some("Player 1 has won"));
        assert_eq!(view.players[1].life_text, "Player 2 Life: -56");
    }
}
