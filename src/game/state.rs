use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::ops::{Index, IndexMut};

use super::{
    board::{BoardState, Role},
    catalog::{definition, CardId, CARD_COUNT},
    config::MatchConfig,
    effects::{ActiveSpell, ActiveTrap, SpellEffect, TrapEffect},
};

/// 对战双方。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    P1,
    P2,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::P1, Side::P2];

    pub fn opponent(self) -> Side {
        match self {
            Side::P1 => Side::P2,
            Side::P2 => Side::P1,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::P1 => 0,
            Side::P2 => 1,
        }
    }

    /// 玩家编号（1 或 2），用于 JS 接口与提示文字。
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    pub fn from_number(value: u8) -> Option<Side> {
        match value {
            1 => Some(Side::P1),
            2 => Some(Side::P2),
            _ => None,
        }
    }
}

impl Default for Side {
    fn default() -> Self {
        Side::P1
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.number())
    }
}

/// 按玩家索引的一对值，替代成对出现的 p1/p2 字段。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PerSide<T> {
    pub p1: T,
    pub p2: T,
}

impl<T> PerSide<T> {
    pub fn new(p1: T, p2: T) -> Self {
        Self { p1, p2 }
    }

    pub fn from_fn(mut f: impl FnMut(Side) -> T) -> Self {
        Self {
            p1: f(Side::P1),
            p2: f(Side::P2),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Side, &T)> {
        [(Side::P1, &self.p1), (Side::P2, &self.p2)].into_iter()
    }
}

impl<T> Index<Side> for PerSide<T> {
    type Output = T;

    fn index(&self, side: Side) -> &T {
        match side {
            Side::P1 => &self.p1,
            Side::P2 => &self.p2,
        }
    }
}

impl<T> IndexMut<Side> for PerSide<T> {
    fn index_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::P1 => &mut self.p1,
            Side::P2 => &mut self.p2,
        }
    }
}

/// 对局进度。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GamePhase {
    InProgress,
    Cleanup,
    GameOver,
}

impl Default for GamePhase {
    fn default() -> Self {
        Self::InProgress
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum VictoryReason {
    LifeDepleted { loser: Side },
    BothDepleted,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VictoryState {
    pub winner: Side,
    pub reason: VictoryReason,
}

/// 单个玩家的生命值与效果标记。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SideState {
    pub life: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spell: Option<ActiveSpell>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trap: Option<ActiveTrap>,
    #[serde(default)]
    pub no_trap: bool,
    #[serde(default)]
    pub no_magic: bool,
    #[serde(default)]
    pub no_attack: bool,
    #[serde(default)]
    pub damage_shield: bool,
    #[serde(default)]
    pub trap_ward: bool,
}

impl SideState {
    pub fn new(life: i32) -> Self {
        Self {
            life,
            ..Self::default()
        }
    }
}

/// 游戏事件流。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum GameEvent {
    RoleAssigned {
        role: Role,
        card_id: CardId,
    },
    RoleCleared {
        role: Role,
        card_id: CardId,
    },
    PassMarkerRaised {
        side: Side,
    },
    TrapActivated {
        side: Side,
        card_id: CardId,
        effect: TrapEffect,
    },
    TrapBlocked {
        side: Side,
        card_id: CardId,
        effect: TrapEffect,
    },
    TrapExpired {
        side: Side,
        card_id: CardId,
        effect: TrapEffect,
    },
    SpellCast {
        side: Side,
        card_id: CardId,
        effect: SpellEffect,
    },
    SpellDiscarded {
        side: Side,
        card_id: CardId,
        effect: SpellEffect,
    },
    AttackResolved {
        side: Side,
        attacker_id: CardId,
        defender_id: CardId,
        damage: i32,
    },
    AttacksNegated {
        side: Side,
    },
    CardDamaged {
        card_id: CardId,
        amount: i32,
        remaining: i32,
    },
    CardHealthSet {
        card_id: CardId,
        health: i32,
    },
    CardDestroyed {
        card_id: CardId,
    },
    LifeTransferred {
        gainer: Side,
        loser: Side,
        amount: i32,
    },
    LifeLossPrevented {
        side: Side,
        amount: i32,
    },
    TurnEnded {
        side: Side,
        turn: u32,
    },
    CleanupStarted {
        cards: Vec<CardId>,
    },
    CleanupFinished,
    GameWon {
        winner: Side,
        reason: VictoryReason,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[serde(tag = "type")]
pub enum IntegrityError {
    #[error("expected {expected} card instances, found {actual}")]
    CardTableSize { expected: usize, actual: usize },
    #[error("card instance at index {index} has id {card_id}")]
    CardOutOfPlace { index: usize, card_id: CardId },
    #[error("card {card_id} does not match its catalog definition")]
    CatalogMismatch { card_id: CardId },
    #[error("card {card_id} health {value} outside [0, {max}]")]
    HealthOutOfRange { card_id: CardId, value: i32, max: i32 },
    #[error("monster {card_id} has health {health} but destroyed is {destroyed}")]
    DestroyedFlagMismatch {
        card_id: CardId,
        health: i32,
        destroyed: bool,
    },
    #[error("destroyed card {card_id} still occupies {role}")]
    DestroyedCardInRole { role: Role, card_id: CardId },
    #[error("card {card_id} occupies more than one role")]
    DuplicateAssignment { card_id: CardId },
    #[error("card {card_id} cannot occupy {role}")]
    CategoryMismatch { role: Role, card_id: CardId },
    #[error("role {role} refers to unknown card {card_id}")]
    UnknownCard { role: Role, card_id: CardId },
}

/// 对局层面的状态：当前玩家、阶段、双方生命与效果。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchState {
    pub active_player: Side,
    pub turn: u32,
    pub phase: GamePhase,
    pub sides: PerSide<SideState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<VictoryState>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub event_log: Vec<GameEvent>,
}

impl MatchState {
    pub fn new(config: &MatchConfig) -> Self {
        Self {
            active_player: config.first_player,
            turn: 1,
            phase: GamePhase::InProgress,
            sides: PerSide::from_fn(|_| SideState::new(config.starting_life)),
            outcome: None,
            event_log: Vec::new(),
        }
    }
}

/// 游戏整体状态：配置、桌面与对局。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameState {
    #[serde(default)]
    pub config: MatchConfig,
    pub board: BoardState,
    #[serde(rename = "match")]
    pub match_state: MatchState,
}

impl GameState {
    pub fn new(config: MatchConfig) -> Self {
        let match_state = MatchState::new(&config);
        Self {
            config,
            board: BoardState::new(),
            match_state,
        }
    }

    pub fn active_player(&self) -> Side {
        self.match_state.active_player
    }

    pub fn phase(&self) -> GamePhase {
        self.match_state.phase
    }

    pub fn side(&self, side: Side) -> &SideState {
        &self.match_state.sides[side]
    }

    pub fn side_mut(&mut self, side: Side) -> &mut SideState {
        &mut self.match_state.sides[side]
    }

    pub fn life(&self, side: Side) -> i32 {
        self.side(side).life
    }

    pub fn is_finished(&self) -> bool {
        self.match_state.outcome.is_some()
    }

    pub fn record_event(&mut self, event: GameEvent) {
        self.match_state.event_log.push(event);
    }

    /// 击杀得分：防守方失去、进攻方获得相同的生命值。
    pub fn transfer_life(&mut self, gainer: Side, amount: i32) -> GameEvent {
        let loser = gainer.opponent();
        let amount = amount.max(0);
        self.side_mut(gainer).life = self.life(gainer).saturating_add(amount);
        self.side_mut(loser).life = self.life(loser).saturating_sub(amount);
        GameEvent::LifeTransferred {
            gainer,
            loser,
            amount,
        }
    }

    /// 检查生命值；`attacker` 为刚结束回合的一方，优先判定防守方。
    pub fn evaluate_victory(&mut self, attacker: Side) -> Option<VictoryState> {
        if let Some(outcome) = &self.match_state.outcome {
            return Some(outcome.clone());
        }

        let defender = attacker.opponent();
        let victory = match (self.life(attacker) <= 0, self.life(defender) <= 0) {
            (false, false) => return None,
            (true, true) => VictoryState {
                winner: attacker,
                reason: VictoryReason::BothDepleted,
            },
            (false, true) => VictoryState {
                winner: attacker,
                reason: VictoryReason::LifeDepleted { loser: defender },
            },
            (true, false) => VictoryState {
                winner: defender,
                reason: VictoryReason::LifeDepleted { loser: attacker },
            },
        };
        self.match_state.outcome = Some(victory.clone());
        self.match_state.phase = GamePhase::GameOver;
        Some(victory)
    }

    pub fn integrity_check(&self) -> Result<(), IntegrityError> {
        let board = &self.board;
        if board.cards.len() != CARD_COUNT || board.sightings.len() != CARD_COUNT {
            return Err(IntegrityError::CardTableSize {
                expected: CARD_COUNT,
                actual: board.cards.len().min(board.sightings.len()),
            });
        }

        for (index, card) in board.cards.iter().enumerate() {
            if card.card_id as usize != index {
                return Err(IntegrityError::CardOutOfPlace {
                    index,
                    card_id: card.card_id,
                });
            }
            let matches_catalog = definition(card.card_id)
                .map(|def| {
                    def.category == card.category
                        && def.base_attack == card.base_attack
                        && def.default_health == card.default_health
                })
                .unwrap_or(false);
            if !matches_catalog {
                return Err(IntegrityError::CatalogMismatch {
                    card_id: card.card_id,
                });
            }
            if !(0..=card.default_health).contains(&card.current_health) {
                return Err(IntegrityError::HealthOutOfRange {
                    card_id: card.card_id,
                    value: card.current_health,
                    max: card.default_health,
                });
            }
            if card.is_monster() && card.destroyed != (card.current_health == 0) {
                return Err(IntegrityError::DestroyedFlagMismatch {
                    card_id: card.card_id,
                    health: card.current_health,
                    destroyed: card.destroyed,
                });
            }
        }

        let mut seen = HashSet::new();
        for role in Role::ALL {
            let Some(card_id) = board.roles[role.index()] else {
                continue;
            };
            let card = board
                .card(card_id)
                .ok_or(IntegrityError::UnknownCard { role, card_id })?;
            if card.destroyed {
                return Err(IntegrityError::DestroyedCardInRole { role, card_id });
            }
            if card.category != role.slot.category() {
                return Err(IntegrityError::CategoryMismatch { role, card_id });
            }
            if !seen.insert(card_id) {
                return Err(IntegrityError::DuplicateAssignment { card_id });
            }
        }

        Ok(())
    }

    pub fn sample() -> Self {
        Self::new(MatchConfig::default())
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::sample()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_side_indexes_by_side() {
        let mut lives = PerSide::new(10, 20);
        assert_eq!(lives[Side::P1], 10);
        lives[Side::P2] += 5;
        assert_eq!(lives[Side::P2], 25);
        let collected: Vec<(Side, i32)> = lives.iter().map(|(side, life)| (side, *life)).collect();
        assert_eq!(collected, vec![(Side::P1, 10), (Side::P2, 25)]);
    }

    #[test]
    fn side_numbers_round_trip() {
        for side in Side::BOTH {
            assert_eq!(Side::from_number(side.number()), Some(side));
            assert_eq!(side.opponent().opponent(), side);
        }
        assert_eq!(Side::from_number(0), None);
        assert_eq!(Side::P2.to_string(), "Player 2");
    }

    #[test]
    fn transfer_moves_life_between_sides() {
        let mut state = GameState::new(MatchConfig::default().with_starting_life(100));
        let event = state.transfer_life(Side::P1, 60);
        assert_eq!(state.life(Side::P1), 160);
        assert_eq!(state.life(Side::P2), 40);
        assert_eq!(
            event,
            GameEvent::LifeTransferred {
                gainer: Side::P1,
                loser: Side::P2,
                amount: 60
            }
        );
    }

    #[test]
    fn victory_goes_to_surviving_side() {
        let mut state = GameState::new(MatchConfig::default().with_starting_life(4));
        assert!(state.evaluate_victory(Side::P1).is_none());

        state.transfer_life(Side::P1, 60);
        let victory = state.evaluate_victory(Side::P1).expect("P2 should be out of life");
        assert_eq!(victory.winner, Side::P1);
        assert_eq!(victory.reason, VictoryReason::LifeDepleted { loser: Side::P2 });
        assert_eq!(state.phase(), GamePhase::GameOver);
    }

    #[test]
    fn fresh_state_passes_integrity_check() {
        let state = GameState::sample();
        assert!(state.integrity_check().is_ok());
        assert_eq!(state.life(Side::P1), state.config.starting_life);
        assert_eq!(state.active_player(), Side::P1);
    }

    #[test]
    fn integrity_check_flags_destroyed_occupant() {
        let mut state = GameState::sample();
        let role = Role::monster(Side::P1, 0);
        state.board.roles[role.index()] = Some(1);
        state.board.cards[1].destroyed = true;
        state.board.cards[1].current_health = 0;
        assert_eq!(
            state.integrity_check(),
            Err(IntegrityError::DestroyedCardInRole { role, card_id: 1 })
        );
    }

    #[test]
    fn integrity_check_flags_destroyed_monster_with_health() {
        let mut state = GameState::sample();
        state.board.cards[1].destroyed = true;
        assert_eq!(
            state.integrity_check(),
            Err(IntegrityError::DestroyedFlagMismatch {
                card_id: 1,
                health: 100,
                destroyed: true
            })
        );

        let mut state = GameState::sample();
        state.board.cards[2].current_health = 0;
        assert!(matches!(
            state.integrity_check(),
            Err(IntegrityError::DestroyedFlagMismatch { card_id: 2, .. })
        ));
    }

    #[test]
    fn destroyed_spell_cards_keep_zero_health() {
        let mut state = GameState::sample();
        state.board.destroy(14);
        assert!(state.integrity_check().is_ok());
    }

    #[test]
    fn integrity_check_flags_wrong_category() {
        let mut state = GameState::sample();
        let role = Role::spell(Side::P2);
        state.board.roles[role.index()] = Some(1);
        assert_eq!(
            state.integrity_check(),
            Err(IntegrityError::CategoryMismatch { role, card_id: 1 })
        );
    }
}
