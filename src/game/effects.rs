use serde::{Deserialize, Serialize};

use super::{
    board::Role,
    catalog::{definition, CardId},
    state::{GameEvent, GameState, Side},
};

pub const POWER_BREAK_AMOUNT: i32 = 50;
pub const REINFORCEMENTS_AMOUNT: i32 = 40;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SpellEffect {
    HealingLight,
    FullRestore,
    BloodOath,
    MinorMend,
    FieldMedic,
    HalfMeasure,
    GreaterRenewal,
    LesserRenewal,
    TrapWard,
    TrapBuster,
}

impl SpellEffect {
    pub fn code(self) -> &'static str {
        match self {
            SpellEffect::HealingLight => "HL",
            SpellEffect::FullRestore => "FR",
            SpellEffect::BloodOath => "BO",
            SpellEffect::MinorMend => "MM",
            SpellEffect::FieldMedic => "FM",
            SpellEffect::HalfMeasure => "HM",
            SpellEffect::GreaterRenewal => "GR",
            SpellEffect::LesserRenewal => "LR",
            SpellEffect::TrapWard => "TW",
            SpellEffect::TrapBuster => "TB",
        }
    }

    /// 治疗类魔法把怪兽生命设为的目标值；非治疗类返回 `None`。
    pub fn health_target(self, default_health: i32) -> Option<i32> {
        match self {
            SpellEffect::HealingLight => Some(100),
            SpellEffect::FullRestore => Some(default_health),
            SpellEffect::BloodOath => Some(1),
            SpellEffect::MinorMend => Some(20),
            SpellEffect::FieldMedic => Some(75),
            SpellEffect::HalfMeasure => Some(default_health / 2),
            SpellEffect::GreaterRenewal => Some(default_health * 3 / 4),
            SpellEffect::LesserRenewal => Some(default_health / 4),
            SpellEffect::TrapWard | SpellEffect::TrapBuster => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TrapEffect {
    DivinePunishment,
    PowerBreak,
    Reinforcements,
    Shackles,
    SpellShatter,
    AntiMagicField,
    GuardianBarrier,
    NegateAttack,
    TrapJammer,
}

impl TrapEffect {
    pub fn code(self) -> &'static str {
        match self {
            TrapEffect::DivinePunishment => "DP",
            TrapEffect::PowerBreak => "PB",
            TrapEffect::Reinforcements => "RE",
            TrapEffect::Shackles => "SH",
            TrapEffect::SpellShatter => "SS",
            TrapEffect::AntiMagicField => "AM",
            TrapEffect::GuardianBarrier => "GB",
            TrapEffect::NegateAttack => "NA",
            TrapEffect::TrapJammer => "TJ",
        }
    }

    /// 持续回合数；0 表示在本次结算结束时失效。
    pub fn duration(self) -> u8 {
        match self {
            // 禁止攻击只作用于被结算的这一回合
            TrapEffect::DivinePunishment
            | TrapEffect::SpellShatter
            | TrapEffect::GuardianBarrier
            | TrapEffect::NegateAttack => 0,
            TrapEffect::PowerBreak
            | TrapEffect::Reinforcements
            | TrapEffect::Shackles
            | TrapEffect::AntiMagicField
            | TrapEffect::TrapJammer => 1,
        }
    }
}

/// 一方已发动、尚未失效的陷阱。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActiveTrap {
    pub effect: TrapEffect,
    pub card_id: CardId,
    /// 受影响的一方。
    pub target: Side,
    pub remaining_turns: u8,
    pub activated_turn: u32,
    /// 需要在失效时恢复攻击力的卡牌。
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected: Vec<CardId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActiveSpell {
    pub effect: SpellEffect,
    pub card_id: CardId,
}

#[derive(Debug, Default)]
pub struct EffectResolver;

impl EffectResolver {
    pub fn new() -> Self {
        Self
    }

    /// 发动 `side` 一方槽位上的陷阱。陷阱只在对方回合（己方防守时）生效。
    pub fn resolve_trap(&self, state: &mut GameState, side: Side) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let attacker = side.opponent();
        if state.active_player() != attacker {
            return events;
        }
        let Some((card_id, effect)) = Self::trap_in_slot(state, side) else {
            return events;
        };
        let owner = state.side(side);
        if owner.no_trap || owner.trap.is_some() {
            log::debug!("{side} cannot activate {effect:?} right now");
            return events;
        }

        if state.side(attacker).trap_ward {
            log::info!("{effect:?} from {side} blocked by {attacker}'s trap ward");
            events.push(GameEvent::TrapBlocked {
                side,
                card_id,
                effect,
            });
            events.extend(self.consume_ward(state, attacker));
            return events;
        }

        if let Some(card) = state.board.card_mut(card_id) {
            card.mark_triggered();
        }
        log::info!("{side} activates {effect:?}");
        events.push(GameEvent::TrapActivated {
            side,
            card_id,
            effect,
        });

        let mut affected = Vec::new();
        match effect {
            TrapEffect::DivinePunishment => {
                for target in state.board.monsters(attacker) {
                    let half = state
                        .board
                        .card(target)
                        .map(|card| card.current_health / 2)
                        .unwrap_or(0);
                    events.extend(state.board.damage(target, half));
                }
            }
            TrapEffect::PowerBreak => {
                for target in state.board.monsters(attacker) {
                    if let Some(card) = state.board.card_mut(target) {
                        card.debuff(POWER_BREAK_AMOUNT);
                        affected.push(target);
                    }
                }
            }
            TrapEffect::Reinforcements => {
                for target in state.board.monsters(side) {
                    if let Some(card) = state.board.card_mut(target) {
                        card.buff(REINFORCEMENTS_AMOUNT);
                        affected.push(target);
                    }
                }
            }
            TrapEffect::Shackles => {
                for target in state.board.monsters(attacker) {
                    if let Some(card) = state.board.card_mut(target) {
                        let current = card.current_attack;
                        card.debuff(current);
                        affected.push(target);
                    }
                }
            }
            TrapEffect::SpellShatter => {
                if let Some(spell) = state.side_mut(attacker).spell.take() {
                    events.extend(state.board.destroy(spell.card_id));
                    events.push(GameEvent::SpellDiscarded {
                        side: attacker,
                        card_id: spell.card_id,
                        effect: spell.effect,
                    });
                }
                if let Some(spell_card) = state.board.occupant_of(Role::spell(attacker)) {
                    events.extend(state.board.destroy(spell_card));
                }
            }
            TrapEffect::AntiMagicField => state.side_mut(attacker).no_magic = true,
            TrapEffect::GuardianBarrier => state.side_mut(side).damage_shield = true,
            TrapEffect::NegateAttack => state.side_mut(attacker).no_attack = true,
            TrapEffect::TrapJammer => state.side_mut(attacker).no_trap = true,
        }

        let target = match effect {
            TrapEffect::Reinforcements | TrapEffect::GuardianBarrier => side,
            _ => attacker,
        };
        let activated_turn = state.match_state.turn;
        state.side_mut(side).trap = Some(ActiveTrap {
            effect,
            card_id,
            target,
            remaining_turns: effect.duration(),
            activated_turn,
            affected,
        });
        events
    }

    /// 发动 `side` 一方槽位上的魔法。
    pub fn resolve_spell(&self, state: &mut GameState, side: Side) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let Some(card_id) = state.board.occupant_of(Role::spell(side)) else {
            return events;
        };
        let Some(effect) = definition(card_id).and_then(|def| def.spell_effect()) else {
            return events;
        };
        let already_cast = state
            .board
            .card(card_id)
            .map_or(true, |card| card.has_triggered());
        if already_cast {
            return events;
        }
        let caster = state.side(side);
        if caster.no_magic || caster.spell.is_some() {
            log::debug!("{side} cannot cast {effect:?} right now");
            return events;
        }

        if let Some(card) = state.board.card_mut(card_id) {
            card.mark_triggered();
        }
        log::info!("{side} casts {effect:?}");
        events.push(GameEvent::SpellCast {
            side,
            card_id,
            effect,
        });

        match effect {
            SpellEffect::TrapWard => state.side_mut(side).trap_ward = true,
            SpellEffect::TrapBuster => events.extend(self.bust_trap(state, side.opponent())),
            _ => {
                for target in state.board.monsters(side) {
                    let health = state
                        .board
                        .card(target)
                        .and_then(|card| effect.health_target(card.default_health));
                    if let Some(health) = health {
                        events.extend(state.board.set_health(target, health));
                    }
                }
            }
        }

        state.side_mut(side).spell = Some(ActiveSpell { effect, card_id });
        events
    }

    /// 回合交接时销毁刚结束回合一方已生效的魔法（陷阱护盾除外）。
    pub fn discard_spent_spell(&self, state: &mut GameState, side: Side) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let spent = matches!(
            state.side(side).spell,
            Some(ActiveSpell { effect, .. }) if effect != SpellEffect::TrapWard
        );
        if !spent {
            return events;
        }
        if let Some(spell) = state.side_mut(side).spell.take() {
            events.extend(state.board.destroy(spell.card_id));
            events.push(GameEvent::SpellDiscarded {
                side,
                card_id: spell.card_id,
                effect: spell.effect,
            });
        }
        events
    }

    /// 陷阱持续回合递减；本次结算中刚发动的持续效果不递减。
    pub fn advance_durations(&self, state: &mut GameState, resolving_turn: u32) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for owner in Side::BOTH {
            let expired = match state.side_mut(owner).trap.as_mut() {
                None => false,
                Some(active) if active.remaining_turns == 0 => true,
                Some(active) if active.activated_turn == resolving_turn => false,
                Some(active) => {
                    active.remaining_turns -= 1;
                    active.remaining_turns == 0
                }
            };
            if !expired {
                continue;
            }
            if let Some(active) = state.side_mut(owner).trap.take() {
                events.extend(self.revert_trap(state, owner, active));
            }
        }
        events
    }

    fn revert_trap(
        &self,
        state: &mut GameState,
        owner: Side,
        active: ActiveTrap,
    ) -> Vec<GameEvent> {
        match active.effect {
            TrapEffect::PowerBreak | TrapEffect::Reinforcements | TrapEffect::Shackles => {
                for card_id in &active.affected {
                    if let Some(card) = state.board.card_mut(*card_id) {
                        card.restore_previous();
                    }
                }
            }
            TrapEffect::AntiMagicField => state.side_mut(active.target).no_magic = false,
            TrapEffect::NegateAttack => state.side_mut(active.target).no_attack = false,
            TrapEffect::TrapJammer => state.side_mut(active.target).no_trap = false,
            TrapEffect::GuardianBarrier => state.side_mut(owner).damage_shield = false,
            TrapEffect::DivinePunishment | TrapEffect::SpellShatter => {}
        }
        log::debug!("{:?} from {owner} expired", active.effect);
        let mut events = vec![GameEvent::TrapExpired {
            side: owner,
            card_id: active.card_id,
            effect: active.effect,
        }];
        events.extend(state.board.destroy(active.card_id));
        events
    }

    fn bust_trap(&self, state: &mut GameState, victim: Side) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if let Some(active) = state.side_mut(victim).trap.take() {
            events.extend(self.revert_trap(state, victim, active));
        }
        if let Some(trap_card) = state.board.occupant_of(Role::trap(victim)) {
            events.extend(state.board.destroy(trap_card));
        }
        events
    }

    fn consume_ward(&self, state: &mut GameState, side: Side) -> Vec<GameEvent> {
        state.side_mut(side).trap_ward = false;
        let mut events = Vec::new();
        if let Some(spell) = state.side_mut(side).spell.take() {
            events.extend(state.board.destroy(spell.card_id));
            events.push(GameEvent::SpellDiscarded {
                side,
                card_id: spell.card_id,
                effect: spell.effect,
            });
        }
        events
    }

    fn trap_in_slot(state: &GameState, side: Side) -> Option<(CardId, TrapEffect)> {
        let card = state.board.occupant(Role::trap(side))?;
        if card.has_triggered() {
            return None;
        }
        let effect = definition(card.card_id)?.trap_effect()?;
        Some((card.card_id, effect))
    }
}
