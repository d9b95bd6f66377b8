use super::{
    catalog::CardId,
    state::{GameEvent, GameState, Side},
};

/// 怪兽之间的交战结算。
#[derive(Debug, Default)]
pub struct CombatResolver;

impl CombatResolver {
    pub fn new() -> Self {
        Self
    }

    /// 进攻方每只怪兽对射程内的每只防守方怪兽各攻击一次，不存在反击。
    pub fn resolve(&self, state: &mut GameState, attacking_side: Side) -> Vec<GameEvent> {
        let defending_side = attacking_side.opponent();
        if state.side(attacking_side).no_attack || state.side(defending_side).no_attack {
            log::info!("attacks negated during {attacking_side}'s turn");
            return vec![GameEvent::AttacksNegated {
                side: attacking_side,
            }];
        }

        let pairs = self.eligible_pairs(state, attacking_side);
        let mut events = Vec::new();
        for &(attacker_id, _) in &pairs {
            if let Some(attacker) = state.board.card_mut(attacker_id) {
                attacker.mark_triggered();
            }
        }

        for (attacker_id, defender_id) in pairs {
            let Some(damage) = state.board.card(attacker_id).map(|card| card.current_attack) else {
                continue;
            };
            let Some(before) = state
                .board
                .card(defender_id)
                .filter(|card| !card.destroyed)
                .map(|card| card.current_health)
            else {
                continue;
            };

            events.push(GameEvent::AttackResolved {
                side: attacking_side,
                attacker_id,
                defender_id,
                damage,
            });
            let outcome = state.board.damage(defender_id, damage);
            let killed = outcome.contains(&GameEvent::CardDestroyed {
                card_id: defender_id,
            });
            events.extend(outcome);
            if !killed {
                continue;
            }

            if state.side(defending_side).damage_shield {
                log::info!("{defending_side} is shielded, {before} life kept");
                events.push(GameEvent::LifeLossPrevented {
                    side: defending_side,
                    amount: before,
                });
            } else {
                log::info!("{attacking_side} destroys card {defender_id} and gains {before} life");
                events.push(state.transfer_life(attacking_side, before));
            }
        }
        events
    }

    fn eligible_pairs(&self, state: &GameState, attacking_side: Side) -> Vec<(CardId, CardId)> {
        let board = &state.board;
        let radius = state.config.combat_radius;
        let defenders = board.monsters(attacking_side.opponent());
        let mut pairs = Vec::new();
        for attacker_id in board.monsters(attacking_side) {
            let ready = board
                .card(attacker_id)
                .map_or(false, |card| !card.has_triggered());
            let Some(from) = board.position_of(attacker_id).filter(|_| ready) else {
                continue;
            };
            for &defender_id in &defenders {
                let in_range = board
                    .position_of(defender_id)
                    .map_or(false, |to| from.within(to, radius));
                if in_range {
                    pairs.push((attacker_id, defender_id));
                }
            }
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{
        board::Role,
        fixtures::{card, placed, placed_with},
        config::MatchConfig,
    };

    const DRAKE: CardId = 1;
    const ARCHER: CardId = 9;
    const GOLEM: CardId = 0;

    fn facing_drake_and_archer() -> GameState {
        placed(&[
            (Role::monster(Side::P1, 0), DRAKE),
            (Role::monster(Side::P2, 0), ARCHER),
        ])
    }

    #[test]
    fn kill_transfers_defender_health() {
        let mut state = facing_drake_and_archer();
        let start = state.config.starting_life;

        let events = CombatResolver::new().resolve(&mut state, Side::P1);

        let archer = card(&state, ARCHER);
        assert!(archer.destroyed);
        assert_eq!(archer.current_health, 0);
        assert_eq!(card(&state, DRAKE).current_health, 100, "no counter attack");
        assert_eq!(state.life(Side::P1), start + 60);
        assert_eq!(state.life(Side::P2), start - 60);
        assert_eq!(state.board.occupant_of(Role::monster(Side::P2, 0)), None);
        assert!(events.contains(&GameEvent::AttackResolved {
            side: Side::P1,
            attacker_id: DRAKE,
            defender_id: ARCHER,
            damage: 100
        }));
    }

    #[test]
    fn non_lethal_hit_changes_no_life() {
        let mut state = placed(&[
            (Role::monster(Side::P1, 0), DRAKE),
            (Role::monster(Side::P2, 0), GOLEM),
        ]);
        CombatResolver::new().resolve(&mut state, Side::P1);
        assert_eq!(card(&state, GOLEM).current_health, 50);
        assert_eq!(state.life(Side::P1), state.config.starting_life);
        assert_eq!(state.life(Side::P2), state.config.starting_life);
    }

    #[test]
    fn monsters_out_of_range_do_not_fight() {
        // 斜对角的槽位距离超过交战半径
        let mut state = placed(&[
            (Role::monster(Side::P1, 0), DRAKE),
            (Role::monster(Side::P2, 2), ARCHER),
        ]);
        let events = CombatResolver::new().resolve(&mut state, Side::P1);
        assert!(events.is_empty());
        assert_eq!(card(&state, ARCHER).current_health, 60);
    }

    #[test]
    fn wide_radius_lets_one_attacker_hit_every_defender() {
        let config = MatchConfig {
            combat_radius: 50.0,
            ..MatchConfig::default()
        };
        let mut state = placed_with(
            config,
            &[
                (Role::monster(Side::P1, 0), DRAKE),
                (Role::monster(Side::P2, 0), ARCHER),
                (Role::monster(Side::P2, 1), GOLEM),
            ],
        );
        CombatResolver::new().resolve(&mut state, Side::P1);
        assert!(card(&state, ARCHER).destroyed);
        assert_eq!(card(&state, GOLEM).current_health, 50);
        assert!(card(&state, DRAKE).has_triggered());
    }

    #[test]
    fn destroyed_defender_is_not_hit_again() {
        let mut state = placed(&[
            (Role::monster(Side::P1, 0), DRAKE),
            (Role::monster(Side::P1, 1), 6),
            (Role::monster(Side::P2, 0), ARCHER),
        ]);
        state.config.combat_radius = 50.0;
        let events = CombatResolver::new().resolve(&mut state, Side::P1);
        let hits = events
            .iter()
            .filter(|event| matches!(event, GameEvent::AttackResolved { .. }))
            .count();
        assert_eq!(hits, 1);
        assert_eq!(state.life(Side::P1), state.config.starting_life + 60);
    }

    #[test]
    fn second_pass_in_same_turn_is_a_no_op() {
        let mut state = placed(&[
            (Role::monster(Side::P1, 0), DRAKE),
            (Role::monster(Side::P2, 0), GOLEM),
        ]);
        let resolver = CombatResolver::new();
        resolver.resolve(&mut state, Side::P1);
        assert!(resolver.resolve(&mut state, Side::P1).is_empty());
        assert_eq!(card(&state, GOLEM).current_health, 50);
    }

    #[test]
    fn no_attack_flag_blocks_combat() {
        let mut state = facing_drake_and_archer();
        state.side_mut(Side::P1).no_attack = true;
        let events = CombatResolver::new().resolve(&mut state, Side::P1);
        assert_eq!(events, vec![GameEvent::AttacksNegated { side: Side::P1 }]);
        assert_eq!(card(&state, ARCHER).current_health, 60);
    }

    #[test]
    fn defender_no_attack_flag_also_blocks_combat() {
        let mut state = facing_drake_and_archer();
        state.side_mut(Side::P2).no_attack = true;
        let before = state.clone();
        let events = CombatResolver::new().resolve(&mut state, Side::P1);
        assert_eq!(events, vec![GameEvent::AttacksNegated { side: Side::P1 }]);
        assert_eq!(state, before);
    }

    #[test]
    fn damage_shield_keeps_life_but_not_the_monster() {
        let mut state = facing_drake_and_archer();
        state.side_mut(Side::P2).damage_shield = true;
        let events = CombatResolver::new().resolve(&mut state, Side::P1);
        assert!(card(&state, ARCHER).destroyed);
        assert_eq!(state.life(Side::P1), state.config.starting_life);
        assert_eq!(state.life(Side::P2), state.config.starting_life);
        assert!(events.contains(&GameEvent::LifeLossPrevented {
            side: Side::P2,
            amount: 60
        }));
    }
}
