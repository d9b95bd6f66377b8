//! 桌面状态：10 个槽位与当前识别到的实体卡牌。
//!
//! 每帧由外部识别层提供一次 [`SensorSnapshot`]，[`BoardState::refresh`] 根据卡牌与
//! 槽位参考点之间的距离更新占位情况。

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    card::CardInstance,
    catalog::{catalog, CardCategory, CardId, CARD_COUNT},
    config::MatchConfig,
    state::{GameEvent, PerSide, Side},
};

pub const ROLE_COUNT: usize = 10;
const SLOTS_PER_SIDE: usize = 5;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance_squared(self, other: Vec3) -> f32 {
        let (dx, dy, dz) = (self.x - other.x, self.y - other.y, self.z - other.z);
        dx * dx + dy * dy + dz * dz
    }

    pub fn distance(self, other: Vec3) -> f32 {
        self.distance_squared(other).sqrt()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn within(self, other: Vec3, radius: f32) -> bool {
        self.distance_squared(other) <= radius * radius
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Slot {
    Monster1,
    Monster2,
    Monster3,
    Spell,
    Trap,
}

impl Slot {
    pub const MONSTERS: [Slot; 3] = [Slot::Monster1, Slot::Monster2, Slot::Monster3];

    pub fn category(self) -> CardCategory {
        match self {
            Slot::Monster1 | Slot::Monster2 | Slot::Monster3 => CardCategory::Monster,
            Slot::Spell => CardCategory::Spell,
            Slot::Trap => CardCategory::Trap,
        }
    }

    fn index(self) -> usize {
        match self {
            Slot::Monster1 => 0,
            Slot::Monster2 => 1,
            Slot::Monster3 => 2,
            Slot::Spell => 3,
            Slot::Trap => 4,
        }
    }
}

/// 桌面上固定的一个位置（某一方的某个槽位）。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Role {
    pub side: Side,
    pub slot: Slot,
}

impl Role {
    pub const ALL: [Role; ROLE_COUNT] = [
        Role::new(Side::P1, Slot::Monster1),
        Role::new(Side::P1, Slot::Monster2),
        Role::new(Side::P1, Slot::Monster3),
        Role::new(Side::P1, Slot::Spell),
        Role::new(Side::P1, Slot::Trap),
        Role::new(Side::P2, Slot::Monster1),
        Role::new(Side::P2, Slot::Monster2),
        Role::new(Side::P2, Slot::Monster3),
        Role::new(Side::P2, Slot::Spell),
        Role::new(Side::P2, Slot::Trap),
    ];

    pub const fn new(side: Side, slot: Slot) -> Self {
        Self { side, slot }
    }

    /// `index` 取 0..3。
    pub fn monster(side: Side, index: usize) -> Self {
        Self::new(side, Slot::MONSTERS[index.min(2)])
    }

    pub fn monsters(side: Side) -> [Role; 3] {
        Slot::MONSTERS.map(|slot| Role::new(side, slot))
    }

    pub fn spell(side: Side) -> Self {
        Self::new(side, Slot::Spell)
    }

    pub fn trap(side: Side) -> Self {
        Self::new(side, Slot::Trap)
    }

    pub fn index(self) -> usize {
        self.side.index() * SLOTS_PER_SIDE + self.slot.index()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.slot {
            Slot::Monster1 => write!(f, "{} monster slot 1", self.side),
            Slot::Monster2 => write!(f, "{} monster slot 2", self.side),
            Slot::Monster3 => write!(f, "{} monster slot 3", self.side),
            Slot::Spell => write!(f, "{} spell slot", self.side),
            Slot::Trap => write!(f, "{} trap slot", self.side),
        }
    }
}

/// 默认桌面布局：P1 在 y=0 一行，P2 在 y=10 一行，怪兽槽位两两相对。
pub fn standard_layout() -> [Vec3; ROLE_COUNT] {
    let mut points = [Vec3::default(); ROLE_COUNT];
    for (side, y) in [(Side::P1, 0.0), (Side::P2, 10.0)] {
        for (index, role) in Role::monsters(side).into_iter().enumerate() {
            points[role.index()] = Vec3::new(index as f32 * 10.0, y, 0.0);
        }
        points[Role::spell(side).index()] = Vec3::new(-10.0, y, 0.0);
        points[Role::trap(side).index()] = Vec3::new(-20.0, y, 0.0);
    }
    points
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CardSighting {
    pub card_id: CardId,
    #[serde(default = "default_visible")]
    pub visible: bool,
    pub position: Vec3,
}

fn default_visible() -> bool {
    true
}

/// 识别层在一帧内给出的一致快照。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SensorSnapshot {
    #[serde(default)]
    pub cards: Vec<CardSighting>,
    pub role_points: [Vec3; ROLE_COUNT],
    #[serde(default)]
    pub pass_markers: PerSide<bool>,
}

impl SensorSnapshot {
    pub fn new(role_points: [Vec3; ROLE_COUNT]) -> Self {
        Self {
            cards: Vec::new(),
            role_points,
            pass_markers: PerSide::default(),
        }
    }

    pub fn with_card(mut self, card_id: CardId, position: Vec3) -> Self {
        self.cards.push(CardSighting {
            card_id,
            visible: true,
            position,
        });
        self
    }

    /// 把卡牌放在某个槽位的参考点上。
    pub fn with_card_at(self, card_id: CardId, role: Role) -> Self {
        let position = self.role_points[role.index()];
        self.with_card(card_id, position)
    }

    pub fn with_pass_marker(mut self, side: Side) -> Self {
        self.pass_markers[side] = true;
        self
    }

    pub fn visible_position(&self, card_id: CardId) -> Option<Vec3> {
        self.cards
            .iter()
            .rev()
            .find(|sighting| sighting.card_id == card_id)
            .filter(|sighting| sighting.visible)
            .map(|sighting| sighting.position)
    }
}

impl Default for SensorSnapshot {
    fn default() -> Self {
        Self::new(standard_layout())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoardState {
    pub cards: Vec<CardInstance>,
    pub roles: [Option<CardId>; ROLE_COUNT],
    /// 每张卡牌最近一帧的可见位置。
    pub sightings: Vec<Option<Vec3>>,
    pub role_points: [Vec3; ROLE_COUNT],
    #[serde(default)]
    pub misses: [u32; ROLE_COUNT],
    #[serde(default)]
    pub pass_markers: PerSide<bool>,
}

impl BoardState {
    pub fn new() -> Self {
        Self {
            cards: catalog().iter().map(CardInstance::new).collect(),
            roles: [None; ROLE_COUNT],
            sightings: vec![None; CARD_COUNT],
            role_points: standard_layout(),
            misses: [0; ROLE_COUNT],
            pass_markers: PerSide::default(),
        }
    }

    pub fn card(&self, card_id: CardId) -> Option<&CardInstance> {
        self.cards.get(card_id as usize)
    }

    pub fn card_mut(&mut self, card_id: CardId) -> Option<&mut CardInstance> {
        self.cards.get_mut(card_id as usize)
    }

    pub fn occupant_of(&self, role: Role) -> Option<CardId> {
        let occupant = self.roles[role.index()];
        debug_assert!(
            occupant
                .and_then(|card_id| self.card(card_id))
                .map_or(true, |card| !card.destroyed),
            "destroyed card still occupies {role}"
        );
        occupant
    }

    pub fn occupant(&self, role: Role) -> Option<&CardInstance> {
        self.occupant_of(role).and_then(|card_id| self.card(card_id))
    }

    pub fn role_of(&self, card_id: CardId) -> Option<Role> {
        Role::ALL
            .into_iter()
            .find(|role| self.roles[role.index()] == Some(card_id))
    }

    /// 某一方当前在场的怪兽（按槽位顺序）。
    pub fn monsters(&self, side: Side) -> Vec<CardId> {
        Role::monsters(side)
            .into_iter()
            .filter_map(|role| self.occupant_of(role))
            .collect()
    }

    pub fn position_of(&self, card_id: CardId) -> Option<Vec3> {
        self.sightings.get(card_id as usize).copied().flatten()
    }

    pub fn is_visible(&self, card_id: CardId) -> bool {
        self.position_of(card_id).is_some()
    }

    /// 已被摧毁但仍能被识别到的卡牌。
    pub fn destroyed_in_view(&self) -> Vec<CardId> {
        self.cards
            .iter()
            .filter(|card| card.destroyed && self.is_visible(card.card_id))
            .map(|card| card.card_id)
            .collect()
    }

    pub fn refresh(&mut self, snapshot: &SensorSnapshot, config: &MatchConfig) -> Vec<GameEvent> {
        let mut events = Vec::new();
        self.role_points = snapshot.role_points;
        self.record_sightings(snapshot);

        for role in Role::ALL {
            let index = role.index();
            let Some(card_id) = self.roles[index] else {
                self.misses[index] = 0;
                continue;
            };
            let point = self.role_points[index];
            let present = self
                .position_of(card_id)
                .map_or(false, |position| position.within(point, config.slot_radius));
            if present {
                self.misses[index] = 0;
                continue;
            }
            self.misses[index] += 1;
            if self.misses[index] > config.miss_tolerance_ticks {
                self.roles[index] = None;
                self.misses[index] = 0;
                log::debug!("{role} cleared, card {card_id} no longer sensed");
                events.push(GameEvent::RoleCleared { role, card_id });
            }
        }

        for role in Role::ALL {
            if self.roles[role.index()].is_some() {
                continue;
            }
            if let Some(card_id) = self.nearest_candidate(role, config.slot_radius) {
                self.roles[role.index()] = Some(card_id);
                log::debug!("{role} now holds card {card_id}");
                events.push(GameEvent::RoleAssigned { role, card_id });
            }
        }

        for side in Side::BOTH {
            let raised = snapshot.pass_markers[side];
            if raised && !self.pass_markers[side] {
                events.push(GameEvent::PassMarkerRaised { side });
            }
            self.pass_markers[side] = raised;
        }

        events
    }

    fn record_sightings(&mut self, snapshot: &SensorSnapshot) {
        self.sightings.iter_mut().for_each(|sighting| *sighting = None);
        for sighting in &snapshot.cards {
            match self.sightings.get_mut(sighting.card_id as usize) {
                Some(slot) => *slot = sighting.visible.then_some(sighting.position),
                None => log::warn!("ignoring sighting of unknown card {}", sighting.card_id),
            }
        }
    }

    fn nearest_candidate(&self, role: Role, radius: f32) -> Option<CardId> {
        let point = self.role_points[role.index()];
        self.cards
            .iter()
            .filter(|card| !card.destroyed && card.category == role.slot.category())
            .filter(|card| self.role_of(card.card_id).is_none())
            .filter_map(|card| {
                let position = self.position_of(card.card_id)?;
                position
                    .within(point, radius)
                    .then(|| (position.distance_squared(point), card.card_id))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
            .map(|(_, card_id)| card_id)
    }

    fn release(&mut self, card_id: CardId) -> Option<GameEvent> {
        let role = self.role_of(card_id)?;
        self.roles[role.index()] = None;
        self.misses[role.index()] = 0;
        Some(GameEvent::RoleCleared { role, card_id })
    }

    /// 对怪兽造成伤害；若因此被摧毁则立即离开槽位。
    pub fn damage(&mut self, card_id: CardId, amount: i32) -> Vec<GameEvent> {
        let Some(card) = self.card_mut(card_id) else {
            return Vec::new();
        };
        if card.destroyed {
            return Vec::new();
        }
        card.apply_damage(amount);
        let mut events = vec![GameEvent::CardDamaged {
            card_id,
            amount,
            remaining: card.current_health,
        }];
        if card.destroyed {
            events.push(GameEvent::CardDestroyed { card_id });
            events.extend(self.release(card_id));
        }
        events
    }

    pub fn set_health(&mut self, card_id: CardId, health: i32) -> Vec<GameEvent> {
        let Some(card) = self.card_mut(card_id) else {
            return Vec::new();
        };
        if card.destroyed {
            return Vec::new();
        }
        card.set_health(health);
        let mut events = vec![GameEvent::CardHealthSet {
            card_id,
            health: card.current_health,
        }];
        if card.destroyed {
            events.push(GameEvent::CardDestroyed { card_id });
            events.extend(self.release(card_id));
        }
        events
    }

    pub fn destroy(&mut self, card_id: CardId) -> Vec<GameEvent> {
        let Some(card) = self.card_mut(card_id) else {
            return Vec::new();
        };
        if card.destroyed {
            return Vec::new();
        }
        card.destroy();
        let mut events = vec![GameEvent::CardDestroyed { card_id }];
        events.extend(self.release(card_id));
        events
    }

    pub fn clear_triggered(&mut self) {
        for card in &mut self.cards {
            card.clear_triggered();
        }
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}
