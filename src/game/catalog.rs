//! 静态卡牌目录：30 张实体卡牌的定义。

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::effects::{SpellEffect, TrapEffect};

/// 目录中的卡牌标识（0..30）。
pub type CardId = u32;

pub const CARD_COUNT: usize = 30;

/// 第一张标记纸上的编号起点（卡牌 0..15）。
const FIRST_SHEET_MARKER: u32 = 100;
/// 第二张标记纸上的编号起点（卡牌 15..30）。
const SECOND_SHEET_MARKER: u32 = 145;
const SHEET_SIZE: u32 = 15;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CardCategory {
    Monster,
    Spell,
    Trap,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "effect")]
pub enum CardEffect {
    Spell(SpellEffect),
    Trap(TrapEffect),
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CardDefinition {
    pub id: CardId,
    pub marker: u32,
    pub category: CardCategory,
    pub name: &'static str,
    pub description: &'static str,
    pub base_attack: i32,
    pub default_health: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<CardEffect>,
}

impl CardDefinition {
    const fn monster(id: CardId, name: &'static str, attack: i32, health: i32) -> Self {
        Self {
            id,
            marker: marker_for(id),
            category: CardCategory::Monster,
            name,
            description: "",
            base_attack: attack,
            default_health: health,
            effect: None,
        }
    }

    const fn spell(
        id: CardId,
        name: &'static str,
        description: &'static str,
        effect: SpellEffect,
    ) -> Self {
        Self {
            id,
            marker: marker_for(id),
            category: CardCategory::Spell,
            name,
            description,
            base_attack: 0,
            default_health: 0,
            effect: Some(CardEffect::Spell(effect)),
        }
    }

    const fn trap(
        id: CardId,
        name: &'static str,
        description: &'static str,
        effect: TrapEffect,
    ) -> Self {
        Self {
            id,
            marker: marker_for(id),
            category: CardCategory::Trap,
            name,
            description,
            base_attack: 0,
            default_health: 0,
            effect: Some(CardEffect::Trap(effect)),
        }
    }

    pub fn spell_effect(&self) -> Option<SpellEffect> {
        match self.effect {
            Some(CardEffect::Spell(effect)) => Some(effect),
            _ => None,
        }
    }

    pub fn trap_effect(&self) -> Option<TrapEffect> {
        match self.effect {
            Some(CardEffect::Trap(effect)) => Some(effect),
            _ => None,
        }
    }
}

const fn marker_for(id: CardId) -> u32 {
    if id < SHEET_SIZE {
        FIRST_SHEET_MARKER + id
    } else {
        SECOND_SHEET_MARKER + id - SHEET_SIZE
    }
}

static CATALOG: Lazy<Vec<CardDefinition>> = Lazy::new(|| {
    vec![
        CardDefinition::monster(0, "Stone Golem", 60, 150),
        CardDefinition::monster(1, "Flame Drake", 100, 100),
        CardDefinition::monster(2, "Shadow Wolf", 90, 70),
        CardDefinition::monster(3, "Iron Knight", 70, 130),
        CardDefinition::monster(4, "Storm Harpy", 110, 60),
        CardDefinition::monster(5, "Forest Troll", 80, 120),
        CardDefinition::monster(6, "Frost Giant", 120, 140),
        CardDefinition::monster(7, "Venom Serpent", 95, 80),
        CardDefinition::monster(8, "Sky Griffin", 105, 90),
        CardDefinition::monster(9, "Bone Archer", 80, 60),
        CardDefinition::monster(10, "Crystal Sentinel", 50, 160),
        CardDefinition::spell(
            11,
            "Healing Light",
            "Set the health of your monsters to 100.",
            SpellEffect::HealingLight,
        ),
        CardDefinition::spell(
            12,
            "Full Restore",
            "Restore your monsters to full health.",
            SpellEffect::FullRestore,
        ),
        CardDefinition::spell(
            13,
            "Blood Oath",
            "Set the health of your monsters to 1.",
            SpellEffect::BloodOath,
        ),
        CardDefinition::spell(
            14,
            "Minor Mend",
            "Set the health of your monsters to 20.",
            SpellEffect::MinorMend,
        ),
        CardDefinition::spell(
            15,
            "Field Medic",
            "Set the health of your monsters to 75.",
            SpellEffect::FieldMedic,
        ),
        CardDefinition::spell(
            16,
            "Half Measure",
            "Set the health of your monsters to half of their maximum.",
            SpellEffect::HalfMeasure,
        ),
        CardDefinition::spell(
            17,
            "Greater Renewal",
            "Set the health of your monsters to 75% of their maximum.",
            SpellEffect::GreaterRenewal,
        ),
        CardDefinition::spell(
            18,
            "Lesser Renewal",
            "Set the health of your monsters to 25% of their maximum.",
            SpellEffect::LesserRenewal,
        ),
        CardDefinition::spell(
            19,
            "Trap Ward",
            "The next trap your opponent activates against you has no effect.",
            SpellEffect::TrapWard,
        ),
        CardDefinition::spell(
            20,
            "Trap Buster",
            "Destroy your opponent's trap.",
            SpellEffect::TrapBuster,
        ),
        CardDefinition::trap(
            21,
            "Divine Punishment",
            "Halve the health of every attacking monster.",
            TrapEffect::DivinePunishment,
        ),
        CardDefinition::trap(
            22,
            "Power Break",
            "Attacking monsters lose 50 attack for one turn.",
            TrapEffect::PowerBreak,
        ),
        CardDefinition::trap(
            23,
            "Reinforcements",
            "Your monsters gain 40 attack for one turn.",
            TrapEffect::Reinforcements,
        ),
        CardDefinition::trap(
            24,
            "Shackles",
            "Attacking monsters have 0 attack for one turn.",
            TrapEffect::Shackles,
        ),
        CardDefinition::trap(
            25,
            "Spell Shatter",
            "Destroy the attacker's spell.",
            TrapEffect::SpellShatter,
        ),
        CardDefinition::trap(
            26,
            "Anti-Magic Field",
            "The attacker cannot cast spells for one turn.",
            TrapEffect::AntiMagicField,
        ),
        CardDefinition::trap(
            27,
            "Guardian Barrier",
            "You lose no life points for the rest of this turn.",
            TrapEffect::GuardianBarrier,
        ),
        CardDefinition::trap(
            28,
            "Negate Attack",
            "The attacker cannot attack for one turn.",
            TrapEffect::NegateAttack,
        ),
        CardDefinition::trap(
            29,
            "Trap Jammer",
            "The attacker's traps cannot activate for one turn.",
            TrapEffect::TrapJammer,
        ),
    ]
});

pub fn catalog() -> &'static [CardDefinition] {
    &CATALOG
}

pub fn definition(card_id: CardId) -> Option<&'static CardDefinition> {
    CATALOG.get(card_id as usize)
}

/// 根据物理标记编号查找卡牌。
pub fn marker_to_card(marker: u32) -> Option<CardId> {
    let id = match marker {
        m if (FIRST_SHEET_MARKER..FIRST_SHEET_MARKER + SHEET_SIZE).contains(&m) => {
            m - FIRST_SHEET_MARKER
        }
        m if (SECOND_SHEET_MARKER..SECOND_SHEET_MARKER + SHEET_SIZE).contains(&m) => {
            m - SECOND_SHEET_MARKER + SHEET_SIZE
        }
        _ => return None,
    };
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_ids_match_positions() {
        assert_eq!(catalog().len(), CARD_COUNT);
        for (index, card) in catalog().iter().enumerate() {
            assert_eq!(card.id as usize, index, "{} is out of place", card.name);
        }
    }

    #[test]
    fn catalog_has_expected_mix() {
        let count = |category: CardCategory| {
            catalog()
                .iter()
                .filter(|card| card.category == category)
                .count()
        };
        assert_eq!(count(CardCategory::Monster), 11);
        assert_eq!(count(CardCategory::Spell), 10);
        assert_eq!(count(CardCategory::Trap), 9);

        for card in catalog() {
            match card.category {
                CardCategory::Monster => assert!(card.effect.is_none() && card.default_health > 0),
                CardCategory::Spell => assert!(card.spell_effect().is_some()),
                CardCategory::Trap => assert!(card.trap_effect().is_some()),
            }
        }
    }

    #[test]
    fn markers_round_trip_through_lookup() {
        assert_eq!(definition(0).map(|card| card.marker), Some(100));
        assert_eq!(definition(14).map(|card| card.marker), Some(114));
        assert_eq!(definition(15).map(|card| card.marker), Some(145));
        assert_eq!(definition(29).map(|card| card.marker), Some(159));

        for card in catalog() {
            assert_eq!(marker_to_card(card.marker), Some(card.id));
        }
        assert_eq!(marker_to_card(115), None);
        assert_eq!(marker_to_card(144), None);
        assert_eq!(marker_to_card(160), None);
    }
}
