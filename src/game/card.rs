use serde::{Deserialize, Serialize};

use super::catalog::{CardCategory, CardDefinition, CardId};

/// 单张实体卡牌在整局对战中的运行时状态。
///
/// 实例在对局开始时创建，之后一直存在；`destroyed` 一旦置位便不会再清除。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardInstance {
    pub card_id: CardId,
    pub category: CardCategory,
    pub base_attack: i32,
    pub default_health: i32,
    pub current_attack: i32,
    pub previous_attack: i32,
    pub current_health: i32,
    #[serde(default)]
    pub destroyed: bool,
    #[serde(default)]
    pub triggered: bool,
}

impl CardInstance {
    pub fn new(definition: &CardDefinition) -> Self {
        Self {
            card_id: definition.id,
            category: definition.category,
            base_attack: definition.base_attack,
            default_health: definition.default_health,
            current_attack: definition.base_attack,
            previous_attack: definition.base_attack,
            current_health: definition.default_health,
            destroyed: false,
            triggered: false,
        }
    }

    pub fn is_monster(&self) -> bool {
        self.category == CardCategory::Monster
    }

    /// 扣除生命，最低为 0；归零时卡牌被摧毁。
    pub fn apply_damage(&mut self, amount: i32) {
        debug_assert!(amount >= 0, "negative damage {amount} on card {}", self.card_id);
        let amount = amount.max(0);
        self.current_health = (self.current_health - amount).max(0);
        if self.current_health == 0 && self.is_monster() {
            self.destroyed = true;
        }
        self.check_health();
    }

    pub fn apply_heal(&mut self, amount: i32) {
        debug_assert!(amount >= 0, "negative heal {amount} on card {}", self.card_id);
        if self.destroyed {
            return;
        }
        self.current_health = (self.current_health + amount.max(0)).min(self.default_health);
        self.check_health();
    }

    /// 把生命调整到指定值（限制在 `[0, default_health]`）。
    pub fn set_health(&mut self, value: i32) {
        let target = value.clamp(0, self.default_health);
        if target > self.current_health {
            self.apply_heal(target - self.current_health);
        } else {
            self.apply_damage(self.current_health - target);
        }
    }

    pub fn buff(&mut self, amount: i32) {
        self.previous_attack = self.current_attack;
        self.current_attack = self.current_attack.saturating_add(amount.max(0));
    }

    /// 攻击力最低为 0。
    pub fn debuff(&mut self, amount: i32) {
        self.previous_attack = self.current_attack;
        self.current_attack = (self.current_attack - amount.max(0)).max(0);
    }

    pub fn restore_previous(&mut self) {
        self.current_attack = self.previous_attack;
        self.previous_attack = self.base_attack;
    }

    /// 直接摧毁（用于魔法、陷阱卡被消耗或被破坏）。
    pub fn destroy(&mut self) {
        self.destroyed = true;
        if self.is_monster() {
            self.current_health = 0;
        }
    }

    pub fn mark_triggered(&mut self) {
        self.triggered = true;
    }

    pub fn clear_triggered(&mut self) {
        self.triggered = false;
    }

    pub fn has_triggered(&self) -> bool {
        self.triggered
    }

    fn check_health(&mut self) {
        let in_range = (0..=self.default_health).contains(&self.current_health);
        debug_assert!(
            in_range,
            "card {} health {} outside [0, {}]",
            self.card_id, self.current_health, self.default_health
        );
        if !in_range {
            self.current_health = self.current_health.clamp(0, self.default_health.max(0));
        }
    }
}
