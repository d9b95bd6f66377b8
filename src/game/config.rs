use serde::{Deserialize, Serialize};

use super::{rules::RuleError, state::Side};

const DEFAULT_STARTING_LIFE: i32 = 400;
const DEFAULT_SLOT_RADIUS: f32 = 4.0;
const DEFAULT_COMBAT_RADIUS: f32 = 12.0;

/// 对局配置；JSON 中缺省的字段使用默认值。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatchConfig {
    pub starting_life: i32,
    /// 卡牌中心到槽位参考点的最大距离。
    pub slot_radius: f32,
    /// 两张怪兽卡之间可以交战的最大距离。
    pub combat_radius: f32,
    /// 槽位被清空前允许连续丢失识别的帧数。
    pub miss_tolerance_ticks: u32,
    pub first_player: Side,
}

impl MatchConfig {
    pub fn from_json(json: &str) -> Result<Self, RuleError> {
        let config: MatchConfig =
            serde_json::from_str(json).map_err(|error| RuleError::InvalidConfig {
                reason: error.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RuleError> {
        if self.starting_life <= 0 {
            return Err(RuleError::InvalidConfig {
                reason: format!("starting_life must be positive, got {}", self.starting_life),
            });
        }
        for (name, radius) in [
            ("slot_radius", self.slot_radius),
            ("combat_radius", self.combat_radius),
        ] {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(RuleError::InvalidConfig {
                    reason: format!("{name} must be a positive finite number, got {radius}"),
                });
            }
        }
        Ok(())
    }

    pub fn with_starting_life(mut self, life: i32) -> Self {
        self.starting_life = life;
        self
    }

    pub fn with_miss_tolerance(mut self, ticks: u32) -> Self {
        self.miss_tolerance_ticks = ticks;
        self
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            starting_life: DEFAULT_STARTING_LIFE,
            slot_radius: DEFAULT_SLOT_RADIUS,
            combat_radius: DEFAULT_COMBAT_RADIUS,
            miss_tolerance_ticks: 0,
            first_player: Side::P1,
        }
    }
}
