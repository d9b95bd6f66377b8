//! 对战核心逻辑（卡牌、桌面、效果、战斗与回合状态机）。

pub mod board;
pub mod card;
pub mod catalog;
pub mod combat;
pub mod config;
pub mod effects;
pub mod rules;
pub mod state;
pub mod view;

#[cfg(test)]
pub(crate) mod fixtures;

pub use board::{BoardState, CardSighting, Role, SensorSnapshot, Slot, Vec3};
pub use card::CardInstance;
pub use catalog::{CardCategory, CardDefinition, CardEffect, CardId};
pub use combat::CombatResolver;
pub use config::MatchConfig;
pub use effects::{ActiveSpell, ActiveTrap, EffectResolver, SpellEffect, TrapEffect};
pub use rules::{RuleEngine, RuleError, RuleResolution};
pub use state::{
    GameEvent,
    GamePhase,
    GameState,
    IntegrityError,
    MatchState,
    PerSide,
    Side,
    SideState,
    VictoryReason,
    VictoryState,
};
pub use view::{CardView, MatchView, PlayerView, RoleView};
