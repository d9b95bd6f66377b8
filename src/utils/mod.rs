//! 与游戏规则无关的辅助工具。

pub mod log;
