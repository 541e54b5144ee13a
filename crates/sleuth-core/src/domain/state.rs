//! State - 1 回の呼び出しの状態
//!
//! # 状態遷移
//! ```text
//! Init → Validating → BrokenInput ─────────────┐
//!                   ↘ Setup → Running ─────────→ Finalizing → Dispatching → Cleanup → Terminal
//!                          ↘ (setup failed) ───↗                          ↘ (broken input) → Terminal
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Init,
    Validating,
    BrokenInput,
    Setup,
    Running,
    Finalizing,
    Dispatching,
    Cleanup,
    Terminal,
}

impl RunState {
    /// 許可された遷移かどうか
    pub fn can_transition_to(self, next: RunState) -> bool {
        use RunState::*;
        matches!(
            (self, next),
            (Init, Validating)
                | (Validating, BrokenInput)
                | (Validating, Setup)
                | (BrokenInput, Finalizing)
                | (Setup, Running)
                | (Setup, Finalizing)
                | (Running, Finalizing)
                | (Finalizing, Dispatching)
                | (Dispatching, Cleanup)
                | (Dispatching, Terminal)
                | (Cleanup, Terminal)
        )
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
