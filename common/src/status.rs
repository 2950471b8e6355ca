use serde::Serialize;

use crate::constants::LEVEL_UP_BANNER_MS;
use crate::level::level_config;
use crate::simulation::{GameEvent, GamePhase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Neutral,
    Success,
    Error,
}

/// The one-line status shown under the board. Level-up banners revert to the
/// playing text after a short while.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusLine {
    pub text: String,
    pub kind: StatusKind,
    #[serde(skip)]
    banner_until_ms: Option<u64>,
}

impl Default for StatusLine {
    fn default() -> Self {
        StatusLine::neutral("🌭 Preparado para comer huevos?")
    }
}

impl StatusLine {
    fn neutral(text: &str) -> Self {
        StatusLine {
            text: text.to_string(),
            kind: StatusKind::Neutral,
            banner_until_ms: None,
        }
    }

    fn set(&mut self, text: impl Into<String>, kind: StatusKind) {
        self.text = text.into();
        self.kind = kind;
        self.banner_until_ms = None;
    }

    pub fn apply(&mut self, event: &GameEvent, now_ms: u64) {
        match event {
            GameEvent::Started { .. } => {
                let config = level_config(1);
                self.set(format!("🎮 Level 1: {} - Go!", config.display_name), StatusKind::Success);
            }
            GameEvent::Resumed { .. } => self.set("▶️ Playing...", StatusKind::Neutral),
            GameEvent::Paused => self.set("⏸️ Paused", StatusKind::Neutral),
            GameEvent::Reset => self.set("🫘 Ready to play?", StatusKind::Neutral),
            GameEvent::LevelUp { message, .. } => {
                self.set(message.clone(), StatusKind::Success);
                self.banner_until_ms = Some(now_ms + LEVEL_UP_BANNER_MS);
            }
            GameEvent::GameOver { reason, score, .. } => {
                self.set(format!("{} Score: {}", reason.message(), score), StatusKind::Error);
            }
            GameEvent::Moved { .. } if self.kind == StatusKind::Success && self.banner_until_ms.is_none() => {
                // First move after the start banner
                self.set("▶️ Playing...", StatusKind::Neutral);
            }
            _ => {}
        }
    }

    /// Expires a level-up banner once its time is up, provided the game is
    /// still running.
    pub fn refresh(&mut self, phase: GamePhase, now_ms: u64) {
        if let Some(until) = self.banner_until_ms {
            if now_ms >= until {
                self.banner_until_ms = None;
                if phase == GamePhase::Running {
                    self.set("▶️ Playing...", StatusKind::Neutral);
                }
            }
        }
    }

    /// A free-form notice such as "token saved".
    pub fn notice(&mut self, text: impl Into<String>, now_ms: u64) {
        self.set(text, StatusKind::Success);
        self.banner_until_ms = Some(now_ms + LEVEL_UP_BANNER_MS);
    }
}
