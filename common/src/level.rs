use serde::Serialize;

use crate::constants::{MAX_LEVEL, POINTS_PER_FOOD, POINTS_PER_LEVEL};

/// Tuning for one difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelConfig {
    pub foods_to_next_level: u32,
    pub tick_interval_ms: u32,
    pub speed_multiplier: f32,
    pub display_name: &'static str,
}

const LEVELS: [LevelConfig; MAX_LEVEL as usize] = [
    LevelConfig { foods_to_next_level: 5, tick_interval_ms: 100, speed_multiplier: 1.0, display_name: "Easy" },
    LevelConfig { foods_to_next_level: 7, tick_interval_ms: 85, speed_multiplier: 1.15, display_name: "Normal" },
    LevelConfig { foods_to_next_level: 8, tick_interval_ms: 70, speed_multiplier: 1.3, display_name: "Hard" },
    LevelConfig { foods_to_next_level: 10, tick_interval_ms: 55, speed_multiplier: 1.5, display_name: "Extreme" },
    LevelConfig { foods_to_next_level: 12, tick_interval_ms: 40, speed_multiplier: 1.8, display_name: "Insane" },
    LevelConfig { foods_to_next_level: 15, tick_interval_ms: 30, speed_multiplier: 2.0, display_name: "Nightmare" },
];

/// Configuration for `level`. Levels past the last configured one reuse it;
/// level 0 is treated as level 1.
pub fn level_config(level: u32) -> &'static LevelConfig {
    let index = level.clamp(1, MAX_LEVEL) as usize - 1;
    &LEVELS[index]
}

/// Points awarded for one egg eaten at `level`.
pub fn points_for_food(level: u32) -> u32 {
    POINTS_PER_FOOD + level * POINTS_PER_LEVEL
}

pub fn level_up_message(level: u32) -> String {
    if level == MAX_LEVEL {
        return "🌭🔥 ¡NIVEL PABLO! ¡DEVORA COMO EL MAESTRO! 🔥🌭".to_string();
    }
    format!("⬆️ LEVEL {}: {}! ⬆️", level, level_config(level).display_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_table_lookup() {
        assert_eq!(level_config(1).foods_to_next_level, 5);
        assert_eq!(level_config(1).tick_interval_ms, 100);
        assert_eq!(level_config(2).tick_interval_ms, 85);
        assert_eq!(level_config(6).display_name, "Nightmare");
        // Past the table the last level is reused
        assert_eq!(level_config(9), level_config(6));
        assert_eq!(level_config(0), level_config(1));
    }

    #[test]
    fn test_points_scale_with_level() {
        assert_eq!(points_for_food(1), 15);
        assert_eq!(points_for_food(3), 25);
        assert_eq!(points_for_food(6), 40);
    }

    #[test]
    fn test_level_up_messages() {
        assert!(level_up_message(2).contains("LEVEL 2: Normal"));
        assert!(level_up_message(6).contains("NIVEL PABLO"));
    }
}
