//! Persistent application settings

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::trace::ShadeMode;

/// Application settings that persist between sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Window
    pub window_width: f32,
    pub window_height: f32,

    // Camera feel
    pub move_speed: f32,
    pub mouse_sensitivity: f32,

    // Shading
    pub shade_mode: ShadeMode,

    // Last opened scene
    pub last_scene: Option<PathBuf>,

    // Recent scenes (most recent first, max 10)
    pub recent_scenes: Vec<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_width: 1280.0,
            window_height: 720.0,
            move_speed: 2.5,
            mouse_sensitivity: 0.005,
            shade_mode: ShadeMode::Scatter,
            last_scene: None,
            recent_scenes: Vec::new(),
        }
    }
}

const MAX_RECENT_SCENES: usize = 10;

impl Settings {
    /// Get settings file path
    fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("silica");
            std::fs::create_dir_all(&p).ok();
            p.push("settings.json");
            p
        })
    }

    /// Load settings from file
    pub fn load() -> Self {
        let mut settings: Self = Self::path()
            .and_then(|p| std::fs::read_to_string(&p).ok())
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();

        // Validate camera feel - hand-edited files can hold anything
        if !settings.move_speed.is_finite() || !(0.1..=100.0).contains(&settings.move_speed) {
            settings.move_speed = 2.5;
        }
        if !settings.mouse_sensitivity.is_finite()
            || !(0.0001..=0.1).contains(&settings.mouse_sensitivity)
        {
            settings.mouse_sensitivity = 0.005;
        }

        settings
    }

    /// Save settings to file
    pub fn save(&self) {
        if let Some(path) = Self::path() {
            if let Ok(json) = serde_json::to_string_pretty(self) {
                let _ = std::fs::write(path, json);
            }
        }
    }

    /// Add scene to recent list (moves to top if already present)
    pub fn add_recent(&mut self, path: PathBuf) {
        // Remove if already in list
        self.recent_scenes.retain(|p| p != &path);

        // Insert at front
        self.recent_scenes.insert(0, path.clone());

        // Trim to max size
        self.recent_scenes.truncate(MAX_RECENT_SCENES);

        // Also update last_scene
        self.last_scene = Some(path);
    }

    /// Get recent scenes (filters out non-existent)
    pub fn recent_scenes(&self) -> Vec<&PathBuf> {
        self.recent_scenes.iter().filter(|p| p.exists()).collect()
    }
}
