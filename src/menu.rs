//! Pause and main menu actions
//!
//! Menus never touch scenes directly. Buttons return a `MenuAction` and the
//! host decides how to load scenes or restart the run.

use serde::{Deserialize, Serialize};

use crate::settings::AudioToggles;
use crate::sim::Session;

/// Scene change requested by a menu button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SceneRequest {
    /// Load the scene `offset` places away in the build order
    Relative(i32),
    /// Close the application
    Quit,
}

impl SceneRequest {
    /// Target scene index, `None` for `Quit` or an index outside `0..scene_count`
    pub fn resolve(self, current: usize, scene_count: usize) -> Option<usize> {
        match self {
            SceneRequest::Relative(offset) => current
                .checked_add_signed(offset as isize)
                .filter(|&idx| idx < scene_count),
            SceneRequest::Quit => None,
        }
    }
}

/// What the host should do after a button press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuAction {
    /// Nothing beyond the menu's own state change
    None,
    /// Start a fresh run in the current scene
    Restart,
    LoadScene(SceneRequest),
}

/// In-game pause menu
#[derive(Debug, Clone, Default)]
pub struct PauseMenu {
    pub audio: AudioToggles,
}

impl PauseMenu {
    pub fn new(audio: AudioToggles) -> Self {
        Self { audio }
    }

    /// Pause key handler
    pub fn toggle(&self, session: &mut Session) -> MenuAction {
        session.toggle_pause();
        MenuAction::None
    }

    pub fn pause(&self, session: &mut Session) -> MenuAction {
        session.pause();
        log::info!("Paused");
        MenuAction::None
    }

    pub fn resume(&self, session: &mut Session) -> MenuAction {
        session.resume();
        log::info!("Resumed");
        MenuAction::None
    }

    /// Restart button; the new run starts unpaused
    pub fn restart(&self, session: &mut Session) -> MenuAction {
        session.resume();
        MenuAction::Restart
    }

    /// Exit button: back to the previous scene (the main menu)
    pub fn quit(&self, session: &mut Session) -> MenuAction {
        session.resume();
        MenuAction::LoadScene(SceneRequest::Relative(-1))
    }

    /// Returns the new state
    pub fn toggle_music(&mut self) -> bool {
        self.audio.music = !self.audio.music;
        self.audio.music
    }

    /// Returns the new state
    pub fn toggle_sfx(&mut self) -> bool {
        self.audio.sfx = !self.audio.sfx;
        self.audio.sfx
    }
}

/// Title screen menu
#[derive(Debug, Clone, Default)]
pub struct MainMenu {
    /// Settings panel shown over the title screen
    pub settings_visible: bool,
}

impl MainMenu {
    /// Play button: the game scene follows the menu scene
    pub fn play(&self) -> MenuAction {
        MenuAction::LoadScene(SceneRequest::Relative(1))
    }

    pub fn quit(&self) -> MenuAction {
        MenuAction::LoadScene(SceneRequest::Quit)
    }

    /// Opens the settings panel; nothing is running yet, so no pause
    pub fn open_settings(&mut self) -> MenuAction {
        self.settings_visible = true;
        MenuAction::None
    }

    pub fn close_settings(&mut self) -> MenuAction {
        self.settings_visible = false;
        MenuAction::None
    }
}
