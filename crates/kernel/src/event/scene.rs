//! Scene kinds and lifecycle phases.
//!
//! The host reports which scene is active with an explicit [`SceneKind`]
//! rather than having the kernel infer it from a class name.

use std::fmt;

/// The host engine's scenes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SceneKind {
    Boot,
    Title,
    Map,
    Battle,
    Menu,
    Item,
    Skill,
    Equip,
    Status,
    Options,
    Save,
    Load,
    GameEnd,
    Shop,
    Name,
    Debug,
    Gameover,
    /// A scene added by another plugin.
    Custom(String),
}

impl SceneKind {
    /// Lowercase identifier used in event namespaces.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Boot => "boot",
            Self::Title => "title",
            Self::Map => "map",
            Self::Battle => "battle",
            Self::Menu => "menu",
            Self::Item => "item",
            Self::Skill => "skill",
            Self::Equip => "equip",
            Self::Status => "status",
            Self::Options => "options",
            Self::Save => "save",
            Self::Load => "load",
            Self::GameEnd => "gameend",
            Self::Shop => "shop",
            Self::Name => "name",
            Self::Debug => "debug",
            Self::Gameover => "gameover",
            Self::Custom(name) => name,
        }
    }

    /// Event-queue namespace for this scene's lifecycle events.
    pub fn namespace(&self) -> String {
        format!("scene:{}", self.as_str())
    }
}

impl fmt::Display for SceneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scene lifecycle phases reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneEvent {
    Create,
    Start,
    Update,
    Terminate,
}

impl SceneEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Start => "start",
            Self::Update => "update",
            Self::Terminate => "terminate",
        }
    }
}

impl fmt::Display for SceneEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
