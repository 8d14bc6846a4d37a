//! Title menu state.

/// Panel currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuPanel {
    #[default]
    Main,
    Info,
}

/// Buttons on the menu panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Start,
    Info,
    Back,
    Quit,
}

/// What the host should do after a menu action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOutcome {
    Stay,
    StartGame,
    Quit,
}

/// Two-panel title menu: the main panel and an info panel.
#[derive(Debug, Clone, Default)]
pub struct Menu {
    panel: MenuPanel,
}

impl Menu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn panel(&self) -> MenuPanel {
        self.panel
    }

    pub fn apply(&mut self, action: MenuAction) -> MenuOutcome {
        match action {
            MenuAction::Start => MenuOutcome::StartGame,
            MenuAction::Info => {
                self.panel = MenuPanel::Info;
                MenuOutcome::Stay
            }
            MenuAction::Back => {
                self.panel = MenuPanel::Main;
                MenuOutcome::Stay
            }
            MenuAction::Quit => {
                log::info!("Quit requested from menu");
                MenuOutcome::Quit
            }
        }
    }
}
