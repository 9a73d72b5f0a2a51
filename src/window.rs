use serde::{Deserialize, Serialize};

/// Fire-and-forget signals the UI sends to the host about its window.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowSignal {
    #[serde(rename = "window:expand")]
    Expand,
    #[serde(rename = "window:collapse")]
    Collapse,
    #[serde(rename = "window:minimize")]
    Minimize,
    #[serde(rename = "window:close")]
    Close,
    #[serde(rename = "window:lock-expanded")]
    LockExpanded,
    #[serde(rename = "window:unlock-expanded")]
    UnlockExpanded,
}

impl WindowSignal {
    pub fn channel(self) -> &'static str {
        match self {
            WindowSignal::Expand => "window:expand",
            WindowSignal::Collapse => "window:collapse",
            WindowSignal::Minimize => "window:minimize",
            WindowSignal::Close => "window:close",
            WindowSignal::LockExpanded => "window:lock-expanded",
            WindowSignal::UnlockExpanded => "window:unlock-expanded",
        }
    }
}

/// Unsolicited host-to-UI notifications.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    #[serde(rename = "window:collapsed")]
    Collapsed,
}

/// Host-side view of the widget window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowState {
    pub expanded: bool,
    /// While locked, the window stays expanded on focus loss.
    pub locked: bool,
    pub minimized: bool,
    pub closed: bool,
}

impl WindowState {
    pub fn apply(&mut self, signal: WindowSignal) {
        match signal {
            WindowSignal::Expand => {
                self.expanded = true;
                self.minimized = false;
            }
            WindowSignal::Collapse => self.expanded = false,
            WindowSignal::Minimize => self.minimized = true,
            WindowSignal::Close => self.closed = true,
            WindowSignal::LockExpanded => self.locked = true,
            WindowSignal::UnlockExpanded => self.locked = false,
        }
    }

    /// The window lost input focus. An expanded, unlocked window collapses
    /// and the UI must be told, since it did not ask for it.
    pub fn focus_lost(&mut self) -> Option<Notification> {
        if self.expanded && !self.locked {
            self.expanded = false;
            Some(Notification::Collapsed)
        } else {
            None
        }
    }
}
