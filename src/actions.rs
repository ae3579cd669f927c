use std::str::FromStr;

use crate::error::PriceListError;
use crate::events::DocumentEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionKind {
    New,
    Modify,
    Delete,
    Search,
    Print,
    Top,
    Back,
    Next,
    Last,
    Exit,
    Tutor,
    Undo,
    Save,
}

impl ActionKind {
    pub const ALL: [ActionKind; 13] = [
        ActionKind::New,
        ActionKind::Modify,
        ActionKind::Delete,
        ActionKind::Search,
        ActionKind::Print,
        ActionKind::Top,
        ActionKind::Back,
        ActionKind::Next,
        ActionKind::Last,
        ActionKind::Exit,
        ActionKind::Tutor,
        ActionKind::Undo,
        ActionKind::Save,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::New => "new",
            ActionKind::Modify => "modify",
            ActionKind::Delete => "delete",
            ActionKind::Search => "search",
            ActionKind::Print => "print",
            ActionKind::Top => "top",
            ActionKind::Back => "back",
            ActionKind::Next => "next",
            ActionKind::Last => "last",
            ActionKind::Exit => "exit",
            ActionKind::Tutor => "tutor",
            ActionKind::Undo => "undo",
            ActionKind::Save => "save",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::New => "New",
            ActionKind::Modify => "Modify",
            ActionKind::Delete => "Delete",
            ActionKind::Search => "Search",
            ActionKind::Print => "Print",
            ActionKind::Top => "Top",
            ActionKind::Back => "Back",
            ActionKind::Next => "Next",
            ActionKind::Last => "Last",
            ActionKind::Exit => "Exit",
            ActionKind::Tutor => "Tutor",
            ActionKind::Undo => "Undo",
            ActionKind::Save => "Save",
        }
    }

    pub fn shortcut(&self) -> Option<&'static str> {
        match self {
            ActionKind::New => Some("Ctrl+N"),
            ActionKind::Modify => Some("Ctrl+O"),
            ActionKind::Delete => Some("Ctrl+D"),
            ActionKind::Search => Some("Ctrl+F"),
            ActionKind::Print => Some("Ctrl+P"),
            ActionKind::Back => Some("Alt+Left"),
            ActionKind::Next => Some("Alt+Right"),
            ActionKind::Exit => Some("Alt+F4"),
            ActionKind::Top | ActionKind::Last | ActionKind::Tutor => None,
            ActionKind::Undo | ActionKind::Save => None,
        }
    }

    // Undo and Save sit below the form; everything else is on the toolbar.
    pub fn is_toolbar(&self) -> bool {
        !matches!(self, ActionKind::Undo | ActionKind::Save)
    }
}

impl FromStr for ActionKind {
    type Err = PriceListError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == wanted)
            .ok_or_else(|| PriceListError::UnknownAction(raw.to_string()))
    }
}

/// Enablement of every action, derived from the document's edit mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTable {
    enabled: [bool; ActionKind::ALL.len()],
    editing: bool,
}

impl Default for ActionTable {
    fn default() -> Self {
        let mut table = Self {
            enabled: [false; ActionKind::ALL.len()],
            editing: false,
        };
        table.set_edit_mode(false);
        table
    }
}

impl ActionTable {
    pub fn is_enabled(&self, action: ActionKind) -> bool {
        self.enabled[action as usize]
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn enabled_actions(&self) -> impl Iterator<Item = ActionKind> + '_ {
        ActionKind::ALL
            .into_iter()
            .filter(|action| self.is_enabled(*action))
    }

    /// Resolves a shortcut such as `ctrl+p` to its action.
    pub fn action_for_shortcut(&self, shortcut: &str) -> Option<ActionKind> {
        let wanted = shortcut.trim();
        ActionKind::ALL.into_iter().find(|action| {
            action
                .shortcut()
                .is_some_and(|known| known.eq_ignore_ascii_case(wanted))
        })
    }

    pub fn set_edit_mode(&mut self, editing: bool) {
        self.editing = editing;
        for action in ActionKind::ALL {
            self.enabled[action as usize] = action.is_toolbar() != editing;
        }
    }

    pub fn observe(&mut self, event: &DocumentEvent) {
        if let DocumentEvent::EditModeChanged { editing } = event {
            self.set_edit_mode(*editing);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_table_enables_toolbar_only() {
        let table = ActionTable::default();
        for action in ActionKind::ALL {
            assert_eq!(table.is_enabled(action), action.is_toolbar(), "{action:?}");
        }
    }

    #[test]
    fn edit_mode_leaves_only_undo_and_save() {
        let mut table = ActionTable::default();
        table.observe(&DocumentEvent::EditModeChanged { editing: true });
        let enabled: Vec<_> = table.enabled_actions().collect();
        assert_eq!(enabled, vec![ActionKind::Undo, ActionKind::Save]);

        table.observe(&DocumentEvent::Renumbered);
        assert!(table.is_editing());
        table.observe(&DocumentEvent::EditModeChanged { editing: false });
        assert!(table.is_enabled(ActionKind::Print));
        assert!(!table.is_enabled(ActionKind::Save));
    }

    #[test]
    fn names_and_shortcuts_resolve() {
        assert_eq!(" Print ".parse::<ActionKind>().ok(), Some(ActionKind::Print));
        assert!(matches!(
            "launch".parse::<ActionKind>(),
            Err(PriceListError::UnknownAction(raw)) if raw == "launch"
        ));
        let table = ActionTable::default();
        assert_eq!(table.action_for_shortcut("ctrl+p"), Some(ActionKind::Print));
        assert_eq!(table.action_for_shortcut("Alt+Left"), Some(ActionKind::Back));
        assert_eq!(table.action_for_shortcut("Ctrl+Z"), None);
        assert_eq!(ActionKind::Top.shortcut(), None);
    }
}
