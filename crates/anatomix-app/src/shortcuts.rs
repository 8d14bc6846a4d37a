//! Keyboard shortcut registry and documentation.

use anatomix_core::KeyBindings;

/// A key or gesture and what it does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcut {
    pub key: String,
    pub description: &'static str,
}

impl Shortcut {
    pub fn new(key: impl Into<String>, description: &'static str) -> Self {
        Self {
            key: key.into(),
            description,
        }
    }
}

/// Registry of all controls for a set of key bindings.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all controls, pointer gestures first.
    pub fn all(bindings: &KeyBindings) -> Vec<Shortcut> {
        let mut shortcuts = vec![
            Shortcut::new("Left Drag", "Move a part"),
            Shortcut::new(
                format!("{}+Right Drag", bindings.orbit_modifier),
                "Orbit the camera",
            ),
        ];
        shortcuts.extend(
            bindings
                .entries()
                .into_iter()
                .filter(|(key, _)| *key != bindings.orbit_modifier)
                .map(|(key, description)| Shortcut::new(key, description)),
        );
        shortcuts
    }

    /// Print all controls to console.
    pub fn print_all(bindings: &KeyBindings) {
        println!("\n=== Controls ===");
        for shortcut in Self::all(bindings) {
            println!("  {:20} {}", shortcut.key, shortcut.description);
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_controls() {
        let shortcuts = ShortcutRegistry::all(&KeyBindings::default());
        assert_eq!(shortcuts.len(), 8);
        assert_eq!(shortcuts[1].key, "Shift+Right Drag");
        assert!(shortcuts.iter().any(|s| s.key == "Q" && s.description == "Move dragged part closer"));
        assert!(!shortcuts.iter().any(|s| s.key == "Shift"));
    }

    #[test]
    fn test_rebound_keys_are_listed() {
        let bindings = KeyBindings {
            pitch_up: "Up".to_string(),
            ..KeyBindings::default()
        };
        let shortcuts = ShortcutRegistry::all(&bindings);
        assert!(shortcuts.iter().any(|s| s.key == "Up"));
        assert!(!shortcuts.iter().any(|s| s.key == "W"));
    }
}
