//! Status indicators
//!
//! Nerd Font glyphs when icons are enabled, plain text markers otherwise.

/// Icon constants
pub struct Icons;

impl Icons {
    // Status icons (simple text)
    pub const STATUS_SUCCESS: &'static str = "[OK]";
    pub const STATUS_WARNING: &'static str = "[!]";
    pub const STATUS_ERROR: &'static str = "[X]";
    pub const STATUS_INFO: &'static str = "[i]";
    pub const STATUS_HOOK: &'static str = "[*]";
    pub const STATUS_RUNNING: &'static str = "[>]";

    // Status icons (Nerd Font)
    pub const NF_SUCCESS: &'static str = "\u{f058}";
    pub const NF_WARNING: &'static str = "\u{f071}";
    pub const NF_ERROR: &'static str = "\u{f057}";
    pub const NF_INFO: &'static str = "\u{f05a}";
    pub const NF_HOOK: &'static str = "\u{f0841}";
    pub const NF_RUNNING: &'static str = "\u{f04b}";
}

/// Status icon types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIcon {
    Success,
    Warning,
    Error,
    Info,
    Hook,
    Running,
}

impl StatusIcon {
    /// Get the icon for the current icon mode
    #[must_use]
    pub fn get(&self, use_nerd_fonts: bool) -> &'static str {
        match (self, use_nerd_fonts) {
            (Self::Success, false) => Icons::STATUS_SUCCESS,
            (Self::Warning, false) => Icons::STATUS_WARNING,
            (Self::Error, false) => Icons::STATUS_ERROR,
            (Self::Info, false) => Icons::STATUS_INFO,
            (Self::Hook, false) => Icons::STATUS_HOOK,
            (Self::Running, false) => Icons::STATUS_RUNNING,
            (Self::Success, true) => Icons::NF_SUCCESS,
            (Self::Warning, true) => Icons::NF_WARNING,
            (Self::Error, true) => Icons::NF_ERROR,
            (Self::Info, true) => Icons::NF_INFO,
            (Self::Hook, true) => Icons::NF_HOOK,
            (Self::Running, true) => Icons::NF_RUNNING,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_icons() {
        assert_eq!(StatusIcon::Success.get(false), "[OK]");
        assert_eq!(StatusIcon::Error.get(false), "[X]");
    }

    #[test]
    fn test_nerd_font_icons_differ() {
        for icon in [
            StatusIcon::Success,
            StatusIcon::Warning,
            StatusIcon::Error,
            StatusIcon::Info,
            StatusIcon::Hook,
            StatusIcon::Running,
        ] {
            assert_ne!(icon.get(true), icon.get(false));
        }
    }
}
