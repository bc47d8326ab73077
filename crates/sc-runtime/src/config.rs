//! Style context settings.
//!
//! Settings come from code (`Settings::default().with_off_warn(true)`) or
//! from the environment through [`Settings::from_env_with`], which takes the
//! lookup as a closure so tests never touch the process environment.
//!
//! | Variable | Field |
//! |----------|-------|
//! | `SC_OFF_WARN` | `off_warn` |
//! | `SC_DELETE_NATIVE_CSS` | `delete_native_css` |
//!
//! Flags accept `1`, `true`, `yes`, `on` (any case); anything else is off.

/// Behaviour switches for one style context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Settings {
    /// Silence warning-severity diagnostics. Errors still surface.
    pub off_warn: bool,
    /// Remove tracked rules from the page's own stylesheets after reading
    /// them, leaving the scoped copies as the only styling.
    pub delete_native_css: bool,
}

impl Settings {
    /// Silence warnings.
    #[must_use]
    pub fn with_off_warn(mut self, off: bool) -> Self {
        self.off_warn = off;
        self
    }

    /// Strip tracked rules from their source stylesheets.
    #[must_use]
    pub fn with_delete_native_css(mut self, delete: bool) -> Self {
        self.delete_native_css = delete;
        self
    }

    /// Defaults overridden by environment flags read through `get_env`.
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            off_warn: get_env("SC_OFF_WARN").map_or(defaults.off_warn, |v| env_flag(&v)),
            delete_native_css: get_env("SC_DELETE_NATIVE_CSS")
                .map_or(defaults.delete_native_css, |v| env_flag(&v)),
        }
    }

    /// Defaults overridden by the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }
}

#[inline]
fn env_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_set_fields() {
        let settings = Settings::default()
            .with_off_warn(true)
            .with_delete_native_css(true);
        assert!(settings.off_warn);
        assert!(settings.delete_native_css);
    }

    #[test]
    fn env_flags_follow_grammar() {
        let settings = Settings::from_env_with(|key| match key {
            "SC_OFF_WARN" => Some(" YES ".into()),
            "SC_DELETE_NATIVE_CSS" => Some("0".into()),
            _ => None,
        });
        assert!(settings.off_warn);
        assert!(!settings.delete_native_css);
    }

    #[test]
    fn missing_env_keeps_defaults() {
        assert_eq!(Settings::from_env_with(|_| None), Settings::default());
    }
}
