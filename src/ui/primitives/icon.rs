use crossterm::style::Stylize;

use crate::ui::theme::{self, colors, icons, icons_ascii};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Success,
    Error,
    Warning,
    Progress,
    Pending,
    Arrow,
    Watch,
    Build,
    Deploy,
    Device,
}

impl Icon {
    pub fn render(&self, supports_unicode: bool) -> &'static str {
        let (unicode, ascii) = match self {
            Icon::Success => (icons::SUCCESS, icons_ascii::SUCCESS),
            Icon::Error => (icons::ERROR, icons_ascii::ERROR),
            Icon::Warning => (icons::WARNING, icons_ascii::WARNING),
            Icon::Progress => (icons::PROGRESS, icons_ascii::PROGRESS),
            Icon::Pending => (icons::PENDING, icons_ascii::PENDING),
            Icon::Arrow => (icons::ARROW, icons_ascii::ARROW),
            Icon::Watch => (icons::WATCH, icons_ascii::WATCH),
            Icon::Build => (icons::BUILD, icons_ascii::BUILD),
            Icon::Deploy => (icons::DEPLOY, icons_ascii::DEPLOY),
            Icon::Device => (icons::DEVICE, icons_ascii::DEVICE),
        };
        if supports_unicode {
            unicode
        } else {
            ascii
        }
    }

    pub fn color(&self) -> theme::Color {
        match self {
            Icon::Success => colors::SUCCESS,
            Icon::Error => colors::ERROR,
            Icon::Warning | Icon::Progress => colors::WARNING,
            Icon::Pending | Icon::Arrow => colors::DIM,
            Icon::Watch | Icon::Build | Icon::Deploy | Icon::Device => colors::INFO,
        }
    }

    pub fn colored(&self, supports_color: bool, supports_unicode: bool) -> String {
        let s = self.render(supports_unicode);
        if supports_color {
            format!("{}", s.with(self.color()))
        } else {
            s.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_fallback() {
        assert_eq!(Icon::Build.render(false), "[BUILD]");
        assert_eq!(Icon::Success.render(true), "✓");
    }

    #[test]
    fn colored_without_color_is_plain() {
        assert_eq!(Icon::Error.colored(false, false), "[FAIL]");
        assert!(Icon::Error.colored(true, false).contains("\u{1b}["));
    }
}
