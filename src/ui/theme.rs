//! Terminal styles for listings and where-used output
//!
//! Colours are used only on a terminal and when `NO_COLOR` is unset.
//! `SQLXREF_QUIET=1` also hides progress bars and decorative output.

use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub warn: Style,
    pub info: Style,
    /// Field labels and secondary text
    pub label: Style,
    /// Symbol names in where-used headings
    pub symbol: Style,
    /// `path:line` locations
    pub location: Style,
    /// Symbols nothing refers to
    pub unused: Style,
    pub quiet: bool,
}

impl Theme {
    pub fn detect() -> Self {
        Self::from_env(
            console::Term::stdout().is_term(),
            std::env::var_os("NO_COLOR").is_some(),
            std::env::var("SQLXREF_QUIET").ok().as_deref(),
        )
    }

    pub fn from_env(is_term: bool, no_color: bool, quiet: Option<&str>) -> Self {
        let mut theme = if is_term && !no_color {
            Self::colored()
        } else {
            Self::plain()
        };
        theme.quiet = quiet.is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
        theme
    }

    pub fn colored() -> Self {
        Self {
            header: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            warn: Style::new().yellow().bold(),
            info: Style::new().magenta(),
            label: Style::new().white().dimmed(),
            symbol: Style::new().bold(),
            location: Style::new().blue(),
            unused: Style::new().bright_black().italic(),
            quiet: false,
        }
    }

    pub fn plain() -> Self {
        Self {
            header: Style::new(),
            success: Style::new(),
            warn: Style::new(),
            info: Style::new(),
            label: Style::new(),
            symbol: Style::new(),
            location: Style::new(),
            unused: Style::new(),
            quiet: false,
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}

pub fn is_quiet() -> bool {
    theme().quiet
}
