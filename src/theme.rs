pub use colored::{Color, Colorize};

use crate::config::{DisplayConfig, ThemeName};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ColorScheme {
    pub foreground: Option<Color>,
    pub bold: bool,
    pub underline: bool,
}

impl ColorScheme {
    const fn fg(color: Color) -> Self {
        Self {
            foreground: Some(color),
            bold: false,
            underline: false,
        }
    }

    const fn hex(rgb: u32) -> Self {
        Self::fg(Color::TrueColor {
            r: (rgb >> 16) as u8,
            g: (rgb >> 8) as u8,
            b: rgb as u8,
        })
    }

    const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn apply(&self, text: &str) -> colored::ColoredString {
        let mut colored_text: colored::ColoredString = text.into();

        if let Some(fg) = self.foreground {
            colored_text = colored_text.color(fg);
        }
        if self.bold {
            colored_text = colored_text.bold();
        }
        if self.underline {
            colored_text = colored_text.underline();
        }

        colored_text
    }
}

/// Styles the presenter draws with. Passed in explicitly; there is no
/// process-wide palette.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub primary: ColorScheme,
    pub success: ColorScheme,
    pub accent: ColorScheme,
    pub warning: ColorScheme,
    pub error: ColorScheme,
    pub text: ColorScheme,
    /// `indicatif` colour names for the spinner and the progress bar.
    pub spinner_color: &'static str,
    pub bar_color: &'static str,
    pub bold_labels: bool,
}

impl Default for Theme {
    fn default() -> Self {
        Self::hacker()
    }
}

impl Theme {
    pub fn from_name(name: ThemeName) -> Self {
        match name {
            ThemeName::Hacker => Self::hacker(),
            ThemeName::Classic => Self::classic(),
            ThemeName::Monochrome => Self::monochrome(),
        }
    }

    /// The theme for this run. `display` is `None` when the config could not
    /// be loaded; `--no-color` still wins then.
    pub fn select(no_color: bool, display: Option<&DisplayConfig>) -> Self {
        match display {
            _ if no_color => Self::plain(),
            Some(display) if !display.color_output => Self::plain(),
            Some(display) => Self::from_name(display.theme),
            None => Self::default(),
        }
    }

    /// Style for dashboard labels and box titles.
    pub fn label(&self, scheme: &ColorScheme) -> ColorScheme {
        ColorScheme {
            bold: scheme.bold || self.bold_labels,
            ..*scheme
        }
    }

    /// Neon palette: electric cyan, bright green, magenta.
    pub fn hacker() -> Self {
        Self {
            primary: ColorScheme::hex(0x00FFFF),
            success: ColorScheme::hex(0x00FF00),
            accent: ColorScheme::hex(0xFF00FF),
            warning: ColorScheme::hex(0xFFFF00),
            error: ColorScheme::hex(0xFF0000).bold(),
            text: ColorScheme::fg(Color::BrightWhite),
            spinner_color: "cyan",
            bar_color: "magenta",
            bold_labels: true,
        }
    }

    /// The 16-colour equivalent, for terminals without true colour.
    pub fn classic() -> Self {
        Self {
            primary: ColorScheme::fg(Color::Cyan).bold(),
            success: ColorScheme::fg(Color::Green),
            accent: ColorScheme::fg(Color::Magenta),
            warning: ColorScheme::fg(Color::Yellow),
            error: ColorScheme::fg(Color::Red).bold(),
            text: ColorScheme::fg(Color::White),
            spinner_color: "cyan",
            bar_color: "magenta",
            bold_labels: true,
        }
    }

    pub fn monochrome() -> Self {
        Self {
            primary: ColorScheme {
                foreground: None,
                bold: true,
                underline: true,
            },
            success: ColorScheme::default(),
            accent: ColorScheme::default().bold(),
            warning: ColorScheme::default().bold(),
            error: ColorScheme {
                foreground: None,
                bold: true,
                underline: true,
            },
            text: ColorScheme::default(),
            spinner_color: "white",
            bar_color: "white",
            bold_labels: true,
        }
    }

    /// No escape codes at all.
    pub fn plain() -> Self {
        Self {
            primary: ColorScheme::default(),
            success: ColorScheme::default(),
            accent: ColorScheme::default(),
            warning: ColorScheme::default(),
            error: ColorScheme::default(),
            text: ColorScheme::default(),
            spinner_color: "",
            bar_color: "",
            bold_labels: false,
        }
    }
}
