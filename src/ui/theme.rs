use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Styles for each kind of py2cs console line
#[derive(Debug, Clone)]
pub struct Theme {
    /// Run banner
    pub banner: Style,
    /// Pipeline phase headings
    pub phase: Style,
    pub ok: Style,
    pub failure: Style,
    /// Untranslated constructs and other warnings
    pub caution: Style,
    /// Summary row labels and hints
    pub label: Style,
    /// Written document paths
    pub path: Style,
    /// Summary row values
    pub count: Style,
}

impl Theme {
    /// Colored only when `colored`, every style plain otherwise
    pub fn new(colored: bool) -> Self {
        let pick = |style: Style| if colored { style } else { Style::new() };
        Self {
            banner: pick(Style::new().cyan().bold()),
            phase: pick(Style::new().blue().bold()),
            ok: pick(Style::new().green().bold()),
            failure: pick(Style::new().red().bold()),
            caution: pick(Style::new().yellow().bold()),
            label: pick(Style::new().white().dimmed()),
            path: pick(Style::new().green()),
            count: pick(Style::new().bold()),
        }
    }

    /// Honors NO_COLOR/CLICOLOR and stays plain when stdout is piped
    pub fn detect() -> Self {
        Self::new(console::colors_enabled() && console::Term::stdout().is_term())
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use owo_colors::OwoColorize;

    #[test]
    fn test_plain_theme_writes_no_escapes() {
        let plain = Theme::new(false);
        assert_eq!("Generated:".style(plain.label).to_string(), "Generated:");
        assert_eq!("3".style(plain.count).to_string(), "3");

        let colored = Theme::new(true);
        assert!("3".style(colored.count).to_string().contains('\u{1b}'));
    }
}
