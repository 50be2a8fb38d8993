//! Terminal color handling: role-to-character mapping and the
//! character-to-ANSI-escape table.
//!
//! Roles name *what* is being printed (a failure, an informational line, a
//! pass, ordinary text); the configured character names *how* it looks.
//! Every escape lookup is gated on a capability probe performed once when
//! the palette is built, so a non-terminal or `NO_COLOR` environment gets
//! plain text everywhere.

use crate::config::ColorConfig;
use colored::control::SHOULD_COLORIZE;

/// What kind of line is being emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Failure messages and the failing-count banner.
    Fail,
    /// Verbosity-gated informational lines.
    Info,
    /// Pass messages and the all-passed banner.
    Pass,
    /// Everything else.
    Normal,
}

/// Map a color character to its raw ANSI escape sequence.
///
/// `'k' 'r' 'g' 'y' 'b' 'm' 'c' 'w'` select the eight base foreground
/// colors, `'0'` resets, and `'*'`, `'_'`, `'^'`, `'~'` select bold,
/// underline, blink, and reverse video. Unknown characters map to the
/// empty string.
pub fn color_escape(ch: char) -> &'static str {
    match ch {
        '0' => "\x1b[0m",
        'k' => "\x1b[30m",
        'r' => "\x1b[31m",
        'g' => "\x1b[32m",
        'y' => "\x1b[33m",
        'b' => "\x1b[34m",
        'm' => "\x1b[35m",
        'c' => "\x1b[36m",
        'w' => "\x1b[37m",
        '*' => "\x1b[1m",
        '_' => "\x1b[4m",
        '^' => "\x1b[5m",
        '~' => "\x1b[7m",
        _ => "",
    }
}

/// True when `ch` names an escape in the [`color_escape`] table.
pub fn is_known_color(ch: char) -> bool {
    !color_escape(ch).is_empty()
}

/// Resolved color configuration for one controller.
#[derive(Debug, Clone)]
pub struct Palette {
    enabled: bool,
    fail: char,
    info: char,
    pass: char,
    normal: char,
}

impl Palette {
    /// Build a palette from configured role characters, probing terminal
    /// capability once. `force` overrides the probe in either direction.
    pub fn detect(colors: &ColorConfig, force: Option<bool>) -> Self {
        let enabled = force.unwrap_or_else(|| SHOULD_COLORIZE.should_colorize());
        Self {
            enabled,
            fail: colors.fail,
            info: colors.info,
            pass: colors.pass,
            normal: colors.normal,
        }
    }

    /// Whether escapes are emitted at all.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Reassign the character for one role.
    pub fn set_colour(&mut self, role: Role, ch: char) {
        match role {
            Role::Fail => self.fail = ch,
            Role::Info => self.info = ch,
            Role::Pass => self.pass = ch,
            Role::Normal => self.normal = ch,
        }
    }

    /// The character currently assigned to `role`.
    pub fn char_for(&self, role: Role) -> char {
        match role {
            Role::Fail => self.fail,
            Role::Info => self.info,
            Role::Pass => self.pass,
            Role::Normal => self.normal,
        }
    }

    /// Escape for `ch`, or `""` when color is disabled.
    pub fn escape(&self, ch: char) -> &'static str {
        if self.enabled {
            color_escape(ch)
        } else {
            ""
        }
    }

    /// Wrap `text` in the escape for `role`, resetting afterwards.
    pub fn paint(&self, role: Role, text: &str) -> String {
        let esc = self.escape(self.char_for(role));
        if esc.is_empty() {
            return text.to_string();
        }
        format!("{esc}{text}{}", color_escape('0'))
    }

    /// Wrap `text` in the bold escape only.
    pub fn bold(&self, text: &str) -> String {
        if !self.enabled {
            return text.to_string();
        }
        format!("{}{text}{}", color_escape('*'), color_escape('0'))
    }

    /// As [`paint`](Self::paint), additionally bolded.
    pub fn paint_bold(&self, role: Role, text: &str) -> String {
        if !self.enabled {
            return text.to_string();
        }
        format!(
            "{}{}{text}{}",
            color_escape('*'),
            self.escape(self.char_for(role)),
            color_escape('0')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case('r', "\x1b[31m")]
    #[case('g', "\x1b[32m")]
    #[case('b', "\x1b[34m")]
    #[case('0', "\x1b[0m")]
    #[case('*', "\x1b[1m")]
    #[case('~', "\x1b[7m")]
    fn escape_table(#[case] ch: char, #[case] expected: &str) {
        assert_eq!(color_escape(ch), expected);
    }

    #[test]
    fn unknown_character_maps_to_empty() {
        assert_eq!(color_escape('z'), "");
        assert!(!is_known_color('z'));
        assert!(is_known_color('m'));
    }

    #[test]
    fn disabled_palette_paints_plain() {
        let palette = Palette::detect(&ColorConfig::default(), Some(false));
        assert!(!palette.enabled());
        assert_eq!(palette.escape('r'), "");
        assert_eq!(palette.paint(Role::Fail, "boom"), "boom");
        assert_eq!(palette.paint_bold(Role::Pass, "ok"), "ok");
    }

    #[test]
    fn enabled_palette_wraps_and_resets() {
        let palette = Palette::detect(&ColorConfig::default(), Some(true));
        assert_eq!(palette.paint(Role::Fail, "boom"), "\x1b[31mboom\x1b[0m");
        assert_eq!(
            palette.paint_bold(Role::Pass, "ok"),
            "\x1b[1m\x1b[34mok\x1b[0m"
        );
        assert_eq!(palette.bold("sum"), "\x1b[1msum\x1b[0m");
    }

    #[test]
    fn roles_are_reassignable() {
        let mut palette = Palette::detect(&ColorConfig::default(), Some(true));
        palette.set_colour(Role::Fail, 'm');
        assert_eq!(palette.char_for(Role::Fail), 'm');
        assert_eq!(palette.paint(Role::Fail, "x"), "\x1b[35mx\x1b[0m");
    }
}
