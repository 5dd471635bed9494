//! Theme data model: built-in palettes and resolution from config.

use ratatui::style::Color;

use crate::config::{ThemeColorsConfig, ThemeConfig};

/// All runtime colors used by the dialog.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Table
    pub row_fg: Color,
    pub dir_fg: Color,
    pub cursor_bg: Color,
    pub cursor_fg: Color,
    pub selected_fg: Color,
    pub mixed_fg: Color,

    // Status bar
    pub status_bg: Color,
    pub status_fg: Color,

    // Borders & chrome
    pub border_fg: Color,

    // Semantic colors (not configurable)
    pub error_fg: Color,
    pub dim_fg: Color,
}

// ── Built-in palettes ────────────────────────────────────────────────────────

/// Dark theme using the Catppuccin Mocha palette.
pub fn dark_theme() -> ThemeColors {
    ThemeColors {
        row_fg: Color::Rgb(205, 214, 244),      // #cdd6f4 (text)
        dir_fg: Color::Rgb(137, 180, 250),      // #89b4fa (blue)
        cursor_bg: Color::Rgb(69, 71, 90),      // #45475a (surface1)
        cursor_fg: Color::Rgb(205, 214, 244),   // #cdd6f4
        selected_fg: Color::Rgb(166, 227, 161), // #a6e3a1 (green)
        mixed_fg: Color::Rgb(249, 226, 175),    // #f9e2af (yellow)

        status_bg: Color::Rgb(30, 30, 46), // #1e1e2e (base)
        status_fg: Color::Rgb(205, 214, 244),

        border_fg: Color::Rgb(88, 91, 112), // #585b70 (surface2)

        error_fg: Color::Rgb(243, 139, 168), // #f38ba8 (red)
        dim_fg: Color::Rgb(108, 112, 134),   // #6c7086 (overlay0)
    }
}

/// Light theme using the Catppuccin Latte palette.
pub fn light_theme() -> ThemeColors {
    ThemeColors {
        row_fg: Color::Rgb(76, 79, 105),       // #4c4f69 (text)
        dir_fg: Color::Rgb(30, 102, 245),      // #1e66f5 (blue)
        cursor_bg: Color::Rgb(204, 208, 218),  // #ccd0da (surface1)
        cursor_fg: Color::Rgb(76, 79, 105),
        selected_fg: Color::Rgb(64, 160, 43),  // #40a02b (green)
        mixed_fg: Color::Rgb(223, 142, 29),    // #df8e1d (yellow)

        status_bg: Color::Rgb(239, 241, 245), // #eff1f5 (base)
        status_fg: Color::Rgb(76, 79, 105),

        border_fg: Color::Rgb(172, 176, 190), // #acb0be (surface2)

        error_fg: Color::Rgb(210, 15, 57), // #d20f39 (red)
        dim_fg: Color::Rgb(156, 160, 176), // #9ca0b0 (overlay0)
    }
}

// ── Color parsing ────────────────────────────────────────────────────────────

/// Parse a hex color string like `"#aabbcc"`. Returns `None` for malformed
/// input.
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

// ── Theme resolution ─────────────────────────────────────────────────────────

/// Resolve the final `ThemeColors` from config.
///
/// `"custom"` starts from the dark palette and applies the overrides.
/// Unknown schemes fall back to dark.
pub fn resolve_theme(config: &ThemeConfig) -> ThemeColors {
    match config.scheme.as_deref().unwrap_or("dark") {
        "light" => light_theme(),
        "custom" => {
            let mut theme = dark_theme();
            if let Some(custom) = &config.custom {
                apply_custom_colors(&mut theme, custom);
            }
            theme
        }
        _ => dark_theme(),
    }
}

fn apply_custom_colors(theme: &mut ThemeColors, custom: &ThemeColorsConfig) {
    let slots: [(&Option<String>, &mut Color); 9] = [
        (&custom.row_fg, &mut theme.row_fg),
        (&custom.dir_fg, &mut theme.dir_fg),
        (&custom.cursor_bg, &mut theme.cursor_bg),
        (&custom.cursor_fg, &mut theme.cursor_fg),
        (&custom.selected_fg, &mut theme.selected_fg),
        (&custom.mixed_fg, &mut theme.mixed_fg),
        (&custom.status_bg, &mut theme.status_bg),
        (&custom.status_fg, &mut theme.status_fg),
        (&custom.border_fg, &mut theme.border_fg),
    ];
    for (hex, slot) in slots {
        if let Some(color) = hex.as_deref().and_then(parse_hex_color) {
            *slot = color;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff0000"), Some(Color::Rgb(255, 0, 0)));
        assert_eq!(parse_hex_color("1a1b26"), Some(Color::Rgb(26, 27, 38)));
        assert_eq!(parse_hex_color("#zzzzzz"), None);
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color(""), None);
    }

    #[test]
    fn test_resolve_schemes() {
        let light = resolve_theme(&ThemeConfig {
            scheme: Some("light".into()),
            custom: None,
        });
        assert_eq!(light.dir_fg, Color::Rgb(30, 102, 245));

        let unknown = resolve_theme(&ThemeConfig {
            scheme: Some("neon".into()),
            custom: None,
        });
        assert_eq!(unknown.dir_fg, dark_theme().dir_fg);
        assert_eq!(resolve_theme(&ThemeConfig::default()).dir_fg, dark_theme().dir_fg);
    }

    #[test]
    fn test_custom_overrides_and_invalid_fallback() {
        let theme = resolve_theme(&ThemeConfig {
            scheme: Some("custom".into()),
            custom: Some(ThemeColorsConfig {
                mixed_fg: Some("#123456".into()),
                cursor_bg: Some("#nothex".into()),
                ..Default::default()
            }),
        });
        assert_eq!(theme.mixed_fg, Color::Rgb(0x12, 0x34, 0x56));
        assert_eq!(theme.cursor_bg, dark_theme().cursor_bg);
        assert_eq!(theme.selected_fg, dark_theme().selected_fg);
    }
}
