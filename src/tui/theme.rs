use std::collections::HashMap;
use std::str::FromStr;

use ratatui::style::Color;

use crate::model::UiConfig;

/// Accents handed out to projects without a configured color, by name hash
const PROJECT_PALETTE: [Color; 6] = [
    Color::Rgb(0xCC, 0x66, 0xFF),
    Color::Rgb(0x44, 0xDD, 0xFF),
    Color::Rgb(0xFF, 0xB8, 0x6C),
    Color::Rgb(0x44, 0xFF, 0x88),
    Color::Rgb(0x44, 0x88, 0xFF),
    Color::Rgb(0xFF, 0x79, 0xC6),
];

/// Colors used by the renderers. Built once at startup.
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub highlight: Color,
    pub dim: Color,
    pub red: Color,
    pub yellow: Color,
    pub green: Color,
    pub purple: Color,
    pub selection_bg: Color,
    pub selection_border: Color,
    pub selection_id: Color,
    pub search_match_bg: Color,
    pub search_match_fg: Color,
    project_colors: HashMap<String, Color>,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Rgb(0x0C, 0x00, 0x1B),
            text: Color::Rgb(0xB0, 0xAA, 0xFF),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            highlight: Color::Rgb(0xFB, 0x41, 0x96),
            dim: Color::Rgb(0x7D, 0x78, 0xBF),
            red: Color::Rgb(0xFF, 0x44, 0x44),
            yellow: Color::Rgb(0xFF, 0xD7, 0x00),
            green: Color::Rgb(0x44, 0xFF, 0x88),
            purple: Color::Rgb(0xCC, 0x66, 0xFF),
            selection_bg: Color::Rgb(0x3D, 0x14, 0x38),
            selection_border: Color::Rgb(0xFB, 0x41, 0x96),
            selection_id: Color::Rgb(0xDA, 0xB8, 0xF0),
            search_match_bg: Color::Rgb(0x40, 0xE0, 0xD0),
            search_match_fg: Color::Rgb(0x0C, 0x00, 0x1B),
            project_colors: HashMap::new(),
        }
    }
}

/// `#RRGGBB`, `#RGB`, or anything ratatui understands ("red", "10")
fn parse_color(value: &str) -> Option<Color> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#')
        && hex.len() == 3
        && hex.is_ascii()
    {
        let mut rgb = [0u8; 3];
        for (slot, digit) in rgb.iter_mut().zip(hex.chars()) {
            let d = digit.to_digit(16)? as u8;
            *slot = d * 16 + d;
        }
        return Some(Color::Rgb(rgb[0], rgb[1], rgb[2]));
    }
    Color::from_str(value).ok()
}

impl Theme {
    /// The default palette with `[ui.colors]` and `[ui.project_colors]` applied.
    /// Unknown keys and unparsable values are logged and skipped.
    pub fn from_config(ui: &UiConfig) -> Self {
        let mut theme = Theme::default();

        for (key, value) in &ui.colors {
            let Some(color) = parse_color(value) else {
                tracing::warn!(key = %key, value = %value, "ignoring invalid theme color");
                continue;
            };
            match theme.slot_mut(key) {
                Some(slot) => *slot = color,
                None => tracing::warn!(key = %key, "unknown theme color key"),
            }
        }

        for (project, value) in &ui.project_colors {
            match parse_color(value) {
                Some(color) => {
                    theme.project_colors.insert(project.clone(), color);
                }
                None => {
                    tracing::warn!(project = %project, value = %value, "ignoring invalid project color")
                }
            }
        }

        theme
    }

    fn slot_mut(&mut self, key: &str) -> Option<&mut Color> {
        let slot = match key {
            "background" => &mut self.background,
            "text" => &mut self.text,
            "text_bright" => &mut self.text_bright,
            "highlight" => &mut self.highlight,
            "dim" => &mut self.dim,
            "red" => &mut self.red,
            "yellow" => &mut self.yellow,
            "green" => &mut self.green,
            "purple" => &mut self.purple,
            "selection_bg" => &mut self.selection_bg,
            "selection_border" => &mut self.selection_border,
            "selection_id" => &mut self.selection_id,
            "search_match_bg" => &mut self.search_match_bg,
            "search_match_fg" => &mut self.search_match_fg,
            _ => return None,
        };
        Some(slot)
    }

    /// Configured accent for a project, else a stable pick from the palette
    pub fn project_color(&self, project: &str) -> Color {
        if let Some(color) = self.project_colors.get(project) {
            return *color;
        }
        let hash = project
            .bytes()
            .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
        PROJECT_PALETTE[hash % PROJECT_PALETTE.len()]
    }
}
