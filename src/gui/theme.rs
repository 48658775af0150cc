//! テーマ設定 - ダークテーマ

use egui::{Color32, CornerRadius, Stroke, Style, Visuals};

/// カラーパレット
pub struct Colors;

impl Colors {
    pub const BG_DARK: Color32 = Color32::from_rgb(14, 18, 24);
    pub const BG_CARD: Color32 = Color32::from_rgb(24, 31, 42);
    pub const BG_HOVER: Color32 = Color32::from_rgb(33, 44, 60);
    pub const ACCENT: Color32 = Color32::from_rgb(86, 156, 255);
    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(236, 240, 246);
    pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(145, 160, 184);
    pub const SUCCESS: Color32 = Color32::from_rgb(74, 222, 128);
    /// 元の名前のまま残したファイル
    pub const WARNING: Color32 = Color32::from_rgb(250, 204, 21);
    pub const BORDER: Color32 = Color32::from_rgb(48, 62, 84);
}

/// ダークテーマのスタイルを作成
pub fn dark_theme() -> Style {
    let mut visuals = Visuals::dark();

    visuals.panel_fill = Colors::BG_DARK;
    visuals.window_fill = Colors::BG_CARD;
    visuals.extreme_bg_color = Colors::BG_DARK;
    visuals.faint_bg_color = Colors::BG_CARD;

    let radius = CornerRadius::same(6);
    for (widget, fill, text) in [
        (&mut visuals.widgets.noninteractive, Colors::BG_CARD, Colors::TEXT_SECONDARY),
        (&mut visuals.widgets.inactive, Colors::BG_CARD, Colors::TEXT_PRIMARY),
        (&mut visuals.widgets.hovered, Colors::BG_HOVER, Colors::TEXT_PRIMARY),
        (&mut visuals.widgets.active, Colors::ACCENT, Colors::TEXT_PRIMARY),
    ] {
        widget.bg_fill = fill;
        widget.fg_stroke = Stroke::new(1.0, text);
        widget.corner_radius = radius;
    }

    visuals.selection.bg_fill = Colors::ACCENT.gamma_multiply(0.4);
    visuals.selection.stroke = Stroke::new(1.0, Colors::ACCENT);

    Style {
        visuals,
        ..Style::default()
    }
}
