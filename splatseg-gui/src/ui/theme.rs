//! Application theme and color definitions.
//!
//! Provides light and dark themes with monospace fonts, following system preference.

use eframe::egui::{self, Color32, FontFamily, FontId, Rounding, Stroke, TextStyle, Visuals};
use splatseg_core::Rgb;

/// Color palette for the application (dark theme).
pub mod dark {
    use eframe::egui::Color32;

    // Base colors
    pub const BG_DARK: Color32 = Color32::from_rgb(0x0f, 0x13, 0x1a);
    pub const BG_PANEL: Color32 = Color32::from_rgb(0x17, 0x1c, 0x25);
    pub const BG_HEADER: Color32 = Color32::from_rgb(0x1f, 0x26, 0x31);
    pub const BG_INPUT: Color32 = Color32::from_rgb(0x24, 0x2c, 0x38);

    // Border colors
    pub const BORDER: Color32 = Color32::from_rgb(0x2e, 0x37, 0x45);
    pub const BORDER_LIGHT: Color32 = Color32::from_rgb(0x3f, 0x4a, 0x5a);

    // Text colors
    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(0xdc, 0xe3, 0xec);
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(0x8b, 0x97, 0xa8);

    pub const BUTTON_HOVER: Color32 = Color32::from_rgb(0x2b, 0x34, 0x42);
}

/// Color palette for the application (light theme).
pub mod light {
    use eframe::egui::Color32;

    // Base colors
    pub const BG_DARK: Color32 = Color32::from_rgb(0xee, 0xf1, 0xf5);
    pub const BG_PANEL: Color32 = Color32::from_rgb(0xfb, 0xfc, 0xfd);
    pub const BG_HEADER: Color32 = Color32::from_rgb(0xf2, 0xf5, 0xf8);
    pub const BG_INPUT: Color32 = Color32::from_rgb(0xe6, 0xea, 0xf0);

    // Border colors
    pub const BORDER: Color32 = Color32::from_rgb(0xcc, 0xd3, 0xdd);
    pub const BORDER_LIGHT: Color32 = Color32::from_rgb(0xb6, 0xc0, 0xcd);

    // Text colors
    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(0x16, 0x1c, 0x26);
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(0x5b, 0x66, 0x76);

    pub const BUTTON_HOVER: Color32 = Color32::from_rgb(0xd9, 0xdf, 0xe7);
}

/// Splat preview colors, used in both themes.
///
/// The background must stay outside every reference swatch's threshold.
pub mod preview {
    use splatseg_core::Rgb;

    pub const BACKGROUND: Rgb = Rgb::new(0x0b, 0x0e, 0x14);
    pub const OVERLAY_TEXT: Rgb = Rgb::new(0x9a, 0xa6, 0xb6);
}

/// Shared accent colors (same for both themes).
pub mod accent {
    use eframe::egui::Color32;

    pub const BLUE: Color32 = Color32::from_rgb(0x4a, 0x9e, 0xff);
    pub const GREEN: Color32 = Color32::from_rgb(0x10, 0xb9, 0x81);
    pub const RED: Color32 = Color32::from_rgb(0xef, 0x44, 0x44);
}

/// Theme-aware color accessor.
#[derive(Clone, Copy)]
pub struct ThemeColors {
    pub bg_panel: Color32,
    pub bg_header: Color32,
    pub border: Color32,
    pub text_primary: Color32,
    pub text_muted: Color32,
}

impl ThemeColors {
    /// Get colors for the current theme from context.
    pub fn from_ctx(ctx: &egui::Context) -> Self {
        Self::from_dark_mode(ctx.style().visuals.dark_mode)
    }

    /// Get colors for the current theme from UI.
    pub fn from_ui(ui: &egui::Ui) -> Self {
        Self::from_dark_mode(ui.visuals().dark_mode)
    }

    pub fn from_dark_mode(is_dark: bool) -> Self {
        if is_dark {
            Self {
                bg_panel: dark::BG_PANEL,
                bg_header: dark::BG_HEADER,
                border: dark::BORDER,
                text_primary: dark::TEXT_PRIMARY,
                text_muted: dark::TEXT_MUTED,
            }
        } else {
            Self {
                bg_panel: light::BG_PANEL,
                bg_header: light::BG_HEADER,
                border: light::BORDER,
                text_primary: light::TEXT_PRIMARY,
                text_muted: light::TEXT_MUTED,
            }
        }
    }
}

/// Configure style based on current visuals (dark/light mode).
pub fn configure_style(ctx: &egui::Context) {
    let visuals = if ctx.style().visuals.dark_mode {
        build_dark_visuals()
    } else {
        build_light_visuals()
    };
    ctx.set_visuals(visuals);
    configure_fonts_and_spacing(ctx);
}

fn build_dark_visuals() -> Visuals {
    let mut visuals = Visuals::dark();

    visuals.window_fill = dark::BG_PANEL;
    visuals.panel_fill = dark::BG_PANEL;
    visuals.faint_bg_color = dark::BG_DARK;
    visuals.extreme_bg_color = dark::BG_INPUT;

    visuals.widgets.noninteractive.bg_fill = dark::BG_INPUT;
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, dark::TEXT_MUTED);
    visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, dark::BORDER);

    visuals.widgets.inactive.bg_fill = dark::BG_INPUT;
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, dark::TEXT_PRIMARY);
    visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, dark::BORDER_LIGHT);

    visuals.widgets.hovered.bg_fill = dark::BUTTON_HOVER;
    visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, dark::TEXT_PRIMARY);

    visuals.selection.bg_fill = accent::BLUE.gamma_multiply(0.3);
    apply_shared_widget_style(&mut visuals);
    visuals
}

fn build_light_visuals() -> Visuals {
    let mut visuals = Visuals::light();

    visuals.window_fill = light::BG_PANEL;
    visuals.panel_fill = light::BG_PANEL;
    visuals.faint_bg_color = light::BG_DARK;
    visuals.extreme_bg_color = light::BG_INPUT;

    visuals.widgets.noninteractive.bg_fill = light::BG_INPUT;
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, light::TEXT_MUTED);
    visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, light::BORDER);

    visuals.widgets.inactive.bg_fill = light::BG_INPUT;
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, light::TEXT_PRIMARY);
    visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, light::BORDER_LIGHT);

    visuals.widgets.hovered.bg_fill = light::BUTTON_HOVER;
    visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, light::TEXT_PRIMARY);

    visuals.selection.bg_fill = accent::BLUE.gamma_multiply(0.2);
    apply_shared_widget_style(&mut visuals);
    visuals
}

/// Accent strokes and rounding common to both themes.
fn apply_shared_widget_style(visuals: &mut Visuals) {
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, accent::BLUE);
    visuals.widgets.active.bg_fill = accent::BLUE;
    visuals.widgets.active.fg_stroke = Stroke::new(1.0, Color32::WHITE);
    visuals.widgets.active.bg_stroke = Stroke::new(1.0, accent::BLUE);
    visuals.selection.stroke = Stroke::new(1.0, accent::BLUE);

    for widget in [
        &mut visuals.widgets.noninteractive,
        &mut visuals.widgets.inactive,
        &mut visuals.widgets.hovered,
        &mut visuals.widgets.active,
        &mut visuals.widgets.open,
    ] {
        widget.rounding = Rounding::same(4.0);
    }
}

/// Configure fonts and spacing (theme-independent).
fn configure_fonts_and_spacing(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    style.text_styles = [
        (TextStyle::Small, FontId::new(10.0, FontFamily::Monospace)),
        (TextStyle::Body, FontId::new(12.0, FontFamily::Monospace)),
        (TextStyle::Button, FontId::new(12.0, FontFamily::Monospace)),
        (TextStyle::Heading, FontId::new(14.0, FontFamily::Monospace)),
        (
            TextStyle::Monospace,
            FontId::new(12.0, FontFamily::Monospace),
        ),
    ]
    .into();

    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(10.0, 6.0);
    style.spacing.indent = 16.0;

    ctx.set_style(style);
}

/// Style a button as the primary action button.
pub fn primary_button(text: &str) -> egui::Button<'_> {
    egui::Button::new(egui::RichText::new(text).color(Color32::WHITE))
        .fill(accent::GREEN)
        .rounding(Rounding::same(4.0))
}

/// Create a section header label.
pub fn section_header(text: &str) -> egui::RichText {
    egui::RichText::new(text.to_uppercase()).size(11.0).strong()
}

/// Create a form label.
pub fn form_label(text: &str) -> egui::RichText {
    egui::RichText::new(text.to_uppercase()).size(10.0)
}

/// Create a stat label (left column).
pub fn stat_label(text: &str) -> egui::RichText {
    egui::RichText::new(text).size(11.0).weak()
}

/// Create a stat value (right column).
pub fn stat_value(text: &str) -> egui::RichText {
    egui::RichText::new(text).size(11.0)
}

/// Converts a palette color for painting.
pub fn swatch_color(color: Rgb) -> Color32 {
    Color32::from_rgb(color.r, color.g, color.b)
}

/// Paints a small square swatch of `color` inline.
pub fn color_swatch(ui: &mut egui::Ui, color: Rgb) -> egui::Response {
    let (rect, response) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
    let border = ThemeColors::from_ui(ui).border;
    ui.painter()
        .rect_filled(rect, Rounding::same(2.0), swatch_color(color));
    ui.painter()
        .rect_stroke(rect, Rounding::same(2.0), Stroke::new(1.0, border));
    response
}
