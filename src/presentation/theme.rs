use eframe::egui;

pub struct Palette {
    pub bg: egui::Color32,
    pub fg: egui::Color32,
    pub stroke: egui::Color32,
    pub accent: egui::Color32,
    pub ok: egui::Color32,
    pub warn: egui::Color32,
    pub error: egui::Color32,
    pub info: egui::Color32,
}

impl Palette {
    pub fn new(is_dark: bool) -> Self {
        if is_dark {
            Self {
                bg: egui::Color32::from_rgb(25, 25, 25),
                fg: egui::Color32::WHITE,
                stroke: egui::Color32::WHITE,
                accent: egui::Color32::from_rgb(255, 200, 0),
                ok: egui::Color32::from_rgb(0, 230, 120),
                warn: egui::Color32::from_rgb(255, 200, 0),
                error: egui::Color32::from_rgb(255, 80, 80),
                info: egui::Color32::from_rgb(120, 170, 255),
            }
        } else {
            Self {
                bg: egui::Color32::from_rgb(245, 245, 245),
                fg: egui::Color32::BLACK,
                stroke: egui::Color32::BLACK,
                accent: egui::Color32::from_rgb(255, 220, 0),
                ok: egui::Color32::from_rgb(0, 150, 0),
                warn: egui::Color32::from_rgb(200, 150, 0),
                error: egui::Color32::from_rgb(220, 40, 40),
                info: egui::Color32::from_rgb(40, 40, 220),
            }
        }
    }
}

pub fn configure_theme(ctx: &egui::Context, is_dark: bool) {
    let mut style = (*ctx.style()).clone();
    let palette = Palette::new(is_dark);

    style
        .text_styles
        .iter_mut()
        .for_each(|(text_style, font_id)| {
            font_id.size = match text_style {
                egui::TextStyle::Heading => 24.0,
                egui::TextStyle::Body => 15.0,
                egui::TextStyle::Button => 15.0,
                _ => font_id.size,
            };
        });

    style.spacing.item_spacing = egui::vec2(10.0, 10.0);
    style.spacing.button_padding = egui::vec2(14.0, 8.0);

    let widgets = &mut style.visuals.widgets;
    widgets.noninteractive.bg_stroke = egui::Stroke::new(2.0, palette.stroke);
    widgets.noninteractive.rounding = egui::Rounding::ZERO;
    widgets.noninteractive.fg_stroke = egui::Stroke::new(1.0, palette.fg);
    widgets.noninteractive.bg_fill = palette.bg;

    widgets.inactive.bg_stroke = egui::Stroke::new(2.0, palette.stroke);
    widgets.inactive.rounding = egui::Rounding::ZERO;
    widgets.inactive.bg_fill = if is_dark {
        egui::Color32::from_gray(30)
    } else {
        egui::Color32::WHITE
    };
    widgets.inactive.fg_stroke = egui::Stroke::new(1.0, palette.fg);

    widgets.hovered.bg_stroke = egui::Stroke::new(2.5, palette.stroke);
    widgets.hovered.rounding = egui::Rounding::ZERO;
    widgets.hovered.bg_fill = palette.accent;
    widgets.hovered.fg_stroke = egui::Stroke::new(1.0, egui::Color32::BLACK);

    widgets.active.bg_stroke = egui::Stroke::new(3.0, palette.stroke);
    widgets.active.rounding = egui::Rounding::ZERO;
    widgets.active.bg_fill = palette.ok;
    widgets.active.fg_stroke = egui::Stroke::new(1.0, egui::Color32::BLACK);

    style.visuals.selection.stroke = egui::Stroke::new(1.0, palette.stroke);
    style.visuals.selection.bg_fill = palette.info;

    style.visuals.window_rounding = egui::Rounding::ZERO;
    style.visuals.window_stroke = egui::Stroke::new(2.0, palette.stroke);
    style.visuals.window_fill = palette.bg;
    style.visuals.panel_fill = palette.bg;
    style.visuals.override_text_color = Some(palette.fg);

    ctx.set_style(style);
}
