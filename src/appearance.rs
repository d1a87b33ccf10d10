use std::fmt;

use eframe::egui::{self, Color32, FontFamily, RichText, Slider, Window};

use crate::config::{Config, MAX_BRIGHTNESS, MIN_BRIGHTNESS, SNOOZE_MINUTES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockColor {
    Red,
    Orange,
    Yellow,
    Green,
    Cyan,
    Blue,
    Purple,
    White,
}

impl ClockColor {
    /// in the order the editor shows them, `color_index` points into this
    pub const ALL: [Self; 8] = [
        Self::Red,
        Self::Orange,
        Self::Yellow,
        Self::Green,
        Self::Cyan,
        Self::Blue,
        Self::Purple,
        Self::White,
    ];

    #[must_use]
    pub const fn color32(self) -> Color32 {
        match self {
            Self::Red => Color32::from_rgb(0xff, 0x2d, 0x20),
            Self::Orange => Color32::from_rgb(0xff, 0x95, 0x00),
            Self::Yellow => Color32::from_rgb(0xff, 0xd6, 0x0a),
            Self::Green => Color32::from_rgb(0x30, 0xd1, 0x58),
            Self::Cyan => Color32::from_rgb(0x64, 0xd2, 0xff),
            Self::Blue => Color32::from_rgb(0x0a, 0x84, 0xff),
            Self::Purple => Color32::from_rgb(0xbf, 0x5a, 0xf2),
            Self::White => Color32::from_rgb(0xf2, 0xf2, 0xf7),
        }
    }

    /// the clock color dimmed to `brightness`
    #[must_use]
    pub fn dimmed(self, brightness: f32) -> Color32 {
        self.color32().gamma_multiply(brightness)
    }
}

impl fmt::Display for ClockColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockFont {
    Rounded,
    Digital,
}

impl ClockFont {
    pub const ALL: [Self; 2] = [Self::Rounded, Self::Digital];

    #[must_use]
    pub fn family(self) -> FontFamily {
        match self {
            Self::Rounded => FontFamily::Proportional,
            Self::Digital => FontFamily::Monospace,
        }
    }
}

impl fmt::Display for ClockFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Shows the appearance editor while `open` is set.
///
/// Returns whether anything changed this frame. Saving is left to the caller,
/// which does it once the window gets closed.
pub fn render_appearance_editor(ctx: &egui::Context, open: &mut bool, config: &mut Config) -> bool {
    let mut changed = false;
    Window::new("Appearance")
        .open(open)
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.label("Color");
            ui.horizontal_wrapped(|ui| {
                for (i, color) in ClockColor::ALL.iter().enumerate() {
                    let swatch = RichText::new(format!("⏺ {color}")).color(color.color32());
                    changed |= ui
                        .selectable_value(&mut config.color_index, i, swatch)
                        .changed();
                }
            });
            ui.separator();

            ui.label("Font");
            ui.horizontal(|ui| {
                for (i, font) in ClockFont::ALL.iter().enumerate() {
                    let sample = RichText::new(format!("12:34 {font}")).family(font.family());
                    changed |= ui
                        .selectable_value(&mut config.font_index, i, sample)
                        .changed();
                }
            });
            ui.horizontal(|ui| {
                changed |= ui
                    .selectable_value(&mut config.time_format, "%H:%M".to_string(), "24 hour")
                    .changed();
                changed |= ui
                    .selectable_value(&mut config.time_format, "%l:%M %p".to_string(), "12 hour")
                    .changed();
            });
            ui.separator();

            let mut brightness = config.brightness();
            if ui
                .add(Slider::new(&mut brightness, MIN_BRIGHTNESS..=MAX_BRIGHTNESS).text("brightness"))
                .changed()
            {
                config.set_brightness(brightness);
                changed = true;
            }
            ui.separator();

            ui.label("Snooze");
            changed |= ui
                .add(Slider::new(&mut config.snooze_minutes, SNOOZE_MINUTES).suffix(" min"))
                .changed();
            changed |= ui
                .add(Slider::new(&mut config.snooze_limit, 0..=10).text("limit (0 = none)"))
                .changed();
        });
    changed
}
