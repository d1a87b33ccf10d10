use eframe::egui::{Align2, Color32, Sense, TextStyle, Ui, Vec2, Widget};

pub struct Value<N> {
    pub value: N,
    /// whether the value gets a label on the dial
    pub show: bool,
}

/// `0..count` for a dial, labelling every `label_every`th value
pub fn dial_values(count: u32, label_every: u32) -> impl Iterator<Item = Value<u32>> + Clone {
    (0..count).map(move |value| Value {
        value,
        show: label_every != 0 && value % label_every == 0,
    })
}

/// which of `count` equal parts of the dial an angle points at,
/// 0 degrees being the top and going clockwise
#[must_use]
pub fn index_at_angle(degrees: f32, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    let part_angle = 360. / count as f32;
    ((degrees.rem_euclid(360.) / part_angle).floor() as usize).min(count - 1)
}

/// A round dial that picks one of `values`, used for the hour and minute of an alarm.
pub struct Knob<'a, N, I> {
    value: &'a mut N,
    hand_color: Option<Color32>,
    radius: Option<f32>,
    values: I,
    index: usize,
}

impl<'a, N: PartialEq, I: Iterator<Item = Value<N>> + Clone> Knob<'a, N, I> {
    pub fn new(value: &'a mut N, values: I) -> Self {
        Self {
            // a value that isn't on the dial points the hand at the top
            index: values.clone().position(|n| n.value == *value).unwrap_or(0),
            value,
            hand_color: None,
            radius: None,
            values,
        }
    }

    /// Set how big the knob should be relative to its radius
    #[must_use]
    pub const fn radius(mut self, radius: Option<f32>) -> Self {
        self.radius = radius;
        self
    }

    // set the hand color of the knob
    #[must_use]
    pub const fn hand_color(mut self, hand_color: Option<Color32>) -> Self {
        self.hand_color = hand_color;
        self
    }
}

impl<N, I> Widget for Knob<'_, N, I>
where
    N: ToString,
    I: Iterator<Item = Value<N>> + Clone,
{
    // partially from https://github.com/obsqrbtz/egui_knob and https://codeberg.org/pintariching/egui_timepicker
    fn ui(self, ui: &mut Ui) -> eframe::egui::Response {
        let Self {
            value,
            hand_color,
            radius,
            values,
            mut index,
        } = self;

        let count = values.clone().count();
        let desired_radius = radius.unwrap_or_else(|| ui.spacing().slider_width / 2.);
        let (rect, mut response) =
            ui.allocate_exact_size(Vec2::splat(desired_radius * 2.), Sense::click_and_drag());
        // the angle (degrees) for each value
        let part_angle = 360. / count.max(1) as f32;
        if response.dragged() || response.clicked() {
            if let Some(pointer) = response.interact_pointer_pos() {
                // inverse of the math for drawing the hand (see below),
                // we go from a point to the index of a value
                let n = index_at_angle((pointer - rect.center()).angle().to_degrees() + 90., count);
                if let Some(picked) = values.clone().nth(n) {
                    index = n;
                    *value = picked.value;
                    response.mark_changed();
                }
            }
        }
        let visuals = ui.style().interact(&response);
        ui.painter().circle_filled(
            rect.center(),
            desired_radius,
            visuals.bg_fill,
        );
        let border_stroke = visuals.fg_stroke;
        for (i, Value { value, show: _ }) in values.enumerate().filter(|(_, v)| v.show) {
            let angle = (part_angle * i as f32) - 90.;
            let label = rect.center()
                + Vec2::angled(angle.to_radians())
                    * (desired_radius - ui.style().spacing.icon_width_inner);
            ui.painter().text(
                label,
                Align2::CENTER_CENTER,
                value.to_string(),
                TextStyle::Monospace.resolve(ui.style()),
                ui.style().visuals.text_color(),
            );
        }
        ui.painter()
            .circle_stroke(rect.center(), desired_radius, border_stroke);
        // we subtract 90 at the end to get the first value to be at the top
        let angle = (part_angle * index as f32) - 90.;
        let pointer = rect.center() + Vec2::angled(angle.to_radians()) * desired_radius;
        let mut hand_stroke = visuals.fg_stroke;
        if let Some(color) = hand_color {
            hand_stroke.color = color;
        }

        let tip = rect.center()
            + Vec2::angled(angle.to_radians()) * border_stroke.width.mul_add(-2., desired_radius);
        ui.painter()
            .line_segment([rect.center(), pointer], hand_stroke);
        ui.painter().circle_filled(
            tip,
            hand_stroke.width * 2.,
            hand_color.unwrap_or(visuals.fg_stroke.color),
        );
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_of_dial_is_first_value() {
        assert_eq!(index_at_angle(0., 60), 0);
        assert_eq!(index_at_angle(359.9, 60), 59);
        assert_eq!(index_at_angle(-1., 24), 23);
    }

    #[test]
    fn quarter_turns() {
        assert_eq!(index_at_angle(90., 60), 15);
        assert_eq!(index_at_angle(180., 24), 12);
        assert_eq!(index_at_angle(450., 24), 6);
    }

    #[test]
    fn empty_dial() {
        assert_eq!(index_at_angle(123., 0), 0);
    }

    #[test]
    fn labels_every_fifth_minute() {
        let labelled: Vec<u32> = dial_values(60, 5)
            .filter(|v| v.show)
            .map(|v| v.value)
            .collect();
        assert_eq!(labelled.len(), 12);
        assert_eq!(labelled[1], 5);
        assert!(dial_values(24, 0).all(|v| !v.show));
    }
}
