#![warn(clippy::pedantic, clippy::nursery, clippy::cargo)]
#![deny(clippy::use_self, rust_2018_idioms)]
#![allow(
    clippy::multiple_crate_versions,
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

use std::{path::PathBuf, time::Duration};

use alarm::AlarmState;
use alarm_edit::{AlarmBuilder, EditingState};
use chrono::{Local, NaiveDateTime, Timelike};
use config::Config;
use eframe::egui::{
    self, Align, Button, CentralPanel, Color32, Context, FontId, Key, Layout, RichText,
    TopBottomPanel, ViewportCommand,
};
use monitor::{AlarmEvent, AlarmMonitor};
use player::Player;

/// the alarm state machine
pub mod alarm;
/// implementation of alarm editing for egui
pub mod alarm_edit;
pub mod appearance;
pub mod communication;
pub mod config;
pub mod error;
pub mod monitor;
pub mod player;
pub mod widgets;

/// how often the clock checks the alarms when nothing else wakes it up
const POLL_INTERVAL: Duration = Duration::from_secs(1);

pub struct Clock {
    config: Config,
    config_path: PathBuf,
    sounds_path: PathBuf,
    monitor: AlarmMonitor,
    player: Player,
    in_appearance: bool,
    /// appearance edits not written to disk yet
    appearance_changed: bool,
    editing: Option<AlarmBuilder>,
    fullscreen: bool,
}

impl Clock {
    #[must_use]
    pub fn new(config_path: PathBuf, sounds_path: PathBuf, player: Player) -> Self {
        Self {
            config: Config::load_or_default(&config_path),
            config_path,
            sounds_path,
            monitor: AlarmMonitor::new(),
            player,
            in_appearance: false,
            appearance_changed: false,
            editing: None,
            fullscreen: true,
        }
    }

    fn save(&self) {
        if let Err(e) = self.config.save(&self.config_path) {
            log::error!("{e}");
        }
    }

    /// the 1 second tick: advance every alarm and start or stop its sound
    fn poll_alarms(&mut self, now: NaiveDateTime) {
        for event in self.monitor.poll(self.config.alarms.as_mut_slice(), now) {
            match event {
                AlarmEvent::StartedRinging(slot) => {
                    let sound = self.config.alarm_source(slot, &self.sounds_path);
                    self.player.start(slot, sound);
                }
                AlarmEvent::StoppedRinging(slot) => self.player.stop(slot),
            }
        }
    }

    fn snooze_ringing(&mut self, now: NaiveDateTime) {
        let ringing: Vec<usize> = self.monitor.ringing().collect();
        for slot in ringing {
            let outcome = self.config.alarms[slot].snooze(
                now,
                self.config.snooze_minutes,
                self.config.snooze_limit,
            );
            log::debug!("snoozing alarm {}: {outcome:?}", slot + 1);
        }
        self.poll_alarms(now);
    }

    fn stop_ringing(&mut self, now: NaiveDateTime) {
        let ringing: Vec<usize> = self.monitor.ringing().collect();
        for slot in ringing {
            self.config.alarms[slot].dismiss(now);
        }
        self.poll_alarms(now);
    }

    fn toggle_alarm(&mut self, slot: usize, now: NaiveDateTime) {
        let alarm = &mut self.config.alarms[slot];
        alarm.set_active(!alarm.is_active());
        log::info!(
            "alarm {} switched {}",
            slot + 1,
            if alarm.is_active() { "on" } else { "off" }
        );
        self.save();
        self.poll_alarms(now);
    }

    /// edits are saved once the window gets closed, and only if something changed
    fn render_appearance(&mut self, ctx: &Context) {
        self.appearance_changed |=
            appearance::render_appearance_editor(ctx, &mut self.in_appearance, &mut self.config);
        if !self.in_appearance && std::mem::take(&mut self.appearance_changed) {
            self.save();
        }
    }

    /// every other second the display goes dark while a vibrating alarm rings
    fn flash_off(&self, now: NaiveDateTime) -> bool {
        now.second() % 2 == 1
            && self
                .monitor
                .ringing()
                .any(|slot| self.config.alarms[slot].vibrate)
    }

    fn render_header(&mut self, ctx: &Context) {
        TopBottomPanel::top("controls")
            .show_separator_line(false)
            .show(ctx, |ui| {
                ui.with_layout(Layout::right_to_left(Align::Min), |ui| {
                    if ui.button("Aa").on_hover_text("appearance").clicked() {
                        self.in_appearance = true;
                    }
                    if ui
                        .button(if self.fullscreen { "🗗" } else { "⛶" })
                        .on_hover_text("full screen (F11)")
                        .clicked()
                    {
                        self.toggle_fullscreen(ctx);
                    }
                });
            });
    }

    fn toggle_fullscreen(&mut self, ctx: &Context) {
        self.fullscreen = !self.fullscreen;
        ctx.send_viewport_cmd(ViewportCommand::Fullscreen(self.fullscreen));
    }

    fn render_alarm_buttons(&mut self, ctx: &Context, now: NaiveDateTime) {
        TopBottomPanel::bottom("alarms")
            .show_separator_line(false)
            .show(ctx, |ui| {
                let color = self.config.color().dimmed(self.config.brightness());
                ui.columns(alarm::ALARM_COUNT, |columns| {
                    for (slot, ui) in columns.iter_mut().enumerate() {
                        let alarm = &self.config.alarms[slot];
                        let state = self.monitor.states()[slot];
                        let label = format!(
                            "⏰ {}{}",
                            alarm.time().format(&self.config.time_format),
                            match state {
                                AlarmState::Snoozing => " 💤",
                                AlarmState::Deferred => " ✔",
                                AlarmState::Ringing | AlarmState::Idle => "",
                            }
                        );
                        let text = RichText::new(label).size(24.0).color(if alarm.is_active() {
                            color
                        } else {
                            Color32::DARK_GRAY
                        });
                        ui.horizontal(|ui| {
                            if ui
                                .add(Button::new(text).frame(false))
                                .on_hover_text("switch on or off")
                                .clicked()
                            {
                                self.toggle_alarm(slot, now);
                            }
                            if ui.small_button("✏").on_hover_text("edit alarm").clicked() {
                                self.editing = Some(AlarmBuilder::new(slot, &self.config.alarms[slot]));
                            }
                        });
                    }
                });
            });
    }

    fn render_time(&mut self, ctx: &Context, now: NaiveDateTime) {
        CentralPanel::default().show(ctx, |ui| {
            let color = if self.flash_off(now) {
                Color32::BLACK
            } else {
                self.config.color().dimmed(self.config.brightness())
            };
            let time = now.format(&self.config.time_format).to_string();
            let time = time.trim();
            // roughly fill the width, digits are about 0.6 of the font size wide
            let size = (ui.available_width() / (time.chars().count().max(1) as f32 * 0.6))
                .min(ui.available_height() * 0.6);
            ui.with_layout(Layout::top_down(Align::Center), |ui| {
                ui.add_space((ui.available_height() - size) / 3.0);
                ui.label(
                    RichText::new(time)
                        .font(FontId::new(size, self.config.font().family()))
                        .color(color),
                );
                if self.monitor.any_ringing() {
                    ui.horizontal(|ui| {
                        let big = |text: &str| RichText::new(text).size(40.0);
                        if ui.add(Button::new(big("Snooze"))).clicked() {
                            self.snooze_ringing(now);
                        }
                        ui.add_space(40.0);
                        if ui.add(Button::new(big("Stop"))).clicked() {
                            self.stop_ringing(now);
                        }
                    });
                }
            });
        });
    }
}

impl eframe::App for Clock {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // keep ticking even without input so alarms go off on time
        ctx.request_repaint_after(POLL_INTERVAL);
        let now = Local::now().naive_local();
        self.poll_alarms(now);

        let mut visuals = egui::Visuals::dark();
        visuals.panel_fill = Color32::BLACK;
        ctx.set_visuals(visuals);

        if ctx.input(|i| i.key_pressed(Key::F11)) {
            self.toggle_fullscreen(ctx);
        }

        if self.in_appearance {
            self.render_appearance(ctx);
        }

        if let Some(editing) = &mut self.editing {
            match editing.render_alarm_editor(ctx, &self.config.sounds) {
                EditingState::Done(draft) => {
                    let slot = draft.slot;
                    draft.apply(&mut self.config.alarms[slot]);
                    self.editing = None;
                    Clock::save(self);
                    self.poll_alarms(now);
                }
                EditingState::Reset => {
                    self.config.reset_alarm(editing.slot);
                    self.editing = None;
                    Clock::save(self);
                    self.poll_alarms(now);
                }
                EditingState::Cancelled => {
                    self.editing = None;
                }
                EditingState::Editing => {}
            }
        }

        self.render_header(ctx);
        self.render_alarm_buttons(ctx, now);
        self.render_time(ctx, now);
    }
}
