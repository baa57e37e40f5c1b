use chrono::{DateTime, Local};
use eframe::{egui, App, CreationContext, Frame};
use egui::{Align, Color32, Layout, RichText, ScrollArea, Ui};
use log::error;

mod history;
mod models;
mod timers;
use history::HistoryStore;
use models::{default_session, format_time, Exercise, WorkoutSession};
use timers::{TimeField, TimerController};

fn main() -> Result<(), eframe::Error> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1280 as f32, 800 as f32]),
        ..Default::default()
    };

    eframe::run_native(
        "SuperSlow Tracker",
        options,
        Box::new(|cc| Ok(Box::new(TrackerApp::new(cc)))),
    )
}

#[derive(PartialEq, Clone, Copy)]
enum DisplayMode {
    Workout,
    History,
}

/// UI actions gathered while drawing the exercise rows, applied after the
/// loop so the controller is not mutated mid-iteration.
enum RowAction {
    Toggle(String),
    Lap(String),
    StartEdit(String, TimeField),
    CommitEdit,
}

struct TrackerApp {
    exercises: Vec<Exercise>,
    controller: TimerController,
    history: HistoryStore,
    display_mode: DisplayMode,
    history_filter: Option<String>,
    status_message: Option<String>,
}

impl TrackerApp {
    fn new(_cc: &CreationContext) -> Self {
        let history = HistoryStore::load(HistoryStore::default_path());
        let mut exercises = default_session();
        history.seed_weights(&mut exercises);

        TrackerApp {
            exercises,
            controller: TimerController::new(),
            history,
            display_mode: DisplayMode::Workout,
            history_filter: None,
            status_message: None,
        }
    }

    fn submit_workout(&mut self, now: DateTime<Local>) {
        let snapshot = self.controller.submit_all(&mut self.exercises);
        let session = WorkoutSession {
            id: now.timestamp_millis().to_string(),
            timestamp: now.format("%Y-%m-%d %H:%M").to_string(),
            exercises: snapshot,
        };
        match self.history.append(session) {
            Ok(()) => {
                self.status_message = Some("Workout saved.".to_string());
            }
            Err(e) => {
                error!("Failed to save workout: {:#}", e);
                self.status_message = Some(format!("Workout kept in memory, save failed: {}", e));
            }
        }
    }

    fn export_history(&mut self) {
        match self.history.export_csv_file(&self.history.export_dir()) {
            Ok(path) => {
                self.status_message = Some(format!("Exported to {}", path.display()));
            }
            Err(e) => {
                error!("CSV export failed: {:#}", e);
                self.status_message = Some(format!("Export failed: {}", e));
            }
        }
    }
}

impl App for TrackerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        let now = Local::now();
        self.controller.advance(&mut self.exercises, now);

        if ctx.input(|i| i.key_pressed(egui::Key::Num1)) {
            self.display_mode = DisplayMode::Workout;
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Num2)) {
            self.display_mode = DisplayMode::History;
        }

        let mut style = (*ctx.style()).clone();
        style.text_styles.insert(
            egui::TextStyle::Body,
            egui::FontId::new(20.0, egui::FontFamily::Proportional),
        );
        style.text_styles.insert(
            egui::TextStyle::Heading,
            egui::FontId::new(32.0, egui::FontFamily::Proportional),
        );
        ctx.set_style(style);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.with_layout(Layout::top_down_justified(Align::Center), |ui| {
                ui.add_space(10.0);

                ui.horizontal(|ui| {
                    if ui
                        .selectable_label(self.display_mode == DisplayMode::Workout, "Workout")
                        .clicked()
                    {
                        self.display_mode = DisplayMode::Workout;
                    }
                    if ui
                        .selectable_label(self.display_mode == DisplayMode::History, "History")
                        .clicked()
                    {
                        self.display_mode = DisplayMode::History;
                    }
                });

                ui.add_space(20.0);

                match self.display_mode {
                    DisplayMode::Workout => self.show_workout_display(ui, now),
                    DisplayMode::History => self.show_history_display(ui),
                }
            });
        });

        ctx.request_repaint();
    }
}

impl TrackerApp {
    fn show_workout_display(&mut self, ui: &mut Ui, now: DateTime<Local>) {
        ui.label(
            RichText::new("Today's Workout")
                .heading()
                .size(32.0)
                .strong(),
        );
        ui.add_space(10.0);

        let mut actions: Vec<RowAction> = Vec::new();

        ScrollArea::vertical().max_height(480.0).show(ui, |ui| {
            ui.set_width(ui.available_width());
            for i in 0..self.exercises.len() {
                let name = self.exercises[i].name.clone();
                let running = self.controller.is_running(&name);
                let improved = self.history.improved(&self.exercises[i]);

                ui.horizontal(|ui| {
                    let toggle_text = if running { "Stop" } else { "Start" };
                    if ui
                        .button(RichText::new(toggle_text).size(22.0))
                        .clicked()
                    {
                        actions.push(RowAction::Toggle(name.clone()));
                    }

                    ui.label(RichText::new(&name).size(24.0).strong());

                    ui.label(RichText::new("Time:").size(20.0));
                    self.time_field(ui, i, TimeField::Elapsed, &mut actions);

                    ui.label(RichText::new("Lap:").size(20.0));
                    self.time_field(ui, i, TimeField::Lap, &mut actions);

                    if ui
                        .add_enabled(running, egui::Button::new(RichText::new("Lap").size(20.0)))
                        .clicked()
                    {
                        actions.push(RowAction::Lap(name.clone()));
                    }

                    ui.label(RichText::new("Weight:").size(20.0));
                    ui.add(
                        egui::TextEdit::singleline(&mut self.exercises[i].weight)
                            .desired_width(64.0),
                    );
                    ui.label(RichText::new("lbs").size(20.0));

                    if improved {
                        ui.label(
                            RichText::new("▲ up from last session")
                                .size(18.0)
                                .color(Color32::GREEN)
                                .strong(),
                        );
                    }
                });
                ui.add_space(8.0);
            }
        });

        for action in actions {
            match action {
                RowAction::Toggle(name) => self.controller.toggle(&mut self.exercises, &name, now),
                RowAction::Lap(name) => self.controller.lap(&mut self.exercises, &name),
                RowAction::StartEdit(name, field) => {
                    self.controller.start_edit(&mut self.exercises, &name, field)
                }
                RowAction::CommitEdit => self.controller.commit_edit(&mut self.exercises),
            }
        }

        ui.add_space(20.0);

        ui.horizontal(|ui| {
            if ui
                .button(RichText::new("Finish Workout").size(24.0).strong())
                .clicked()
            {
                self.submit_workout(now);
            }
            if ui
                .button(RichText::new("Export CSV").size(24.0))
                .clicked()
            {
                self.export_history();
            }
        });

        if let Some(message) = &self.status_message {
            ui.add_space(10.0);
            ui.label(RichText::new(message).size(18.0).color(Color32::GRAY));
        }
    }

    /// One time counter, shown as a clickable mm:ss label that turns into
    /// a text box while being edited. Losing focus (Enter included)
    /// commits the edit.
    fn time_field(&mut self, ui: &mut Ui, index: usize, field: TimeField, actions: &mut Vec<RowAction>) {
        let name = self.exercises[index].name.clone();
        let editing_this = self
            .controller
            .editing()
            .is_some_and(|e| e.exercise == name && e.field == field);

        if editing_this {
            if let Some(edit) = self.controller.edit_mut() {
                let response = ui.add(
                    egui::TextEdit::singleline(&mut edit.text).desired_width(56.0),
                );
                if response.lost_focus() {
                    actions.push(RowAction::CommitEdit);
                }
            }
        } else {
            let value = match field {
                TimeField::Elapsed => self.exercises[index].elapsed_seconds,
                TimeField::Lap => self.exercises[index].lap_seconds,
            };
            if ui
                .button(RichText::new(format_time(value)).size(22.0).monospace())
                .clicked()
            {
                actions.push(RowAction::StartEdit(name, field));
            }
        }
    }

    fn show_history_display(&mut self, ui: &mut Ui) {
        ui.label(
            RichText::new("Recent Sessions")
                .heading()
                .size(32.0)
                .strong(),
        );
        ui.add_space(10.0);

        ui.horizontal(|ui| {
            if ui
                .selectable_label(self.history_filter.is_none(), "All")
                .clicked()
            {
                self.history_filter = None;
            }
            for exercise in &self.exercises {
                let selected = self.history_filter.as_deref() == Some(exercise.name.as_str());
                if ui.selectable_label(selected, &exercise.name).clicked() {
                    self.history_filter = Some(exercise.name.clone());
                }
            }
        });

        ui.add_space(10.0);

        if self.history.sessions().is_empty() {
            ui.label(RichText::new("No sessions recorded yet.").size(24.0));
            return;
        }

        ScrollArea::vertical().max_height(520.0).show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.with_layout(Layout::top_down_justified(Align::Center), |ui| {
                for session in self.history.sessions() {
                    ui.label(
                        RichText::new(&session.timestamp)
                            .size(26.0)
                            .strong(),
                    );
                    for exercise in &session.exercises {
                        if let Some(filter) = &self.history_filter {
                            if &exercise.name != filter {
                                continue;
                            }
                        }
                        ui.horizontal(|ui| {
                            ui.label("•");
                            ui.label(RichText::new(&exercise.name).size(22.0).strong());
                            ui.label(
                                RichText::new(format_time(exercise.elapsed_seconds))
                                    .size(22.0)
                                    .color(Color32::BLUE)
                                    .monospace(),
                            );
                            let weight = if exercise.weight.is_empty() {
                                "0"
                            } else {
                                exercise.weight.as_str()
                            };
                            ui.label(
                                RichText::new(format!("{} lbs", weight))
                                    .size(22.0)
                                    .color(Color32::RED),
                            );
                        });
                    }
                    ui.add_space(14.0);
                }
            });
        });
    }
}
