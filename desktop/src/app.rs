use crate::chart;
use crate::storage::{self, Storage};
use eframe::egui::{self, Align2, Color32, FontId, Sense, Shape, Stroke, Vec2};
use quiz_core::config::{self, QuizConfig};
use quiz_core::history::ScoreHistory;
use quiz_core::problem::FactorPair;
use quiz_core::session::{AnswerOutcome, QuizSession, SessionResult, TickOutcome};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const TICK: Duration = Duration::from_secs(1);
const FEEDBACK_CLEAR: Duration = Duration::from_millis(500);
const RING_COLOR: Color32 = Color32::from_rgb(37, 117, 252);
const CORRECT_COLOR: Color32 = Color32::from_rgb(50, 205, 50);

struct RoundSummary {
    score: u32,
    highest: u32,
}

enum Screen {
    Start,
    Quiz {
        session: QuizSession,
        next_tick: Instant,
        correct_at: Option<Instant>,
    },
    Results(RoundSummary),
}

pub struct TimesQuizApp {
    storage: Option<Storage>,
    history: ScoreHistory,
    config: QuizConfig,
    rng: StdRng,
    last_question: Option<FactorPair>,
    screen: Screen,
    max_input: String,
    answer_input: String,
    confirm_clear: bool,
    notice: Option<String>,
}

impl Default for TimesQuizApp {
    fn default() -> Self {
        let storage = match Storage::open() {
            Ok(storage) => Some(storage),
            Err(e) => {
                warn!(error = %e, "scores will not be saved");
                None
            }
        };
        let history = storage::load_scores_or_new(storage.as_ref());
        let config = storage::load_settings_or_default(storage.as_ref());

        Self {
            storage,
            history,
            config,
            rng: StdRng::from_entropy(),
            last_question: None,
            screen: Screen::Start,
            max_input: config.max_factor.to_string(),
            answer_input: String::new(),
            confirm_clear: false,
            notice: None,
        }
    }
}

impl TimesQuizApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self::default()
    }

    fn start_round(&mut self) {
        let max_factor = config::parse_max_factor(&self.max_input);
        self.max_input = max_factor.to_string();
        self.config = QuizConfig {
            max_factor,
            ..self.config
        };
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.save_settings(&self.config) {
                warn!(error = %e, "could not save settings");
            }
        }

        self.answer_input.clear();
        self.notice = None;
        self.confirm_clear = false;
        self.screen = Screen::Quiz {
            session: QuizSession::start(self.config, self.last_question, &mut self.rng),
            next_tick: Instant::now() + TICK,
            correct_at: None,
        };
    }

    fn end_round(&mut self, result: SessionResult, last_question: FactorPair) {
        self.last_question = Some(last_question);
        self.history.record(&result);
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.save_scores(&self.history) {
                warn!(error = %e, "could not save scores");
            }
        }

        self.answer_input.clear();
        self.screen = Screen::Results(RoundSummary {
            score: result.score,
            highest: self.history.highest(),
        });
    }

    fn clear_scores(&mut self) {
        self.history.clear();
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.clear_scores() {
                warn!(error = %e, "could not delete saved scores");
            }
        }
        if let Screen::Results(summary) = &mut self.screen {
            summary.highest = 0;
        }
        self.confirm_clear = false;
        self.notice = Some("Saved scores cleared.".to_string());
        info!("saved scores cleared");
    }

    fn start_screen(&mut self, ui: &mut egui::Ui) {
        ui.label("Practice multiplication up to:");
        ui.add_space(10.0);

        ui.horizontal(|ui| {
            if ui.add_sized([40.0, 40.0], egui::Button::new("−")).clicked() {
                self.max_input = config::step_down(&self.max_input).to_string();
            }
            ui.add(
                egui::TextEdit::singleline(&mut self.max_input)
                    .font(egui::TextStyle::Heading)
                    .desired_width(60.0)
                    .horizontal_align(egui::Align::Center),
            );
            if ui.add_sized([40.0, 40.0], egui::Button::new("+")).clicked() {
                self.max_input = config::step_up(&self.max_input).to_string();
            }
        });

        ui.add_space(10.0);
        ui.label(format!(
            "{} seconds, as many questions as you can.",
            self.config.round_secs
        ));
        ui.add_space(20.0);

        if ui
            .add_sized([120.0, 40.0], egui::Button::new("Start"))
            .clicked()
        {
            self.start_round();
        }
    }

    fn quiz_screen(&mut self, ui: &mut egui::Ui) {
        let Screen::Quiz {
            session,
            correct_at,
            ..
        } = &mut self.screen
        else {
            return;
        };

        timer_ring(ui, session.time_left(), session.remaining_fraction());
        ui.add_space(15.0);

        ui.label(
            egui::RichText::new(session.current().display())
                .size(48.0)
                .strong(),
        );
        ui.add_space(20.0);

        let response = ui.add(
            egui::TextEdit::singleline(&mut self.answer_input)
                .hint_text("Answer")
                .font(egui::TextStyle::Heading)
                .desired_width(150.0)
                .horizontal_align(egui::Align::Center),
        );
        if response.changed() {
            let outcome = session.submit(&self.answer_input, &mut self.rng);
            if let AnswerOutcome::Correct { .. } = outcome {
                self.answer_input.clear();
                *correct_at = Some(Instant::now());
            }
        }
        response.request_focus();

        ui.add_space(10.0);
        let feedback = match *correct_at {
            Some(at) if at.elapsed() < FEEDBACK_CLEAR => "Correct!",
            _ => {
                *correct_at = None;
                " "
            }
        };
        ui.label(egui::RichText::new(feedback).size(20.0).color(CORRECT_COLOR));

        ui.add_space(15.0);
        ui.horizontal(|ui| {
            ui.label(format!("Questions: {}", session.question_count()));
            ui.separator();
            ui.label(format!("Score: {}", session.score()));
        });
    }

    fn results_screen(&mut self, ui: &mut egui::Ui) {
        let Screen::Results(summary) = &self.screen else {
            return;
        };
        let (score, highest) = (summary.score, summary.highest);

        ui.label(egui::RichText::new(format!("Score: {}", score)).size(36.0).strong());
        ui.label(format!("Highest score: {}", highest));
        ui.add_space(15.0);

        chart::score_chart(ui, &self.history, Vec2::new(ui.available_width(), 200.0));
        ui.add_space(15.0);

        if ui
            .add_sized([120.0, 40.0], egui::Button::new("Play Again"))
            .clicked()
        {
            self.confirm_clear = false;
            self.notice = None;
            self.screen = Screen::Start;
            return;
        }

        ui.add_space(10.0);
        if self.confirm_clear {
            ui.label("Permanently delete all saved scores? This cannot be undone.");
            ui.horizontal(|ui| {
                if ui.button("Yes, delete").clicked() {
                    self.clear_scores();
                }
                if ui.button("Cancel").clicked() {
                    self.confirm_clear = false;
                }
            });
        } else if ui.small_button("Clear saved scores").clicked() {
            self.confirm_clear = true;
        }

        if let Some(notice) = &self.notice {
            ui.add_space(5.0);
            ui.label(notice);
        }
    }
}

/// Countdown number inside a ring that empties as the round runs out.
fn timer_ring(ui: &mut egui::Ui, time_left: u32, fraction: f32) {
    let (response, painter) = ui.allocate_painter(Vec2::splat(110.0), Sense::hover());
    let center = response.rect.center();
    let radius = 45.0;
    let track = ui.visuals().widgets.noninteractive.bg_stroke.color;

    painter.circle_stroke(center, radius, Stroke::new(8.0, track));

    let segments = 64;
    let sweep = std::f32::consts::TAU * fraction.clamp(0.0, 1.0);
    let start = -std::f32::consts::FRAC_PI_2;
    let arc: Vec<_> = (0..=segments)
        .map(|i| {
            let angle = start + sweep * i as f32 / segments as f32;
            center + radius * Vec2::angled(angle)
        })
        .collect();
    if fraction > 0.0 {
        painter.add(Shape::line(arc, Stroke::new(8.0, RING_COLOR)));
    }

    painter.text(
        center,
        Align2::CENTER_CENTER,
        time_left.to_string(),
        FontId::proportional(32.0),
        ui.visuals().strong_text_color(),
    );
}

impl eframe::App for TimesQuizApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut finished = None;

        if let Screen::Quiz {
            session, next_tick, ..
        } = &mut self.screen
        {
            let now = Instant::now();
            while now >= *next_tick {
                *next_tick += TICK;
                if session.tick() == TickOutcome::Finished {
                    finished = Some((session.finish(), session.current()));
                    break;
                }
            }
            ctx.request_repaint_after(Duration::from_millis(100));
        }
        if let Some((result, last_question)) = finished {
            self.end_round(result, last_question);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(20.0);
                ui.heading("Multiplication Quiz");
                ui.add_space(20.0);

                match self.screen {
                    Screen::Start => self.start_screen(ui),
                    Screen::Quiz { .. } => self.quiz_screen(ui),
                    Screen::Results(_) => self.results_screen(ui),
                }
            });
        });
    }
}
