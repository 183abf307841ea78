use crate::config::{leading_integer, QuizConfig};
use crate::problem::FactorPair;
use crate::sampler::QuestionSampler;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct { answer: u32, next: FactorPair },
    Incorrect,
    /// Not a number yet, or the round is over.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub score: u32,
    pub questions: u32,
    pub max_factor: u8,
    pub finished_at: DateTime<Utc>,
}

/// State of one timed round. Owned by whoever drives the screens.
#[derive(Debug, Clone)]
pub struct QuizSession {
    config: QuizConfig,
    sampler: QuestionSampler,
    current: FactorPair,
    time_left: u32,
    score: u32,
    question_count: u32,
    history: Vec<String>,
}

impl QuizSession {
    /// `previous` is the last question of the round before, if any, so a
    /// new round never opens on the question the last one ended on.
    pub fn start<R: Rng + ?Sized>(
        config: QuizConfig,
        previous: Option<FactorPair>,
        rng: &mut R,
    ) -> Self {
        Self::start_with(config, QuestionSampler::new(), previous, rng)
    }

    pub fn start_with<R: Rng + ?Sized>(
        config: QuizConfig,
        sampler: QuestionSampler,
        previous: Option<FactorPair>,
        rng: &mut R,
    ) -> Self {
        let config = config.clamped();
        let first = sampler.next(config.max_factor, previous.as_ref(), rng);
        info!(
            max_factor = config.max_factor,
            round_secs = config.round_secs,
            "round started"
        );

        Self {
            config,
            sampler,
            current: first,
            time_left: config.round_secs,
            score: 0,
            question_count: 1,
            history: vec![first.display()],
        }
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    pub fn current(&self) -> FactorPair {
        self.current
    }

    pub fn expected_answer(&self) -> u32 {
        self.current.answer()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    /// Every question shown this round, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn is_finished(&self) -> bool {
        self.time_left == 0
    }

    /// Share of the round still remaining, from 1.0 down to 0.0.
    pub fn remaining_fraction(&self) -> f32 {
        self.time_left as f32 / self.config.round_secs as f32
    }

    /// Checks the answer field as it is typed. Only a correct answer moves
    /// the round on; wrong numbers leave the question in place.
    pub fn submit<R: Rng + ?Sized>(&mut self, input: &str, rng: &mut R) -> AnswerOutcome {
        if self.is_finished() {
            return AnswerOutcome::Ignored;
        }
        let Some(typed) = leading_integer(input) else {
            return AnswerOutcome::Ignored;
        };

        let answer = self.expected_answer();
        if typed != i64::from(answer) {
            return AnswerOutcome::Incorrect;
        }

        self.score += 1;
        let next = self.advance(rng);
        AnswerOutcome::Correct { answer, next }
    }

    fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> FactorPair {
        let next = self
            .sampler
            .next(self.config.max_factor, Some(&self.current), rng);
        debug!(previous = %self.current, next = %next, "next question");
        self.current = next;
        self.history.push(next.display());
        self.question_count += 1;
        next
    }

    /// Called once per elapsed second.
    pub fn tick(&mut self) -> TickOutcome {
        if self.time_left == 0 {
            return TickOutcome::Finished;
        }
        self.time_left -= 1;
        if self.time_left == 0 {
            info!(score = self.score, questions = self.question_count, "round finished");
            TickOutcome::Finished
        } else {
            TickOutcome::Running
        }
    }

    pub fn finish(&self) -> SessionResult {
        SessionResult {
            score: self.score,
            questions: self.question_count,
            max_factor: self.config.max_factor,
            finished_at: Utc::now(),
        }
    }
}
