use tracing::{debug, error, info};

use crate::analysis::{AnalysisClient, AnalysisRequest, AnalysisResult, ModelChoice};
use crate::error::AnalysisError;

const SPINNER: [char; 3] = ['|', '/', '-'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Text,
    Model,
    Trigger,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Text => Focus::Model,
            Focus::Model => Focus::Trigger,
            Focus::Trigger => Focus::Text,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Focus::Text => Focus::Trigger,
            Focus::Model => Focus::Text,
            Focus::Trigger => Focus::Model,
        }
    }
}

/// A request that has been started but not yet sent.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAnalysis {
    pub generation: u64,
    pub request: AnalysisRequest,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub focus: Focus,

    // Inputs
    pub text: String,
    pub cursor: usize, // cursor position in text, in chars
    pub model: ModelChoice,

    // Derived from the last submission
    pub result: Option<AnalysisResult>,
    pub error: Option<String>,
    pub loading: bool,

    // Bumped on every trigger; completions carrying an older value are dropped
    pub generation: u64,

    pub result_scroll: u16,
    pub animation_frame: u8,

    pub client: AnalysisClient,
}

impl App {
    pub fn new(client: AnalysisClient, model: ModelChoice) -> Self {
        Self {
            should_quit: false,
            focus: Focus::Text,

            text: String::new(),
            cursor: 0,
            model,

            result: None,
            error: None,
            loading: false,

            generation: 0,

            result_scroll: 0,
            animation_frame: 0,

            client,
        }
    }

    /// Start a submission: clears the previous outcome and marks the app busy before
    /// anything goes over the wire.
    pub fn begin_analysis(&mut self) -> PendingAnalysis {
        self.loading = true;
        self.error = None;
        self.result = None;
        self.result_scroll = 0;
        self.animation_frame = 0;
        self.generation += 1;

        info!(generation = self.generation, model = self.model.as_str(), "analysis started");

        PendingAnalysis {
            generation: self.generation,
            request: AnalysisRequest {
                text: self.text.clone(),
                model: self.model,
            },
        }
    }

    /// Apply a completion. Returns false when it belongs to a superseded trigger and
    /// was ignored.
    pub fn finish_analysis(
        &mut self,
        generation: u64,
        outcome: Result<AnalysisResult, AnalysisError>,
    ) -> bool {
        if generation != self.generation {
            debug!(generation, latest = self.generation, "dropping stale analysis response");
            return false;
        }

        match outcome {
            Ok(result) => {
                self.result = Some(result);
            }
            Err(err) => {
                error!(error = %err, "API error");
                self.error = Some(err.to_string());
            }
        }

        self.loading = false;
        true
    }

    pub fn busy_label(&self) -> String {
        let spin = SPINNER[self.animation_frame as usize % SPINNER.len()];
        format!("{} Analyzing...", spin)
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.loading {
            self.animation_frame = (self.animation_frame + 1) % SPINNER.len() as u8;
        }
    }

    pub fn toggle_model(&mut self) {
        self.model = self.model.toggle();
    }

    // Text editing
    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.text.chars().count();
        self.cursor = (self.cursor + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    pub fn clear_text(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    // Result scrolling
    pub fn scroll_result_down(&mut self) {
        self.result_scroll = self.result_scroll.saturating_add(1);
    }

    pub fn scroll_result_up(&mut self) {
        self.result_scroll = self.result_scroll.saturating_sub(1);
    }
}
