// src/session.rs
//! Per-user state passed explicitly to each handler.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::engine::RasterEngine;
use crate::error::InputError;
use crate::processing::{CompositeSeries, SoilAnalyzer, SoilReport};
use crate::region::Region;
use crate::window::TimeWindow;

pub const DEFAULT_PERIOD_DAYS: u32 = 7;

/// Selected field, dates and the latest results of one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSession {
    pub region: Option<Region>,
    pub window: Option<TimeWindow>,
    pub period_days: u32,
    pub last_report: Option<SoilReport>,
    pub last_series: Option<CompositeSeries>,
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self {
            region: None,
            window: None,
            period_days: DEFAULT_PERIOD_DAYS,
            last_report: None,
            last_series: None,
        }
    }

    /// Select a new field; previous results no longer apply.
    pub fn select_region(&mut self, region: Region) {
        self.region = Some(region);
        self.last_report = None;
        self.last_series = None;
    }

    pub fn select_window(&mut self, window: TimeWindow) {
        self.window = Some(window);
        self.last_report = None;
        self.last_series = None;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn selection(&self) -> Result<(&Region, TimeWindow), InputError> {
        let region = self.region.as_ref().ok_or(InputError::Unselected("region"))?;
        let window = self.window.ok_or(InputError::Unselected("time window"))?;
        Ok((region, window))
    }

    pub fn run_report<E: RasterEngine>(
        &mut self,
        analyzer: &SoilAnalyzer<E>,
    ) -> Result<&SoilReport, InputError> {
        let (region, window) = self.selection()?;
        let report = analyzer.analyze(region, window);
        Ok(&*self.last_report.insert(report))
    }

    pub fn run_series<E: RasterEngine>(
        &mut self,
        analyzer: &SoilAnalyzer<E>,
    ) -> Result<&CompositeSeries, InputError> {
        let (region, window) = self.selection()?;
        let series = analyzer.series(region, window, self.period_days)?;
        Ok(&*self.last_series.insert(series))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SafetyThreshold {
    BlockNone,
    BlockOnlyHigh,
    BlockMediumAndAbove,
    BlockLowAndAbove,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
    pub presence_penalty: f64,
    pub frequency_penalty: f64,
    pub stop_sequences: Vec<String>,
    pub safety_threshold: SafetyThreshold,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            max_tokens: 150,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
            stop_sequences: Vec::new(),
            safety_threshold: SafetyThreshold::BlockMediumAndAbove,
        }
    }
}

pub const DEFAULT_SYSTEM_MESSAGE: &str = "You are a helpful assistant.";
pub const MAX_HISTORY: usize = 10;

/// Conversation state for the assistant. Holds no client; the caller
/// sends `history()` to whatever model endpoint it uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    pub model: String,
    pub params: GenerationParams,
    system: Message,
    messages: VecDeque<Message>,
    max_history: usize,
}

impl ChatSession {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            model: config.model.clone(),
            params: GenerationParams::default(),
            system: Message::new(Role::System, DEFAULT_SYSTEM_MESSAGE),
            messages: VecDeque::new(),
            max_history: MAX_HISTORY,
        }
    }

    pub fn with_system_message(mut self, content: impl Into<String>) -> Self {
        self.system = Message::new(Role::System, content);
        self
    }

    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self.trim();
        self
    }

    fn push(&mut self, message: Message) {
        self.messages.push_back(message);
        self.trim();
    }

    fn trim(&mut self) {
        while self.messages.len() > self.max_history {
            if let Some(dropped) = self.messages.pop_front() {
                debug!("dropping {:?} message from history", dropped.role);
            }
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Message::new(Role::User, content));
    }

    pub fn push_model(&mut self, content: impl Into<String>) {
        self.push(Message::new(Role::Model, content));
    }

    /// System message followed by the retained turns, oldest first.
    pub fn history(&self) -> Vec<&Message> {
        std::iter::once(&self.system).chain(self.messages.iter()).collect()
    }

    pub fn last_user_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == Role::User)
    }

    pub fn last_model_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == Role::Model)
    }

    /// Drop all turns; the system message and parameters stay.
    pub fn reset(&mut self) {
        self.messages.clear();
    }
}
