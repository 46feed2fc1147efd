//! Engine lifecycle notifications
//!
//! Each engine owns one broadcast channel. Sending never blocks the
//! adaptation; events are dropped when nobody is subscribed.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::pipeline::StrategyKind;

const EVENT_CAPACITY: usize = 64;

/// Phases reported to progress callbacks and subscribers, in run order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Analyzing,
    SelectingStrategy,
    BuildingPipeline,
    Executing,
    Validating,
    Finalizing,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Analyzing => "analyzing",
            Phase::SelectingStrategy => "selectingStrategy",
            Phase::BuildingPipeline => "buildingPipeline",
            Phase::Executing => "executing",
            Phase::Validating => "validating",
            Phase::Finalizing => "finalizing",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Phase::Analyzing => "Analyzing content structure and complexity...",
            Phase::SelectingStrategy => "Determining optimal processing strategy...",
            Phase::BuildingPipeline => "Initializing adaptation pipeline...",
            Phase::Executing => "Executing content adaptation...",
            Phase::Validating => "Validating output quality...",
            Phase::Finalizing => "Finalizing adaptation...",
        }
    }
}

/// One progress update for the caller's callback
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptationProgress {
    pub phase: Phase,
    pub message: String,
}

impl AdaptationProgress {
    pub fn phase(phase: Phase) -> Self {
        Self {
            phase,
            message: phase.message().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum EngineEvent {
    #[serde(rename = "adaptation:started")]
    Started { job_id: String },
    #[serde(rename = "adaptation:phase")]
    PhaseChanged { job_id: String, phase: Phase },
    #[serde(rename = "adaptation:completed")]
    Completed {
        job_id: String,
        strategy: StrategyKind,
        quality_score: Option<f64>,
    },
    #[serde(rename = "adaptation:error")]
    Failed { job_id: String, message: String },
}

impl EngineEvent {
    pub fn job_id(&self) -> &str {
        match self {
            EngineEvent::Started { job_id }
            | EngineEvent::PhaseChanged { job_id, .. }
            | EngineEvent::Completed { job_id, .. }
            | EngineEvent::Failed { job_id, .. } => job_id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EngineEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }
}

impl EventBus {
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: EngineEvent) {
        // Err only means there are no receivers
        let _ = self.sender.send(event);
    }
}
