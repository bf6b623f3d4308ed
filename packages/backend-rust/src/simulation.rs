//! Simulation driver
//!
//! Runs a synthetic learner from `bkt_algo::Simulation` against the predictor,
//! either over HTTP or against an in-process engine, and optionally records
//! every step as JSON lines.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use bkt_algo::simulation::{Attempt, StudentSnapshot, StudentState, TrackLesson};
use bkt_algo::{BktEngine, ObservationRecord, PredictionResult, Simulation, SimulationConfig};
use serde::Serialize;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::client::{BktClient, ClientError};
use crate::dto::{ObserveRequest, ObserveResponse, PredictRequest, PredictResponse};

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("event log I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("event encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where predictions and updates come from
pub enum Backend {
    Http(BktClient),
    InProcess(Arc<BktEngine>),
}

impl Backend {
    async fn predict(&self, request: &PredictRequest) -> Result<PredictResponse, SimulationError> {
        match self {
            Backend::Http(client) => Ok(client.predict(request).await?),
            Backend::InProcess(engine) => {
                request.validate().map_err(SimulationError::Rejected)?;
                let prediction = engine.predict(&request.as_input());
                PredictResponse::from_prediction(request, prediction)
                    .ok_or_else(|| SimulationError::Rejected("no action chosen".to_string()))
            }
        }
    }

    async fn observe(&self, request: &ObserveRequest) -> Result<ObserveResponse, SimulationError> {
        match self {
            Backend::Http(client) => Ok(client.observe(request).await?),
            Backend::InProcess(engine) => {
                request.validate().map_err(SimulationError::Rejected)?;
                let updated_l = engine.observe(&ObservationRecord::from(request));
                Ok(ObserveResponse { updated_l })
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct DriverOptions {
    pub iter_limit: usize,
    pub seed: Option<u64>,
    pub verbose: bool,
    pub log_jsonl: Option<PathBuf>,
    pub config: SimulationConfig,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            iter_limit: 100,
            seed: None,
            verbose: false,
            log_jsonl: None,
            config: SimulationConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub iterations: usize,
    pub done: bool,
    pub lessons_completed: u32,
    pub total_lessons: u32,
    pub lesson_mastery: f64,
    pub theme_mastery: f64,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "done={} lessons_completed={}/{}",
            self.done, self.lessons_completed, self.total_lessons
        )
    }
}

#[derive(Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
enum Event<'a> {
    RunStart {
        ts: String,
        run_id: Uuid,
        seed: Option<u64>,
        config: &'a SimulationConfig,
        student: &'a StudentState,
        track: &'a [TrackLesson],
    },
    Step {
        ts: String,
        run_id: Uuid,
        iteration: usize,
        pre: StudentSnapshot,
        chosen_action: &'a PredictionResult,
        attempted: bool,
        success: Option<bool>,
        p_success: Option<f64>,
        minutes_spent: u32,
        #[serde(rename = "updated_L")]
        updated_l: Option<f64>,
        post: StudentSnapshot,
        lesson_done: bool,
    },
    Summary {
        ts: String,
        run_id: Uuid,
        iterations: usize,
        done: bool,
        lessons_completed: u32,
        total_lessons: u32,
    },
}

struct EventLog {
    file: Option<File>,
}

impl EventLog {
    async fn open(path: Option<&PathBuf>) -> Result<Self, SimulationError> {
        let Some(path) = path else {
            return Ok(Self { file: None });
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(Self {
            file: Some(File::create(path).await?),
        })
    }

    async fn write(&mut self, event: &Event<'_>) -> Result<(), SimulationError> {
        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}

/// One human-readable line per step for `--verbose`
fn step_line(
    iteration: usize,
    target: f64,
    pre: &StudentSnapshot,
    post: &StudentSnapshot,
    chosen: &PredictionResult,
    attempt: &Attempt,
    lesson_done: bool,
) -> String {
    let success = attempt.success.map_or("-".to_string(), |s| s.to_string());
    let p_success = attempt.p_success.map_or("-".to_string(), |p| format!("{p:.3}"));
    format!(
        "[{iteration:03}] lesson={} attempts={} lesson_mastery={:.3} lesson_target={target:.2} \
         chosen={} attempted={} success={success} p={p_success} done={lesson_done} theme_mastery={:.3}",
        pre.lesson_index,
        post.attempts_done,
        post.lesson_mastery,
        chosen.action_id,
        attempt.attempted,
        post.theme_mastery,
    )
}

fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Drive one learner through the track until it is finished or `iter_limit` steps ran
pub async fn run(backend: &Backend, options: &DriverOptions) -> Result<RunSummary, SimulationError> {
    let run_id = Uuid::new_v4();
    let mut sim = Simulation::new(options.config, options.seed);
    let mut log = EventLog::open(options.log_jsonl.as_ref()).await?;

    tracing::info!(
        %run_id,
        seed = ?options.seed,
        total_lessons = sim.student().total_lessons,
        iter_limit = options.iter_limit,
        "simulation started"
    );

    log.write(&Event::RunStart {
        ts: now_iso(),
        run_id,
        seed: options.seed,
        config: sim.config(),
        student: sim.student(),
        track: sim.track(),
    })
    .await?;

    let mut iterations = 0;
    for iteration in 1..=options.iter_limit {
        if sim.is_done() {
            break;
        }
        iterations = iteration;

        let target = sim.current_lesson().map(|l| l.mastery_target).unwrap_or(1.0);
        let pre = sim.snapshot();
        let actions = sim.generate_actions();
        let context = sim.context();
        let request = PredictRequest {
            theme: sim.theme(),
            related_themes: sim.related_themes().to_vec(),
            lesson_index: context.lesson_index,
            lesson_mastery: context.lesson_mastery,
            total_lessons: context.total_lessons,
            action_index: context.action_index,
            actions,
            target_range: None,
        };

        let chosen = backend.predict(&request).await?.chosen_action;
        let attempt = sim.attempt(&chosen);

        let mut updated_l = None;
        if let Some(success) = attempt.success {
            let record = ObservationRecord::from_prediction(&chosen, success, sim.config().transition);
            let response = backend.observe(&ObserveRequest::from(record)).await?;
            sim.record_mastery(response.updated_l);
            updated_l = Some(response.updated_l);
        }

        let post = sim.snapshot();
        let lesson_done = sim.finish_step();

        if options.verbose {
            println!(
                "{}",
                step_line(iteration, target, &pre, &post, &chosen, &attempt, lesson_done)
            );
        }

        log.write(&Event::Step {
            ts: now_iso(),
            run_id,
            iteration,
            pre,
            chosen_action: &chosen,
            attempted: attempt.attempted,
            success: attempt.success,
            p_success: attempt.p_success,
            minutes_spent: attempt.minutes_spent,
            updated_l,
            post,
            lesson_done,
        })
        .await?;
    }

    let summary = RunSummary {
        run_id,
        iterations,
        done: sim.is_done(),
        lessons_completed: sim.completed_lessons(),
        total_lessons: sim.student().total_lessons,
        lesson_mastery: sim.student().lesson_mastery,
        theme_mastery: sim.student().theme_mastery,
    };

    log.write(&Event::Summary {
        ts: now_iso(),
        run_id,
        iterations,
        done: summary.done,
        lessons_completed: summary.lessons_completed,
        total_lessons: summary.total_lessons,
    })
    .await?;

    tracing::info!(%run_id, iterations, done = summary.done, lessons_completed = summary.lessons_completed, "simulation finished");

    Ok(summary)
}
