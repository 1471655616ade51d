//! AI generation of a whole graph from a prompt
//!
//! This module handles:
//! - The point-charging user state the request is billed against
//! - The single-flight gate (deduct, attempt, refund on failure)
//! - Running the generator on bevy's async compute pool and polling it
//!
//! A failed or invalid generation never touches the working graph.

use bevy::log::{info, warn};
use bevy::prelude::*;
use bevy::tasks::{block_on, futures_lite::future, AsyncComputeTaskPool, Task};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::GenerationError;
use crate::persistence::{graph_from_records, GroupRecord, SceneRecord};
use crate::session::EditorSession;

/// Identity and point balance of the signed-in user
pub trait UserState: Send + Sync {
    fn user_id(&self) -> &str;
    fn display_name(&self) -> &str;
    fn points(&self) -> u32;
    /// Take `amount` points; false when the balance is too low
    fn deduct(&mut self, amount: u32) -> bool;
    fn refund(&mut self, amount: u32);
}

/// In-process user, used by the demo and tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalUser {
    pub id: String,
    pub name: String,
    pub points: u32,
}

impl LocalUser {
    pub fn new(id: impl Into<String>, name: impl Into<String>, points: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            points,
        }
    }
}

impl UserState for LocalUser {
    fn user_id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn points(&self) -> u32 {
        self.points
    }

    fn deduct(&mut self, amount: u32) -> bool {
        match self.points.checked_sub(amount) {
            Some(rest) => {
                self.points = rest;
                true
            }
            None => false,
        }
    }

    fn refund(&mut self, amount: u32) {
        self.points = self.points.saturating_add(amount);
    }
}

/// Raw scenes and groups produced by a generator, positions optional
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GeneratedStory {
    pub title: String,
    pub scenes: Vec<SceneRecord>,
    pub groups: Vec<GroupRecord>,
}

pub type GenerationFuture = Pin<Box<dyn Future<Output = Result<GeneratedStory, String>> + Send>>;

/// Backend that turns a prompt into a story
pub trait GraphGenerator: Send + Sync + 'static {
    fn generate(&self, prompt: &str) -> GenerationFuture;
}

/// Receipt for points charged by [`EditorSession::begin_generation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationTicket {
    pub cost: u32,
}

/// At most one generation request in flight per session
#[derive(Debug, Clone, Default)]
pub struct GenerationGate {
    in_flight: Option<GenerationTicket>,
}

impl GenerationGate {
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }
}

impl EditorSession {
    pub fn is_generating(&self) -> bool {
        self.generation.is_busy()
    }

    /// Charge the user and open the gate. Nothing is charged when the
    /// request is refused.
    pub fn begin_generation(
        &mut self,
        prompt: &str,
        user: &mut dyn UserState,
    ) -> Result<GenerationTicket, GenerationError> {
        if self.generation.is_busy() {
            return Err(GenerationError::AlreadyInFlight);
        }
        if prompt.trim().is_empty() {
            return Err(GenerationError::EmptyPrompt);
        }
        let cost = self.config().generation_cost;
        if user.points() < cost {
            return Err(GenerationError::InsufficientPoints {
                required: cost,
                available: user.points(),
            });
        }
        if !user.deduct(cost) {
            return Err(GenerationError::TransactionFailed);
        }
        let ticket = GenerationTicket { cost };
        self.generation.in_flight = Some(ticket);
        info!("generation started for {} ({cost} points)", user.user_id());
        Ok(ticket)
    }

    /// Close the gate with the generator's outcome.
    ///
    /// A valid story replaces the graph and reseeds history. A backend error
    /// or an invalid story refunds the ticket and keeps the graph.
    pub fn finish_generation(
        &mut self,
        outcome: Result<GeneratedStory, String>,
        user: &mut dyn UserState,
    ) -> Result<(), GenerationError> {
        let Some(ticket) = self.generation.in_flight.take() else {
            return Err(GenerationError::NotInFlight);
        };
        let result = outcome.map_err(GenerationError::Backend).and_then(|story| {
            let graph = graph_from_records(&story.scenes, &story.groups);
            graph.validate()?;
            Ok(graph)
        });
        match result {
            Ok(graph) => {
                self.install(graph);
                self.characters.clear();
                self.assets.clear();
                info!("generation finished");
                Ok(())
            }
            Err(error) => {
                user.refund(ticket.cost);
                warn!("generation failed, refunded {} points: {error}", ticket.cost);
                Err(error)
            }
        }
    }
}

/// Generator used by the bevy host
#[derive(Resource, Clone)]
pub struct GeneratorBackend(pub Arc<dyn GraphGenerator>);

/// User the bevy host bills generation against
#[derive(Resource)]
pub struct ActiveUser(pub Box<dyn UserState>);

/// The generation task currently running, if any
#[derive(Resource, Default)]
pub struct PendingGeneration(Option<Task<Result<GeneratedStory, String>>>);

impl PendingGeneration {
    pub fn is_running(&self) -> bool {
        self.0.is_some()
    }
}

/// Observer event: run a generation for this prompt
#[derive(Event, Debug, Clone)]
pub struct GenerationRequested {
    pub prompt: String,
}

/// Observer that charges the user and spawns the generator task
pub fn start_generation(
    request: On<GenerationRequested>,
    mut session: ResMut<EditorSession>,
    user: Option<ResMut<ActiveUser>>,
    backend: Option<Res<GeneratorBackend>>,
    mut pending: ResMut<PendingGeneration>,
) {
    let (Some(mut user), Some(backend)) = (user, backend) else {
        warn!("generation requested without a signed-in user and generator backend");
        return;
    };
    if let Err(error) = session.begin_generation(&request.prompt, user.0.as_mut()) {
        warn!("generation refused: {error}");
        return;
    }
    let generator = Arc::clone(&backend.0);
    let future = generator.generate(&request.prompt);
    pending.0 = Some(AsyncComputeTaskPool::get().spawn(future));
}

/// Poll the running generation task and hand its result to the session
pub fn poll_generation(
    mut session: ResMut<EditorSession>,
    user: Option<ResMut<ActiveUser>>,
    mut pending: ResMut<PendingGeneration>,
) {
    let (Some(mut user), Some(task)) = (user, pending.0.as_mut()) else {
        return;
    };
    let Some(outcome) = block_on(future::poll_once(task)) else {
        return;
    };
    pending.0 = None;
    if let Err(error) = session.finish_generation(outcome, user.0.as_mut()) {
        warn!("{error}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::model::Choice;

    fn story() -> GeneratedStory {
        GeneratedStory {
            title: "AI".into(),
            scenes: vec![
                SceneRecord {
                    id: "s1".into(),
                    title: "Gate".into(),
                    choices: vec![Choice::new("in", "s2".into())],
                    ..SceneRecord::default()
                },
                SceneRecord {
                    id: "s2".into(),
                    title: "Hall".into(),
                    ..SceneRecord::default()
                },
            ],
            groups: Vec::new(),
        }
    }

    #[test]
    fn success_installs_graph_and_reseeds_history() {
        let mut session = EditorSession::new(EditorConfig::default());
        session.add_scene_at(egui::Pos2::new(500.0, 500.0));
        let mut user = LocalUser::new("u", "U", 120);

        session.begin_generation("haunted lighthouse", &mut user).expect("begin");
        assert_eq!(user.points, 70);
        assert!(session.is_generating());

        session.finish_generation(Ok(story()), &mut user).expect("finish");
        assert_eq!(user.points, 70);
        assert!(!session.is_generating());
        assert_eq!(session.graph().scenes.len(), 2);
        assert_eq!(session.history().len(), 1);
        assert!(!session.can_undo());
    }

    #[test]
    fn second_request_is_refused_while_in_flight() {
        let mut session = EditorSession::default();
        let mut user = LocalUser::new("u", "U", 500);
        session.begin_generation("one", &mut user).expect("first");
        assert_eq!(
            session.begin_generation("two", &mut user),
            Err(GenerationError::AlreadyInFlight)
        );
        assert_eq!(user.points, 450);
    }

    #[test]
    fn failure_refunds_and_keeps_graph() {
        let mut session = EditorSession::default();
        let before = session.graph().clone();
        let mut user = LocalUser::new("u", "U", 50);
        session.begin_generation("x", &mut user).expect("begin");
        assert_eq!(user.points, 0);

        let result = session.finish_generation(Err("timeout".into()), &mut user);
        assert!(matches!(result, Err(GenerationError::Backend(_))));
        assert_eq!(user.points, 50);
        assert_eq!(session.graph(), &before);
    }

    #[test]
    fn invalid_story_is_refunded() {
        let mut session = EditorSession::default();
        let mut user = LocalUser::new("u", "U", 60);
        session.begin_generation("x", &mut user).expect("begin");
        let mut broken = story();
        broken.scenes[1].choices.push(Choice::new("lost", "ghost".into()));
        let result = session.finish_generation(Ok(broken), &mut user);
        assert!(matches!(result, Err(GenerationError::InvalidGraph(_))));
        assert_eq!(user.points, 60);
    }

    #[test]
    fn insufficient_points_charge_nothing() {
        let mut session = EditorSession::default();
        let mut user = LocalUser::new("u", "U", 49);
        assert_eq!(
            session.begin_generation("x", &mut user),
            Err(GenerationError::InsufficientPoints {
                required: 50,
                available: 49
            })
        );
        assert_eq!(user.points, 49);
        assert!(!session.is_generating());
    }
}
