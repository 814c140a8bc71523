//! The game worker task.
//!
//! The coordinator is not shared: it lives on a single task that serializes
//! all game mutation, and the UI talks to it over channels. One turn is in
//! flight at a time; a Cancel received mid-turn drops the in-flight request
//! and re-arms the player's turn. Scene images are generated off to the side
//! and tagged with an epoch so that art requested before a restart or a
//! load is discarded instead of drawn over the new game.

use std::path::PathBuf;
use std::sync::Arc;

use dread_core::coordinator::{TurnCoordinator, TurnError, TurnReport};
use dread_core::engine::{CompanionMind, Narrator, SceneArtist};
use dread_core::persist::{load_game, save_game, CachedImage, SavedGame};
use dread_core::GameState;
use tokio::sync::mpsc;

#[derive(Debug)]
pub enum WorkerRequest {
    Restart,
    SubmitChoice(String),
    RequestHint,
    /// Save the current game, bundling the UI's cached scene image.
    Save(PathBuf, Option<CachedImage>),
    Load(PathBuf),
    Cancel,
}

#[derive(Debug)]
pub enum WorkerResponse {
    /// The authoritative state after any mutation.
    StateChanged(GameState),
    TurnResolved(TurnReport),
    SceneImage(CachedImage),
    Saved(PathBuf),
    Loaded(PathBuf),
    Error(String),
}

enum Flight {
    Done(Result<TurnReport, TurnError>),
    Cancelled,
    Disconnected,
}

type ImageResult = (u64, CachedImage);

pub struct Worker<C, N> {
    coordinator: TurnCoordinator<C, N>,
    artist: Option<Arc<dyn SceneArtist>>,
    request_rx: mpsc::Receiver<WorkerRequest>,
    response_tx: mpsc::Sender<WorkerResponse>,
    /// Bumped on restart and load; image results carrying an old value
    /// are dropped.
    epoch: u64,
}

impl<C: CompanionMind, N: Narrator> Worker<C, N> {
    pub fn new(
        coordinator: TurnCoordinator<C, N>,
        artist: Option<Arc<dyn SceneArtist>>,
        request_rx: mpsc::Receiver<WorkerRequest>,
        response_tx: mpsc::Sender<WorkerResponse>,
    ) -> Self {
        Self {
            coordinator,
            artist,
            request_rx,
            response_tx,
            epoch: 0,
        }
    }

    /// Run until the request channel closes.
    pub async fn run(mut self) {
        let (image_tx, mut image_rx) = mpsc::channel::<ImageResult>(4);

        loop {
            tokio::select! {
                request = self.request_rx.recv() => {
                    let Some(request) = request else { break };
                    match request {
                        WorkerRequest::Restart => self.handle_restart(&image_tx).await,
                        WorkerRequest::SubmitChoice(choice) => {
                            self.handle_turn(choice, &image_tx).await
                        }
                        WorkerRequest::RequestHint => self.handle_hint().await,
                        WorkerRequest::Save(path, image) => self.handle_save(path, image).await,
                        WorkerRequest::Load(path) => self.handle_load(path).await,
                        // Nothing in flight; stale cancel from the UI.
                        WorkerRequest::Cancel => {}
                    }
                }
                result = image_rx.recv() => {
                    if let Some((epoch, image)) = result {
                        if epoch == self.epoch {
                            self.send(WorkerResponse::SceneImage(image)).await;
                        }
                    }
                }
            }
        }
    }

    async fn handle_restart(&mut self, image_tx: &mpsc::Sender<ImageResult>) {
        self.epoch += 1;
        if let Err(e) = self.coordinator.restart().await {
            self.send(WorkerResponse::Error(format!("restart failed: {e}")))
                .await;
        }
        self.publish_state().await;
        self.request_scene_image(image_tx);
    }

    async fn handle_turn(&mut self, choice: String, image_tx: &mpsc::Sender<ImageResult>) {
        let flight = {
            let turn = self.coordinator.submit_player_choice(&choice);
            tokio::pin!(turn);
            loop {
                tokio::select! {
                    result = &mut turn => break Flight::Done(result),
                    request = self.request_rx.recv() => match request {
                        Some(WorkerRequest::Cancel) => break Flight::Cancelled,
                        None => break Flight::Disconnected,
                        Some(_) => {
                            let _ = self
                                .response_tx
                                .send(WorkerResponse::Error(
                                    "a turn is already being resolved".to_string(),
                                ))
                                .await;
                        }
                    },
                }
            }
        };

        match flight {
            Flight::Done(Ok(report)) => {
                self.send(WorkerResponse::TurnResolved(report)).await;
                self.publish_state().await;
                self.request_scene_image(image_tx);
            }
            Flight::Done(Err(e)) => {
                self.send(WorkerResponse::Error(e.to_string())).await;
                self.publish_state().await;
            }
            Flight::Cancelled => {
                if let Err(e) = self.coordinator.abort_turn("cancelled by player") {
                    self.send(WorkerResponse::Error(e.to_string())).await;
                }
                self.publish_state().await;
            }
            Flight::Disconnected => {}
        }
    }

    async fn handle_hint(&mut self) {
        if let Err(e) = self.coordinator.request_hint() {
            self.send(WorkerResponse::Error(e.to_string())).await;
        }
        self.publish_state().await;
    }

    async fn handle_save(&mut self, path: PathBuf, image: Option<CachedImage>) {
        let saved = SavedGame::new(self.coordinator.state().clone(), image);
        match save_game(&path, &saved).await {
            Ok(()) => self.send(WorkerResponse::Saved(path)).await,
            Err(e) => {
                self.send(WorkerResponse::Error(format!("save failed: {e}")))
                    .await
            }
        }
    }

    async fn handle_load(&mut self, path: PathBuf) {
        let saved = match load_game(&path).await {
            Ok(saved) => saved,
            Err(e) => {
                self.send(WorkerResponse::Error(format!("load failed: {e}")))
                    .await;
                return;
            }
        };

        if let Err(e) = self.coordinator.load_state(saved.state) {
            self.send(WorkerResponse::Error(format!("load failed: {e}")))
                .await;
            return;
        }

        self.epoch += 1;
        self.send(WorkerResponse::Loaded(path)).await;
        self.publish_state().await;
        if let Some(image) = saved.scene_image {
            self.send(WorkerResponse::SceneImage(image)).await;
        }
    }

    async fn publish_state(&mut self) {
        let state = self.coordinator.state().clone();
        self.send(WorkerResponse::StateChanged(state)).await;
    }

    /// Fire off a background illustration of the current scene. Best
    /// effort; failures are silent and the game plays on without art.
    fn request_scene_image(&self, image_tx: &mpsc::Sender<ImageResult>) {
        let Some(ref artist) = self.artist else {
            return;
        };
        let state = self.coordinator.state();
        if state.scene_description.is_empty() {
            return;
        }

        let artist = Arc::clone(artist);
        let scene = state.scene_description.clone();
        let turn = state.turn_count;
        let epoch = self.epoch;
        let tx = image_tx.clone();
        tokio::spawn(async move {
            if let Ok(image) = artist.illustrate(&scene, turn).await {
                let _ = tx
                    .send((
                        epoch,
                        CachedImage {
                            mime_type: image.mime_type,
                            data: image.data,
                        },
                    ))
                    .await;
            }
        });
    }

    async fn send(&mut self, response: WorkerResponse) {
        let _ = self.response_tx.send(response).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dread_core::choices::ChoicePool;
    use dread_core::testing::{decision, quiet_outcome, ScriptedCompanion, ScriptedNarrator};

    fn spawn_worker() -> (
        mpsc::Sender<WorkerRequest>,
        mpsc::Receiver<WorkerResponse>,
        Arc<ScriptedCompanion>,
        Arc<ScriptedNarrator>,
    ) {
        let companion = Arc::new(ScriptedCompanion::new());
        let narrator = Arc::new(ScriptedNarrator::new());
        let coordinator = TurnCoordinator::with_pool(
            Arc::clone(&companion),
            Arc::clone(&narrator),
            ChoicePool::new().with_seed(11),
        );

        let (request_tx, request_rx) = mpsc::channel(8);
        let (response_tx, response_rx) = mpsc::channel(32);
        tokio::spawn(Worker::new(coordinator, None, request_rx, response_tx).run());
        (request_tx, response_rx, companion, narrator)
    }

    async fn next_state(rx: &mut mpsc::Receiver<WorkerResponse>) -> GameState {
        loop {
            match rx.recv().await {
                Some(WorkerResponse::StateChanged(state)) => return state,
                Some(_) => continue,
                None => panic!("worker hung up"),
            }
        }
    }

    #[tokio::test]
    async fn test_worker_restart_publishes_a_playable_state() {
        let (tx, mut rx, _companion, narrator) = spawn_worker();
        narrator.push(quiet_outcome("It begins."));

        tx.send(WorkerRequest::Restart).await.unwrap();
        let state = next_state(&mut rx).await;

        assert_eq!(state.turn_count, 1);
        assert!(state.is_player_turn);
        assert_eq!(state.available_choices.len(), 3);
    }

    #[tokio::test]
    async fn test_worker_resolves_a_turn() {
        let (tx, mut rx, companion, narrator) = spawn_worker();
        narrator.push(quiet_outcome("It begins."));
        tx.send(WorkerRequest::Restart).await.unwrap();
        let state = next_state(&mut rx).await;

        let choice = state.available_choices[0].clone();
        companion.push(decision(&choice));
        narrator.push(quiet_outcome("The floor gives out."));
        tx.send(WorkerRequest::SubmitChoice(choice)).await.unwrap();

        match rx.recv().await {
            Some(WorkerResponse::TurnResolved(report)) => {
                assert_eq!(report.turn_count, 2);
                assert_eq!(report.narration, "The floor gives out.");
            }
            other => panic!("expected a resolved turn, got {other:?}"),
        }
        let state = next_state(&mut rx).await;
        assert_eq!(state.turn_count, 2);
    }

    #[tokio::test]
    async fn test_worker_reports_engine_failure_and_stays_alive() {
        let (tx, mut rx, _companion, narrator) = spawn_worker();
        narrator.push(quiet_outcome("It begins."));
        tx.send(WorkerRequest::Restart).await.unwrap();
        let state = next_state(&mut rx).await;

        // No companion scripted, so the turn fails.
        let choice = state.available_choices[0].clone();
        tx.send(WorkerRequest::SubmitChoice(choice)).await.unwrap();

        match rx.recv().await {
            Some(WorkerResponse::Error(_)) => {}
            other => panic!("expected an error, got {other:?}"),
        }
        let state = next_state(&mut rx).await;
        assert!(state.is_player_turn);
        assert!(state.last_error.is_some());
    }
}
