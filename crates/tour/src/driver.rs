//! Real-time playback on tokio.
//!
//! A [`TourDriver`] task owns one [`TourPlayer`], sleeps until the player's
//! next deadline and applies commands sent through a [`TourHandle`]. The
//! player itself stays synchronous; this is only the clock and the mailbox.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::debug;

use foundation::time::Time;

use crate::error::TourError;
use crate::player::{TourPlayer, TourState};
use crate::speed::Speed;
use crate::waypoint::Waypoint;

enum Command {
    Start {
        waypoints: Vec<Waypoint>,
        speed: Speed,
        reply: oneshot::Sender<Result<(), TourError>>,
    },
    Pause(oneshot::Sender<bool>),
    Resume(oneshot::Sender<bool>),
    Stop(oneshot::Sender<bool>),
    SetSpeed(Speed),
    State(oneshot::Sender<TourState>),
    Shutdown,
}

/// Cloneable control surface for a running [`TourDriver`].
///
/// Once the driver has exited, `start` reports [`TourError::NotReady`] and
/// the other controls report `false` / `None`.
#[derive(Debug, Clone)]
pub struct TourHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl TourHandle {
    pub async fn start(&self, waypoints: Vec<Waypoint>, speed: Speed) -> Result<(), TourError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Start {
                waypoints,
                speed,
                reply,
            })
            .map_err(|_| TourError::NotReady)?;
        rx.await.unwrap_or(Err(TourError::NotReady))
    }

    pub async fn pause(&self) -> bool {
        self.request(Command::Pause).await.unwrap_or(false)
    }

    pub async fn resume(&self) -> bool {
        self.request(Command::Resume).await.unwrap_or(false)
    }

    pub async fn stop(&self) -> bool {
        self.request(Command::Stop).await.unwrap_or(false)
    }

    pub fn set_speed(&self, speed: Speed) {
        let _ = self.tx.send(Command::SetSpeed(speed));
    }

    pub async fn state(&self) -> Option<TourState> {
        self.request(Command::State).await
    }

    /// Stops any tour and ends the driver task.
    pub fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown);
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Option<T> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(make(reply)).ok()?;
        rx.await.ok()
    }
}

pub struct TourDriver {
    player: TourPlayer,
    origin: Instant,
    rx: mpsc::UnboundedReceiver<Command>,
}

impl TourDriver {
    /// Spawns the driver on the current runtime.
    ///
    /// The task ends when every handle is dropped or [`TourHandle::shutdown`]
    /// is called, stopping any tour first; it yields the player back.
    pub fn spawn(player: TourPlayer) -> (TourHandle, JoinHandle<TourPlayer>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let driver = TourDriver {
            player,
            origin: Instant::now(),
            rx,
        };
        (TourHandle { tx }, tokio::spawn(driver.run()))
    }

    fn now(&self) -> Time {
        Time::from_duration(self.origin.elapsed())
    }

    async fn run(mut self) -> TourPlayer {
        loop {
            let deadline = self
                .player
                .next_deadline()
                .map(|t| self.origin + t.as_duration());

            // Commands win ties so a pause sent at a deadline holds the step.
            let wake = tokio::select! {
                biased;
                cmd = self.rx.recv() => Wake::Command(cmd),
                _ = wait_until(deadline) => Wake::Deadline,
            };

            match wake {
                Wake::Command(Some(Command::Shutdown)) | Wake::Command(None) => break,
                Wake::Command(Some(cmd)) => self.apply(cmd),
                Wake::Deadline => {
                    let now = self.now();
                    self.player.tick(now);
                }
            }
        }
        debug!("tour driver exiting");
        self.player.stop();
        self.player
    }

    fn apply(&mut self, cmd: Command) {
        let now = self.now();
        match cmd {
            Command::Start {
                waypoints,
                speed,
                reply,
            } => {
                let _ = reply.send(self.player.start(waypoints, speed, now));
            }
            Command::Pause(reply) => {
                let _ = reply.send(self.player.pause());
            }
            Command::Resume(reply) => {
                let _ = reply.send(self.player.resume(now));
            }
            Command::Stop(reply) => {
                let _ = reply.send(self.player.stop());
            }
            Command::SetSpeed(speed) => self.player.set_speed(speed),
            Command::State(reply) => {
                let _ = reply.send(self.player.state());
            }
            Command::Shutdown => {}
        }
    }
}

enum Wake {
    Command(Option<Command>),
    Deadline,
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}
