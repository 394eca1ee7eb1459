//! Timed playback of turns on a visual copy of the cube.
//!
//! Turns change the authoritative [`CubeGrid`] immediately. Each turn also
//! sends an [`AnimationJob`] down a channel to a single worker thread, which
//! replays the turns one at a time, in order, by publishing interpolated
//! [`Frame`]s for the renderer to read.

use std::f32::consts::FRAC_PI_2;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{select, unbounded, Receiver, Sender};

use crate::config::CubeConfig;
use crate::grid::{CubeGrid, TurnResult};
use crate::moves::Move;
use crate::pieces::Piece;

/// Row-major 3x3 float matrix.
pub type Matrix3 = [[f32; 3]; 3];

/// One turn waiting to be played.
#[derive(Clone, Debug)]
pub struct AnimationJob {
    /// The canonical move being animated.
    pub turn: Move,
    pub before: CubeGrid,
    pub after: CubeGrid,
    /// Slots of the turning layer.
    pub slots: Vec<usize>,
}

impl AnimationJob {
    pub fn new(result: &TurnResult, after: &CubeGrid) -> AnimationJob {
        AnimationJob {
            turn: result.applied,
            before: result.before.clone(),
            after: after.clone(),
            slots: result.slots.clone(),
        }
    }

    /// Signed quarter turns to sweep: three clockwise quarters are drawn as
    /// one counter-clockwise quarter.
    fn sweep(&self) -> f32 {
        match self.turn.turns() {
            3 => -1.0,
            turns => turns as f32,
        }
    }
}

/// A piece as drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct VisualPiece {
    pub piece: Piece,
    /// Center in slot units, origin at the cube's center.
    pub center: [f32; 3],
    /// Maps the piece's home directions to world directions.
    pub transform: Matrix3,
}

/// Everything the renderer needs for one picture of the cube.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    pub layers: usize,
    pub pieces: Vec<VisualPiece>,
    /// Turns fully played so far.
    pub turns_played: usize,
    /// Whether a turn is mid-flight.
    pub moving: bool,
}

impl Frame {
    /// A frame showing `grid` at rest.
    pub fn still(grid: &CubeGrid) -> Frame {
        Frame::interpolated(grid, &[], None)
    }

    /// A frame of `job` at `progress` in `0.0..=1.0`, drawn from the
    /// pre-turn grid with the turning layer rotated part way.
    pub fn of_job(job: &AnimationJob, progress: f32) -> Frame {
        let axis = job.turn.face().normal();
        let angle = -FRAC_PI_2 * job.sweep() * progress;
        let mut frame = Frame::interpolated(
            &job.before,
            &job.slots,
            Some(axis_rotation((axis.0 as f32, axis.1 as f32, axis.2 as f32), angle)),
        );
        frame.moving = progress < 1.0;
        frame
    }

    fn interpolated(grid: &CubeGrid, moving: &[usize], rotation: Option<Matrix3>) -> Frame {
        let pieces = grid
            .slots()
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| {
                let piece = slot.as_ref()?;
                let (x, y, z) = grid.centered(idx);
                let center = [x as f32 / 2.0, y as f32 / 2.0, z as f32 / 2.0];
                let transform = piece.rotation().to_f32();
                let visual = match rotation {
                    Some(turn) if moving.contains(&idx) => VisualPiece {
                        piece: piece.clone(),
                        center: mul_vector(&turn, center),
                        transform: mul_matrix(&turn, &transform),
                    },
                    _ => VisualPiece {
                        piece: piece.clone(),
                        center,
                        transform,
                    },
                };
                Some(visual)
            })
            .collect();
        Frame {
            layers: grid.layers(),
            pieces,
            turns_played: 0,
            moving: false,
        }
    }
}

/// Rotation by `angle` radians about the unit vector `axis` (Rodrigues).
fn axis_rotation(axis: (f32, f32, f32), angle: f32) -> Matrix3 {
    let (x, y, z) = axis;
    let (sin, cos) = angle.sin_cos();
    let t = 1.0 - cos;
    [
        [cos + x * x * t, x * y * t - z * sin, x * z * t + y * sin],
        [y * x * t + z * sin, cos + y * y * t, y * z * t - x * sin],
        [z * x * t - y * sin, z * y * t + x * sin, cos + z * z * t],
    ]
}

fn mul_matrix(a: &Matrix3, b: &Matrix3) -> Matrix3 {
    let mut out = [[0.0; 3]; 3];
    for (r, row) in out.iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            *cell = (0..3).map(|k| a[r][k] * b[k][c]).sum();
        }
    }
    out
}

fn mul_vector(m: &Matrix3, v: [f32; 3]) -> [f32; 3] {
    [0, 1, 2].map(|r| m[r][0] * v[0] + m[r][1] * v[1] + m[r][2] * v[2])
}

/// Producer side of the queue, handed to whoever applies turns.
#[derive(Clone, Debug)]
pub struct AnimationHandle {
    jobs: Sender<AnimationJob>,
    pending: Arc<AtomicUsize>,
}

impl AnimationHandle {
    /// Queues a job behind every job sent before it.
    pub fn enqueue(&self, job: AnimationJob) {
        self.pending.fetch_add(1, Ordering::SeqCst);
        if self.jobs.send(job).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            log::warn!("animation worker has stopped, dropping turn");
        }
    }
}

/// Owns the animation worker and the frame it publishes.
pub struct AnimationQueue {
    handle: AnimationHandle,
    frame: Arc<RwLock<Frame>>,
    shutdown: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl AnimationQueue {
    /// Starts the worker showing `grid` at rest.
    pub fn spawn(grid: &CubeGrid, config: &CubeConfig) -> AnimationQueue {
        let (jobs_tx, jobs_rx) = unbounded();
        let (shutdown_tx, shutdown_rx) = unbounded();
        let pending = Arc::new(AtomicUsize::new(0));
        let frame = Arc::new(RwLock::new(Frame::still(grid)));
        let (delay, steps) = config.frame_delay();

        let worker = {
            let frame = Arc::clone(&frame);
            let pending = Arc::clone(&pending);
            thread::spawn(move || {
                play_jobs(&jobs_rx, &shutdown_rx, &frame, &pending, delay, steps)
            })
        };

        AnimationQueue {
            handle: AnimationHandle {
                jobs: jobs_tx,
                pending,
            },
            frame,
            shutdown: Some(shutdown_tx),
            worker: Some(worker),
        }
    }

    pub fn handle(&self) -> AnimationHandle {
        self.handle.clone()
    }

    /// A copy of the latest published frame.
    pub fn frame(&self) -> Frame {
        self.frame
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// No job is queued or playing.
    pub fn is_idle(&self) -> bool {
        self.handle.pending.load(Ordering::SeqCst) == 0
    }

    /// Blocks until idle or until `timeout` passes; returns whether idle.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.is_idle() {
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
        true
    }
}

impl Drop for AnimationQueue {
    fn drop(&mut self) {
        // closing the shutdown channel wakes the worker even while other
        // handles keep the job channel open
        self.shutdown.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("animation worker panicked");
            }
        }
    }
}

fn publish(frame: &RwLock<Frame>, next: Frame) {
    *frame.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = next;
}

fn play_jobs(
    jobs: &Receiver<AnimationJob>,
    shutdown: &Receiver<()>,
    frame: &RwLock<Frame>,
    pending: &AtomicUsize,
    delay: Duration,
    steps: u32,
) {
    let mut played = 0;
    loop {
        let next = select! {
            recv(jobs) -> job => job.ok(),
            recv(shutdown) -> _ => None,
        };
        let Some(job) = next else {
            break;
        };

        log::trace!("animating {}", job.turn);
        for step in 1..steps {
            let mut next = Frame::of_job(&job, step as f32 / steps as f32);
            next.turns_played = played;
            publish(frame, next);
            thread::sleep(delay);
        }
        played += 1;
        let mut rest = Frame::still(&job.after);
        rest.turns_played = played;
        publish(frame, rest);
        thread::sleep(delay);
        pending.fetch_sub(1, Ordering::SeqCst);
    }
    log::debug!("animation worker stopped after {played} turns");
}
