use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::scene::{self, Frame};
use super::viewport::{InputEvent, Interaction};
use super::ViewModel;
use crate::error::GraphError;

/// Pointer events buffered between the host and a running loop.
const POINTER_BUFFER: usize = 64;

/// Called with the canonical path of a clicked node.
pub type OnSelect = Box<dyn FnMut(&str) + Send>;

/// Where frames go.
pub trait Surface: Send + 'static {
    /// Current drawable size in CSS pixels, or `None` while detached.
    fn size(&self) -> Option<(f64, f64)>;

    /// The host reported a new size.
    fn resize(&mut self, _width: f64, _height: f64) {}

    /// Hand over a finished frame. Returning `false` means the surface is gone for good
    /// and the loop should end.
    fn present(&mut self, frame: Frame) -> bool;
}

/// A fixed-size surface that forwards frames over a bounded channel. Frames are
/// dropped while the receiver is behind; once the receiver is gone the loop ends.
pub struct ChannelSurface {
    width: f64,
    height: f64,
    tx: mpsc::Sender<Frame>,
}

impl ChannelSurface {
    pub fn new(width: f64, height: f64, capacity: usize) -> (Self, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { width, height, tx }, rx)
    }
}

impl Surface for ChannelSurface {
    fn size(&self) -> Option<(f64, f64)> {
        Some((self.width, self.height))
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    fn present(&mut self, frame: Frame) -> bool {
        match self.tx.try_send(frame) {
            Ok(()) | Err(mpsc::error::TrySendError::Full(_)) => true,
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }
}

/// Animation and interaction state of one view, advanced one frame at a time.
pub struct FrameDriver {
    view: ViewModel,
    interaction: Interaction,
    time: f64,
    index: u64,
}

impl FrameDriver {
    pub fn new(view: ViewModel, width: f64, height: f64) -> Self {
        Self {
            view,
            interaction: Interaction::new(width, height),
            time: 0.0,
            index: 0,
        }
    }

    pub fn view(&self) -> &ViewModel {
        &self.view
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Apply one input event; returns a selected path on a clean click.
    pub fn handle(&mut self, event: InputEvent) -> Option<String> {
        self.interaction.handle(event, self.view.graph())
    }

    /// Advance time and draw. An unavailable or zero-sized surface skips the frame
    /// without advancing time.
    pub fn tick(&mut self, size: Option<(f64, f64)>) -> Option<Frame> {
        let (width, height) = size?;
        let viewport = &mut self.interaction.viewport;
        viewport.width = width;
        viewport.height = height;
        if !viewport.is_drawable() {
            return None;
        }

        self.time += scene::time_step(&self.view);
        let commands = scene::draw(&self.view, viewport, self.time);
        let frame = Frame {
            index: self.index,
            time: self.time,
            width,
            height,
            commands,
        };
        self.index += 1;
        Some(frame)
    }
}

/// What a stopped loop hands back so it can be restarted.
pub struct Stopped<S> {
    pub surface: S,
    pub on_select: OnSelect,
    pub frames: u64,
}

/// Spawns render loops.
pub struct RenderLoop;

impl RenderLoop {
    /// Spawn a loop drawing `view` onto `surface` at `fps` until stopped, dropped, or
    /// the surface goes away. Must be called inside a tokio runtime.
    pub fn start<S: Surface>(
        surface: S,
        view: ViewModel,
        fps: u32,
        on_select: OnSelect,
    ) -> RenderHandle<S> {
        let (pointer_tx, pointer_rx) = mpsc::channel(POINTER_BUFFER);
        let (stop_tx, stop_rx) = oneshot::channel();
        let period = Duration::from_secs_f64(1.0 / f64::from(fps.max(1)));
        let task = tokio::spawn(run(surface, view, period, on_select, pointer_rx, stop_rx));
        RenderHandle {
            pointer_tx,
            stop_tx: Some(stop_tx),
            task: Some(task),
        }
    }
}

async fn run<S: Surface>(
    mut surface: S,
    view: ViewModel,
    period: Duration,
    mut on_select: OnSelect,
    mut pointer_rx: mpsc::Receiver<InputEvent>,
    mut stop_rx: oneshot::Receiver<()>,
) -> Stopped<S> {
    let (width, height) = surface.size().unwrap_or((0.0, 0.0));
    let mut driver = FrameDriver::new(view, width, height);
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::debug!(mode = ?driver.view().mode(), "render loop started");
    loop {
        tokio::select! {
            biased;
            // Input queued before a stop is still applied.
            Some(event) = pointer_rx.recv() => {
                if let InputEvent::Resize { width, height } = event {
                    surface.resize(width, height);
                }
                if let Some(path) = driver.handle(event) {
                    on_select(&path);
                }
            }
            // Also fires when the handle is dropped without an explicit stop.
            _ = &mut stop_rx => break,
            _ = ticker.tick() => {
                let Some(frame) = driver.tick(surface.size()) else {
                    continue;
                };
                if !surface.present(frame) {
                    tracing::debug!("surface closed");
                    break;
                }
            }
        }
    }
    tracing::debug!(time = driver.time(), "render loop stopped");
    Stopped {
        surface,
        on_select,
        frames: driver.index,
    }
}

/// A running loop. Dropping the handle cancels it.
pub struct RenderHandle<S> {
    pointer_tx: mpsc::Sender<InputEvent>,
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<Stopped<S>>>,
}

impl<S: Surface> RenderHandle<S> {
    /// A sender for host input. It stops accepting events once this loop ends.
    pub fn events(&self) -> mpsc::Sender<InputEvent> {
        self.pointer_tx.clone()
    }

    /// Stop the loop and take back its surface and callback.
    pub async fn stop(mut self) -> Result<Stopped<S>, GraphError> {
        if let Some(tx) = self.stop_tx.take() {
            // The loop may already have ended on its own.
            let _ = tx.send(());
        }
        let task = self.task.take().ok_or(GraphError::RenderLoopLost)?;
        task.await.map_err(|_| GraphError::RenderLoopLost)
    }
}

impl<S> Drop for RenderHandle<S> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Keeps exactly one loop running for a surface and swaps its view on demand.
pub struct Renderer<S: Surface> {
    handle: Option<RenderHandle<S>>,
    fps: u32,
}

impl<S: Surface> Renderer<S> {
    pub fn start(surface: S, view: ViewModel, fps: u32, on_select: OnSelect) -> Self {
        Self {
            handle: Some(RenderLoop::start(surface, view, fps, on_select)),
            fps,
        }
    }

    /// Sender for the currently running loop.
    pub fn events(&self) -> Option<mpsc::Sender<InputEvent>> {
        self.handle.as_ref().map(RenderHandle::events)
    }

    /// Cancel the running loop and start a fresh one on the same surface with a new
    /// view. Pan, zoom and animation time start over; senders from
    /// [`Renderer::events`] taken before the restart are closed.
    pub async fn restart(&mut self, view: ViewModel) -> Result<(), GraphError> {
        let handle = self.handle.take().ok_or(GraphError::RenderLoopLost)?;
        let stopped = handle.stop().await?;
        tracing::debug!(frames = stopped.frames, "restarting render loop");
        self.handle = Some(RenderLoop::start(
            stopped.surface,
            view,
            self.fps,
            stopped.on_select,
        ));
        Ok(())
    }

    /// Stop for good, returning the surface.
    pub async fn shutdown(mut self) -> Result<Stopped<S>, GraphError> {
        let handle = self.handle.take().ok_or(GraphError::RenderLoopLost)?;
        handle.stop().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::tree::demo::demo_project;
    use crate::view::{ViewRequest, build_view};

    fn global() -> ViewModel {
        build_view(&ViewRequest::Global, &demo_project())
    }

    #[test]
    fn test_tick_skips_unavailable_surface() {
        let mut driver = FrameDriver::new(global(), 800.0, 600.0);
        assert!(driver.tick(None).is_none());
        assert!(driver.tick(Some((0.0, 600.0))).is_none());
        assert_eq!(driver.time(), 0.0);

        let frame = driver.tick(Some((800.0, 600.0))).unwrap();
        assert_eq!(frame.index, 0);
        assert!((frame.time - 0.005).abs() < 1e-12);
        let frame = driver.tick(Some((800.0, 600.0))).unwrap();
        assert_eq!(frame.index, 1);
    }

    #[test]
    fn test_driver_selects_on_click() {
        let mut driver = FrameDriver::new(global(), 1000.0, 1000.0);
        let node = driver.view().graph().unwrap().node("src/main.tsx").unwrap().clone();
        let (x, y) = (node.x * 1000.0, node.y * 1000.0);
        driver.handle(InputEvent::PointerDown { x, y });
        driver.handle(InputEvent::PointerUp);
        assert_eq!(
            driver.handle(InputEvent::Click { x, y }).as_deref(),
            Some("src/main.tsx")
        );
    }

    #[test]
    fn test_empty_view_never_selects() {
        let mut driver = FrameDriver::new(ViewModel::Empty, 800.0, 600.0);
        assert_eq!(driver.handle(InputEvent::Click { x: 400.0, y: 300.0 }), None);
        let frame = driver.tick(Some((800.0, 600.0))).unwrap();
        assert_eq!(frame.commands.len(), 2);
    }

    #[tokio::test]
    async fn test_loop_produces_frames_and_reports_selection() {
        let (surface, mut frames) = ChannelSurface::new(1000.0, 1000.0, 8);
        let selected = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&selected);
        let handle = RenderLoop::start(
            surface,
            global(),
            500,
            Box::new(move |p| sink.lock().unwrap().push(p.to_owned())),
        );

        let first = frames.recv().await.unwrap();
        assert_eq!(first.width, 1000.0);

        let node = global().graph().unwrap().node("src/App.tsx").unwrap().clone();
        let (x, y) = (node.x * 1000.0, node.y * 1000.0);
        let events = handle.events();
        events.send(InputEvent::PointerDown { x, y }).await.unwrap();
        events.send(InputEvent::PointerUp).await.unwrap();
        events.send(InputEvent::Click { x, y }).await.unwrap();

        let stopped = handle.stop().await.unwrap();
        assert!(stopped.frames >= 1);
        assert_eq!(*selected.lock().unwrap(), vec!["src/App.tsx".to_owned()]);
        assert!(events.is_closed(), "pointer listener is gone after stop");
    }

    #[tokio::test]
    async fn test_restart_swaps_view_and_closes_old_listener() {
        let (surface, mut frames) = ChannelSurface::new(800.0, 600.0, 1);
        let mut renderer = Renderer::start(surface, global(), 500, Box::new(|_| {}));
        let old = renderer.events().unwrap();

        renderer.restart(ViewModel::Empty).await.unwrap();
        assert!(old.is_closed());
        assert!(!renderer.events().unwrap().is_closed());

        // Drain anything the first loop queued, then expect an empty-state frame.
        let frame = loop {
            let f = frames.recv().await.unwrap();
            if f.commands.len() == 2 {
                break f;
            }
        };
        assert!(frame.time > 0.0);
        renderer.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_dropping_handle_cancels_loop() {
        let (surface, mut frames) = ChannelSurface::new(800.0, 600.0, 4);
        let handle = RenderLoop::start(surface, ViewModel::Empty, 500, Box::new(|_| {}));
        let events = handle.events();
        frames.recv().await.unwrap();
        drop(handle);
        // The surface's sender goes away with the aborted task.
        while frames.recv().await.is_some() {}
        assert!(events.is_closed());
    }

    #[tokio::test]
    async fn test_loop_ends_when_receiver_is_dropped() {
        let (surface, frames) = ChannelSurface::new(800.0, 600.0, 4);
        drop(frames);
        let handle = RenderLoop::start(surface, ViewModel::Empty, 500, Box::new(|_| {}));
        let events = handle.events();
        // The loop drops its pointer receiver on exit, without anyone calling stop.
        events.closed().await;
        let stopped = handle.stop().await.unwrap();
        assert_eq!(stopped.frames, 1);
    }
}
