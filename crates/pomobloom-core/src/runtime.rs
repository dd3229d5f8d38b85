//! Cooperative session loop.
//!
//! The driver is the only mutator of the session. Commands from the front
//! end and ticks from the clock are serialized through one `select!`, and
//! the frame is re-rendered after every applied transition.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::effects::{AudioSink, EffectsDispatcher, NotificationSink};
use crate::events::Event;
use crate::timer::{Mode, SessionEngine, SessionState, Tick, TokioClock};
use crate::view::{render, ViewOptions};
use crate::window::WindowShell;

/// User intents accepted by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start when idle, pause when running.
    Toggle,
    Start,
    Pause,
    Reset,
    ChangeMode(Mode),
    ToggleAlwaysOnTop,
    Minimize,
    ToggleCompact,
    Quit,
}

pub struct SessionDriver<N: NotificationSink, A: AudioSink, W: WindowShell> {
    engine: SessionEngine<TokioClock>,
    ticks: mpsc::UnboundedReceiver<Tick>,
    dispatcher: EffectsDispatcher<N, A>,
    shell: W,
    view: ViewOptions,
}

impl<N: NotificationSink, A: AudioSink, W: WindowShell> SessionDriver<N, A, W> {
    pub fn new(dispatcher: EffectsDispatcher<N, A>, shell: W, view: ViewOptions) -> Self {
        Self::with_period(TokioClock::DEFAULT_PERIOD, dispatcher, shell, view)
    }

    pub fn with_period(
        period: Duration,
        dispatcher: EffectsDispatcher<N, A>,
        shell: W,
        view: ViewOptions,
    ) -> Self {
        let (clock, ticks) = TokioClock::new(period);
        Self {
            engine: SessionEngine::new(clock),
            ticks,
            dispatcher,
            shell,
            view,
        }
    }

    pub fn state(&self) -> &SessionState {
        self.engine.state()
    }

    pub fn view(&self) -> ViewOptions {
        self.view
    }

    pub fn dispatcher(&self) -> &EffectsDispatcher<N, A> {
        &self.dispatcher
    }

    pub fn frame(&self) -> String {
        render(self.engine.state(), &self.view)
    }

    /// Apply one command. Window and view commands produce no event.
    pub fn apply(&mut self, command: Command) -> Option<Event> {
        match command {
            Command::Toggle => self.engine.toggle(),
            Command::Start => self.engine.start(),
            Command::Pause => self.engine.pause(),
            Command::Reset => Some(self.engine.reset()),
            Command::ChangeMode(mode) => Some(self.engine.change_mode(mode)),
            Command::ToggleAlwaysOnTop => {
                self.view.always_on_top = !self.view.always_on_top;
                self.shell.set_always_on_top(self.view.always_on_top);
                None
            }
            Command::Minimize => {
                self.shell.minimize();
                None
            }
            Command::ToggleCompact => {
                self.view.compact = !self.view.compact;
                None
            }
            Command::Quit => None,
        }
    }

    fn handle(&self, event: &Event) {
        if !matches!(event, Event::Ticked { .. }) {
            debug!(event = event.kind(), "session event");
        }
        if let Ok(json) = serde_json::to_string(event) {
            trace!(%json, "session event");
        }
        self.dispatcher.dispatch(event);
    }

    /// Run until `Quit` arrives or the command channel closes. Returns the
    /// final session snapshot.
    pub async fn run<F>(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut on_frame: F,
    ) -> SessionState
    where
        F: FnMut(&str),
    {
        if self.view.always_on_top {
            self.shell.set_always_on_top(true);
        }
        on_frame(&self.frame());

        loop {
            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else { break };
                    if command == Command::Quit {
                        break;
                    }
                    if let Some(event) = self.apply(command) {
                        self.handle(&event);
                    }
                }
                Some(tick) = self.ticks.recv() => {
                    match self.engine.tick(tick) {
                        Some(event) => self.handle(&event),
                        // Stale tick from a cancelled subscription.
                        None => continue,
                    }
                }
            }
            on_frame(&self.frame());
        }

        debug!("session loop finished");
        self.engine.snapshot()
    }
}
