mod clock;
mod mode;
mod session;

pub use clock::{ClockSource, ManualClock, ManualSubscription, Tick, TokioClock};
pub use mode::Mode;
pub use session::{SessionEngine, SessionState};
