pub mod machine;
pub mod state;

pub use machine::{step, Effect, Event, Transition, TransitionError};
pub use state::{EditDraft, FetchKind, InFlight, LostRecord, Mode, SessionState, Step, Ticket};
