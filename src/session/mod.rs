mod machine;
mod state;

pub use machine::SessionStateMachine;
pub use state::SessionState;
