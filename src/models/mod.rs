pub mod poll_state;
pub mod product;
pub mod status;

pub use poll_state::PollState;
pub use product::{Product, MISSING_URL};
pub use status::{RunState, StatusReport};
