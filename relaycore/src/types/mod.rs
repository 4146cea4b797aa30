pub mod call;
pub mod participant;

pub use call::{CallOutcome, CallParticipant, CallStatus};
pub use participant::ParticipantProfile;
