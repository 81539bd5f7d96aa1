// src/types/mod.rs
pub mod envelope;
pub mod pitch;
pub mod records;

pub use envelope::{Ack, ApiEnvelope};
pub use pitch::{ElevatorPitch, PitchPhase, Subject, SubjectKind};
