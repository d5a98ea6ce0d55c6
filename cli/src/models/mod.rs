//! Wire models for the orchestration host

pub mod job;
