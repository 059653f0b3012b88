// Assessment flow: profiling → package selection → testing → evaluation → completed.
// Session state lives behind `SessionStore`; each transition is mirrored to Postgres.

pub mod evaluation;
pub mod handlers;
pub mod persistence;
pub mod phase;
pub mod profiling;
pub mod prompts;
pub mod scoring;
pub mod session;
pub mod store;
pub mod validation;
