//! The dakline pipeline: turn a free-form task command (typed, spoken,
//! or attached as a file) into structured task records, answer questions
//! about existing records, and resolve edit/delete replies against
//! previously created records.
//!
//! Transport, model, file storage, and the REST backend are all held
//! behind interfaces; everything here is one sequential chain per
//! inbound message with no shared state between messages.

pub mod cli;
pub mod repl;
pub mod runtime;
pub mod state;
pub mod storage;
pub mod transport;
