//! Braintrace engine: backend collaborator and effect execution.
mod backend;
mod engine;
mod persist;
mod types;
mod wire;

pub use backend::{Backend, BackendSettings, ReqwestBackend};
pub use engine::{EngineEvent, EngineHandle, Reply, Request, Ticket};
pub use persist::{load_if_present, save_atomically, PersistError};
pub use types::{BackendError, FailureKind};
