pub mod engine;
pub mod runtime;

pub use engine::{Command, EngineConfig, PrompterHandle, spawn};
pub use runtime::PrompterRuntime;
