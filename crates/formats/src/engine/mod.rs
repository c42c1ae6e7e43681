//! Engine job graph format.
//!
//! | IR Field | Engine JSON |
//! |----------|-------------|
//! | `task.name` | `processes[].name` |
//! | `task.executable` | `processes[].config.executor.executable` |
//! | `task.arguments` | `processes[].config.executor.args` |
//! | `task.inputs` / `task.outputs` | `processes[].ins` / `outs` (signal indices) |
//! | DAG parents | `processes[].after` |
//! | `file` | `signals[]` |
//! | entry files | `signals[].data = [{}]` |

pub mod emitter;
pub mod schema;

pub use emitter::{EngineEmitter, read};
pub use schema::{EngineDocument, Executor, Process, ProcessConfig, Signal};
