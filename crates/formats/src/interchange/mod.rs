//! WfFormat interchange format.
//!
//! | IR Field | WfFormat JSON |
//! |----------|---------------|
//! | `task.name` | `specification.tasks[].name` and `id` |
//! | `task.executable` | `category`, `execution.tasks[].command.program` |
//! | `task.arguments` | `execution.tasks[].command.arguments` |
//! | DAG parents / children | `parents` / `children` |
//! | `file.size_bytes` | `specification.files[].sizeInBytes` (required) |
//! | producer / consumers | `files[].producers` / `consumers` |
//! | execution metadata | `execution.makespanInSeconds`, `runtimeInSeconds` |

pub mod emitter;
pub mod schema;

pub use emitter::{InterchangeEmitter, read};
pub use schema::{InterchangeDocument, SCHEMA_VERSION};
