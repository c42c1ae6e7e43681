//! Legacy YAML format.
//!
//! | IR Field | Legacy YAML |
//! |----------|-------------|
//! | `task.name` | `tasks[].name` |
//! | `task.executable` | `tasks[].executable` |
//! | `task.arguments` | `tasks[].arguments` |
//! | `file.source_url` | `files.<name>.source` |
//! | entry files with a source | `inputs` |
//! | terminal produced files | `outputs` |

pub mod emitter;
pub mod schema;

pub use emitter::{LegacyEmitter, read};
pub use schema::{LegacyDocument, LegacyFile, LegacyTask};
