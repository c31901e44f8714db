//! Index query backend
//!
//! The only I/O boundary of the engine. Reads the extracted index artifact
//! (`PROJECT_INDEX.json`), evaluates named query expressions against it, and
//! caches raw results with a TTL. Downstream layers treat a `None` result as
//! "no data", never as an error.

mod backend;
mod cache;
mod descriptor;

pub use backend::{IndexBackend, IndexError, IndexExpr, TestCoverage};
pub use cache::{Clock, ManualClock, QueryCache, SystemClock};
pub use descriptor::SymbolDescriptor;
