//! CLI commands implementation

pub mod ingest;
pub mod init;
pub mod load;
pub mod query;
pub mod status;

pub use ingest::*;
pub use init::*;
pub use load::*;
pub use query::*;
pub use status::*;
