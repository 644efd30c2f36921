pub mod batch;
pub mod delta;
pub mod directory;
pub mod error;
pub mod event;
pub mod mapper;
pub mod record;
pub mod telemetry;
pub mod writer;

pub use batch::*;
pub use directory::*;
pub use error::*;
pub use event::*;
pub use mapper::*;
pub use record::*;
pub use writer::*;
