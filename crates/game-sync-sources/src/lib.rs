pub mod error;
pub mod origin;
pub mod traits;
pub mod uplay;

pub use error::SourceError;
pub use origin::OriginClient;
pub use traits::PlaytimeSource;
pub use uplay::UplayClient;
