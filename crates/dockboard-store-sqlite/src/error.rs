//! Error type for `dockboard-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] dockboard_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("cannot decode stored value: {0}")]
  Decode(String),
}

/// Collapse into the core taxonomy so callers generic over
/// [`dockboard_core::store::ScheduleStore`] can map errors to user-facing
/// responses without knowing the backend.
impl From<Error> for dockboard_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(core) => core,
      other => dockboard_core::Error::Storage(other.to_string()),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
