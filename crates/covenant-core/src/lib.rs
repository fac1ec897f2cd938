pub mod error;
pub mod format;
pub mod types;

#[cfg(feature = "covenant")]
pub mod covenant;

#[cfg(feature = "covenant")]
pub mod provider;

#[cfg(feature = "forecast")]
pub mod forecast;

#[cfg(feature = "waiver")]
pub mod waiver;

#[cfg(feature = "portfolio")]
pub mod portfolio;

pub use error::CovenantError;
pub use types::*;

/// Standard result type for all covenant-core operations
pub type CovenantResult<T> = Result<T, CovenantError>;
