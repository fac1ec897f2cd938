pub mod linear;
pub mod trend;

pub use linear::{forecast, linear_regression, moving_average};
pub use trend::{classify_trend, percentage_change, Trend};
