mod actor;
mod metrics_layer;
mod tracing_layer;

pub use actor::*;
pub use metrics_layer::*;
pub use tracing_layer::*;
