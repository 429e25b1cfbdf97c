// Public modules
pub mod types;
pub mod error;
pub mod config;
pub mod parsing;
pub mod resources;
pub mod conditions;
pub mod filter;
pub mod kubernetes;
pub mod accumulator;
pub mod metrics;
pub mod collector;

// Re-export commonly used items
pub use types::*;
pub use error::{GatherError, ListError, QuantityError};
pub use config::{load_config, load_config_with_env, EnvironmentProvider, SystemEnvironment, MockEnvironment};
pub use parsing::{convert_quantity, parse_count, parse_quantity};
pub use filter::Filter;
pub use kubernetes::{KubeLister, ResourceLister};
pub use accumulator::{Accumulator, ErrorSink, LineProtocolWriter, MemoryAccumulator, MetricEmitter};
pub use collector::KubeInventory;
