pub mod actor;
pub mod broadcast;
pub mod detector;
pub mod errors;
pub mod kernel;
pub mod rates;
pub mod reader;
pub mod scenario;
pub mod unit;

pub use actor::Actor;
pub use broadcast::{Broadcast, Fork};
pub use detector::Detector;
pub use errors::{ConstructError, FiringError, Port, Side, UnitError, UnitResult};
pub use kernel::Kernel;
pub use rates::RateVector;
pub use reader::{check_production, read_inputs, write_outputs};
pub use scenario::{Firing, FiringFn, Scenario, Tokens};
pub use unit::{FiringCounter, Unit, UnitExit, UnitKind, run_unit};
