pub mod payments;
pub mod watch;

pub use payments::PaymentCoordinator;
pub use watch::{run_watch, PaymentWatch, StatusSource, WatchHandle, WatchState};
