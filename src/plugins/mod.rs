pub mod notifiers;
pub mod reporters;
pub mod traits;

pub use traits::{NotifierPlugin, StatusReporter};
