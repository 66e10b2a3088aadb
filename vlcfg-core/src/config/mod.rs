//! Configuration types
//!
//! The entry schema describes a form; live entries hold what the operator
//! typed. Timing configuration is shared out-of-band with the receiver.

pub mod entry;
pub mod form;
pub mod timing;

pub use entry::*;
pub use form::*;
pub use timing::*;
