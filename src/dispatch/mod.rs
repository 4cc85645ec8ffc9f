//! Rate-limited task dispatch.
//!
//! A [`DispatchQueue`] admits bounded units of asynchronous work and releases
//! them at a controlled rate and concurrency, preserving submission order
//! among tasks not yet started. It is deliberately decoupled from what the
//! tasks do: any "one shared quota-limited downstream, many concurrent
//! callers" situation fits.

pub mod queue;

pub use queue::{DispatchError, DispatchQueue};
