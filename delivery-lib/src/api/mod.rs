//! REST services over the delivery backend

mod dashboard;
mod photos;
mod request;
mod resource;

pub use dashboard::*;
pub use photos::*;
pub use resource::*;
