mod category;
mod expense;
mod money;
mod period;

pub use category::*;
pub use expense::*;
pub use money::*;
pub use period::*;
