mod fixed;
mod interface;
mod network;

pub use fixed::*;
pub use interface::*;
pub use network::*;
