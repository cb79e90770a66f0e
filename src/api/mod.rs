pub mod analysis;
pub mod chat;

pub use analysis::*;
pub use chat::*;
