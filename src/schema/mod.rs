pub mod dependencies;
pub mod tables;
pub mod types;
pub mod view;

pub use dependencies::*;
pub use tables::*;
pub use types::*;
pub use view::*;
