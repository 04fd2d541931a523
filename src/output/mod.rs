pub mod colors;
pub mod pager;

pub use pager::Pager;
