pub mod records;
pub mod shared;
