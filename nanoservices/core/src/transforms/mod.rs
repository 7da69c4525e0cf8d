pub mod cleaners;
pub mod mapping;
