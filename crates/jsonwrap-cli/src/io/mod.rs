pub mod input;
pub mod manifest;
