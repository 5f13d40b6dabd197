pub mod notion;
pub mod youtube;
