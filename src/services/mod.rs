pub mod notion;
pub mod sync;
pub mod youtube;
