pub mod canvas;
pub mod stage;
