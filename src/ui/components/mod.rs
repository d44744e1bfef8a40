pub mod pause_overlay;
