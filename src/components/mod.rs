pub mod controller;
pub mod palette;
