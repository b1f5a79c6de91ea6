pub mod icon;
pub mod text;
