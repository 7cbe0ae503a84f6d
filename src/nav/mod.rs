pub mod navigator;
pub mod submit;
