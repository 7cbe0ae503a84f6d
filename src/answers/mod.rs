pub mod location;
pub mod resolver;
pub mod source;
