pub mod dom;
pub mod mock;
pub mod session;
