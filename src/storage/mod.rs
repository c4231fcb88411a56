pub mod codec;
pub mod layout;
