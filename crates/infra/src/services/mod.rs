mod push;
mod stream;

pub use push::*;
pub use stream::*;
