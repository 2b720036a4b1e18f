mod protocol;
mod rng;
mod score;
mod sequence;
mod session;
mod tile;

pub use protocol::*;
pub use rng::PseudoRandom;
pub use score::*;
pub use sequence::*;
pub use session::*;
pub use tile::*;
