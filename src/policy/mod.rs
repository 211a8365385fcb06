pub mod ideal;
pub mod lru;
pub mod two_q;
