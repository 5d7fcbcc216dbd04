pub mod basic;
pub mod date;
pub mod os;
pub mod rw;
