pub mod engines;
pub mod harness;

#[allow(unused_imports)]
pub use harness::Harness;
