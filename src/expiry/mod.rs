pub mod expirer;
