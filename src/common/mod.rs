// src/common/mod.rs
pub mod banner;
pub mod logger;
pub mod utils;
pub mod wordlist;
