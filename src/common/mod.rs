// src/common/mod.rs
pub mod format;
pub mod storage;
