pub mod backup;
pub mod cache;
pub mod important;
pub mod prefs;
pub mod progress;
pub mod sentences;
pub mod stats;
pub mod storage_info;
pub mod study;
