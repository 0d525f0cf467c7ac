pub mod feishu;

pub use feishu::{BitableSync, SyncRecord};
