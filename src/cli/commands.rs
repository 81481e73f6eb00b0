//! # Commands / 命令
//!
//! One module per entry point: `schedule`, `ls` and `results`.
//! 每个入口一个模块：`schedule`、`ls` 和 `results`。

pub mod ls;
pub mod results;
pub mod schedule;
