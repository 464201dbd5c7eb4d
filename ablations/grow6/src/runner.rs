//! 程序运行函数.

use crate::result::AblationResult;
use std::thread;
use utils::phantom;

/// 实际运行. 每组实验在独立线程中进行.
pub fn run() -> AblationResult {
    let size = phantom::size_from_env();
    println!(
        "Running ablation studies on {size}^3 phantoms with {} cpus...",
        utils::cpus()
    );
    thread::scope(|s| {
        use super::algos::*;

        let handles = [six, diagonal, gradient, barriers].map(|t| s.spawn(move || t(size)));

        AblationResult::new(
            size,
            ["six", "diagonal", "gradient", "barriers"].into_iter().zip(
                handles
                    .into_iter()
                    .map(|th| th.join().expect("Thread joining error")),
            ),
        )
    })
}
