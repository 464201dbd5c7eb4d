//! 区域生长消融实验: 6/26-邻域, 种子/梯度容差, ROI 与路径阻断.

mod algos;
mod result;
mod runner;

fn main() -> std::io::Result<()> {
    let _ = simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init();
    runner::run().analyze()
}
