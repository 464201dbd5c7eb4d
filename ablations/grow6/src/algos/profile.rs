//! 区域生长运行统计.

use std::time::{Duration, Instant};
use vol_berry::prelude::*;

/// ablation/benchmark 计时器.
///
/// 该计时器支持 "中途中断" 与 "结束中断, 继续开始计时".
#[derive(Clone, Debug)]
struct AccTimer {
    consumed: Duration,
    since: Instant,
}

impl AccTimer {
    /// 初始化计时器. 初始化时会视为已经开始计时 (`self.start()`).
    #[inline]
    pub fn new() -> Self {
        Self {
            consumed: Duration::ZERO,
            since: Instant::now(),
        }
    }

    /// 开始计时.
    #[inline]
    pub fn start(&mut self) {
        self.since = Instant::now();
    }

    /// 结束计时, 并将这一区间的时间累加. 返回本轮计时时长.
    ///
    /// # 注意
    ///
    /// 上一次调用必须是 `self.start()`, 否则计算时间值无意义.
    #[inline]
    pub fn elapsed(&mut self) -> Duration {
        let d = self.since.elapsed();
        self.consumed += d;
        d
    }

    /// 获得总共累计下来的时间综合 (以微秒为单位).
    #[inline]
    pub fn get_total_us(&self) -> u64 {
        self.consumed.as_micros() as u64
    }
}

impl Default for AccTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// 一组区域生长任务的统计.
#[derive(Clone, Debug)]
pub struct Profile {
    /// 生长次数.
    runs: u64,

    /// 被调用者中止的次数.
    stopped: u64,

    /// 累计通过检查的体素个数.
    accepted: u64,

    /// 累计被检查的体素个数.
    visited: u64,

    /// 生长本身花费的总时间 (不含构造 phantom).
    grow_time: AccTimer,

    /// 整个任务花费的总时间.
    real_time: AccTimer,

    /// 最耗时的一次生长.
    most: Option<Duration>,
}

impl Profile {
    /// 初始化.
    #[inline]
    pub fn new() -> Self {
        Self {
            runs: 0,
            stopped: 0,
            accepted: 0,
            visited: 0,
            grow_time: AccTimer::default(),
            real_time: AccTimer::default(),
            most: None,
        }
    }

    /// 开始一次生长计时.
    #[inline]
    pub fn grow_start(&mut self) {
        self.grow_time.start();
    }

    /// 结束一次生长计时, 并记录其结果.
    pub fn grow_finished(&mut self, report: &FloodReport) {
        let d = self.grow_time.elapsed();
        self.most = Some(self.most.map_or(d, |m| m.max(d)));
        self.runs += 1;
        self.stopped += u64::from(report.state == FloodState::StoppedByCaller);
        self.accepted += report.accepted as u64;
        self.visited += report.visited as u64;
    }

    /// 结束全部计时.
    #[inline]
    pub fn finish(mut self) -> Self {
        self.real_time.elapsed();
        self
    }

    /// 获得生长次数.
    #[inline]
    pub fn get_runs(&self) -> u64 {
        self.runs
    }

    /// 获得被中止的次数.
    #[inline]
    pub fn get_stopped(&self) -> u64 {
        self.stopped
    }

    /// 获得累计通过检查的体素个数.
    #[inline]
    pub fn get_accepted(&self) -> u64 {
        self.accepted
    }

    /// 获得累计被检查的体素个数.
    #[inline]
    pub fn get_visited(&self) -> u64 {
        self.visited
    }

    /// 以微秒为单位获得生长的总时间.
    #[inline]
    pub fn get_grow_time_us(&self) -> u64 {
        self.grow_time.get_total_us()
    }

    /// 以微秒为单位获得算法运行到目前的总自然时间.
    #[inline]
    pub fn get_real_time_us(&self) -> u64 {
        self.real_time.get_total_us()
    }

    /// 以微秒为单位获得单次生长的平均时间.
    #[inline]
    pub fn get_avg_grow_time_us(&self) -> Option<f64> {
        match self.runs {
            0 => None,
            runs => Some(self.get_grow_time_us() as f64 / runs as f64),
        }
    }

    /// 每个被检查体素的平均耗时 (纳秒).
    pub fn get_ns_per_visit(&self) -> Option<f64> {
        match self.visited {
            0 => None,
            v => Some(self.get_grow_time_us() as f64 * 1000.0 / v as f64),
        }
    }

    /// 获取最耗时的一次生长所消耗的时间. 如果不存在任务, 则返回 `None`.
    #[inline]
    pub fn get_most_time_consuming(&self) -> Option<Duration> {
        self.most
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new()
    }
}
