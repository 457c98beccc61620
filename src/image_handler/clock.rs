//! # 时钟与时间预算
//!
//! ## 设计思路
//!
//! 时间预算只在编码阶段的每一行开始前检查，属于协作式、粗粒度的取消点。
//! 时钟通过 `Clock` trait 注入，测试可以用确定性的时钟模拟耗时而无需真实睡眠。

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::ImageError;

/// 单调时钟抽象。
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// 基于 `Instant::now()` 的系统时钟。
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// 一次编码调用的时间预算。
///
/// `started` 在下载开始前记录，因此预算覆盖下载、解码、缩放与编码全过程。
#[derive(Clone)]
pub struct TimeBudget {
    clock: Arc<dyn Clock>,
    started: Instant,
    limit: Duration,
}

impl TimeBudget {
    /// 以当前时刻为起点开始计时。
    pub fn start(clock: Arc<dyn Clock>, limit: Duration) -> Self {
        let started = clock.now();
        Self {
            clock,
            started,
            limit,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.clock.now().saturating_duration_since(self.started)
    }

    /// 超出预算时返回 `TimeExceeded`。
    pub fn check(&self) -> Result<(), ImageError> {
        if self.elapsed() > self.limit {
            return Err(ImageError::TimeExceeded {
                limit_secs: self.limit.as_secs(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// 每次读取前进固定步长的确定性时钟。
    pub(crate) struct SteppingClock {
        base: Instant,
        step: Duration,
        ticks: Mutex<u32>,
    }

    impl SteppingClock {
        pub(crate) fn new(step: Duration) -> Self {
            Self {
                base: Instant::now(),
                step,
                ticks: Mutex::new(0),
            }
        }

        pub(crate) fn reads(&self) -> u32 {
            *self.ticks.lock().expect("clock lock poisoned")
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> Instant {
            let mut ticks = self.ticks.lock().expect("clock lock poisoned");
            let now = self.base + self.step * *ticks;
            *ticks += 1;
            now
        }
    }
}
