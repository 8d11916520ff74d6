// ==========================================
// 排程摄取服务 - 前沿去抖器
// ==========================================
// 职责: 把一次保存操作产生的事件风暴压成单个信号
// 语义: 前沿触发 - 风暴的第一个事件放行,窗口内后续事件丢弃,
//       窗口过后下一个事件重新放行
// ==========================================

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};

// ==========================================
// Debouncer - 去抖状态
// ==========================================
// 唯一的共享可变状态是上次放行时刻（毫秒数）。
// 判定与更新必须是单个原子步骤: 两个近乎同时到达的事件
// 不允许都通过闸门,因此用 compare_exchange 而不是
// 先读后写的两步比较。
pub struct Debouncer {
    /// 去抖窗口（毫秒）
    window_ms: i64,

    /// 毫秒计数的时间原点
    origin: Instant,

    /// 上次放行时刻（相对 origin 的毫秒数）
    last_emit_ms: AtomicI64,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        let window_ms = window.as_millis() as i64;
        Self {
            window_ms,
            origin: Instant::now(),
            // 初始值放在窗口之外,保证首个事件必然放行
            last_emit_ms: AtomicI64::new(-window_ms),
        }
    }

    /// 判定当前事件是否放行（放行则同时刷新去抖时刻)
    pub fn should_emit(&self) -> bool {
        self.should_emit_at(self.now_ms())
    }

    /// 以显式时刻判定（测试入口,时刻单位为毫秒）
    pub fn should_emit_at(&self, now_ms: i64) -> bool {
        loop {
            let last = self.last_emit_ms.load(Ordering::Acquire);
            if now_ms.saturating_sub(last) < self.window_ms {
                return false;
            }
            // CAS 失败说明并发事件抢先放行,重新判定
            match self.last_emit_ms.compare_exchange(
                last,
                now_ms,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(_) => continue,
            }
        }
    }

    fn now_ms(&self) -> i64 {
        self.origin.elapsed().as_millis() as i64
    }
}
