//! 取消作用域
//!
//! 取消是基于作用域的：一个 [`CancellationScope`] 被取消后，所有正在使用它的
//! 运动都会观察到取消，而不仅仅是某一次调用。
//!
//! # 架构
//!
//! ```text
//! ┌────────────────────────────┐
//! │  CancellationController    │
//! ├────────────────────────────┤
//! │ active: Mutex<Scope>       │ ← 读取/替换都在锁内
//! └────────────────────────────┘
//!            │ clone
//!            ▼
//! ┌────────────────────────────┐
//! │  CancellationScope (Arc)   │
//! ├────────────────────────────┤
//! │ cancelled: AtomicBool      │ ← 快速检查
//! │ lock + condvar             │ ← 阻塞等待取消
//! └────────────────────────────┘
//! ```
//!
//! 控制器的锁只在"读取当前作用域"和"取消并替换作用域"时短暂持有，
//! 运动执行期间从不持有，因此 `cancel` 永远不会被长时间运动阻塞。

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Debug)]
struct ScopeInner {
    id: u64,
    cancelled: AtomicBool,
    lock: Mutex<()>,
    condvar: Condvar,
}

/// 取消作用域
///
/// 可廉价克隆，所有克隆共享同一个取消状态。
#[derive(Debug, Clone)]
pub struct CancellationScope {
    inner: Arc<ScopeInner>,
}

impl CancellationScope {
    /// 创建新的（未取消的）作用域
    pub fn new() -> Self {
        CancellationScope {
            inner: Arc::new(ScopeInner {
                id: NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed),
                cancelled: AtomicBool::new(false),
                lock: Mutex::new(()),
                condvar: Condvar::new(),
            }),
        }
    }

    /// 作用域编号（单调递增，便于日志追踪）
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// 是否已被取消
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// 取消作用域并唤醒所有等待者
    ///
    /// 幂等。
    pub fn cancel(&self) {
        let _guard = self.inner.lock.lock();
        self.inner.cancelled.store(true, Ordering::Release);
        self.inner.condvar.notify_all();
    }

    /// 阻塞等待，直到作用域被取消或超时
    ///
    /// 返回 `true` 表示作用域已被取消。超时过大（截止时间无法表示）时一直等到取消。
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        if self.is_cancelled() {
            return true;
        }

        let deadline = Instant::now().checked_add(timeout);
        let mut guard = self.inner.lock.lock();
        while !self.is_cancelled() {
            match deadline {
                Some(deadline) => {
                    if self
                        .inner
                        .condvar
                        .wait_until(&mut guard, deadline)
                        .timed_out()
                    {
                        return self.is_cancelled();
                    }
                },
                None => self.inner.condvar.wait(&mut guard),
            }
        }
        true
    }

    /// 两个句柄是否指向同一个作用域
    pub fn same_scope(&self, other: &CancellationScope) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for CancellationScope {
    fn default() -> Self {
        Self::new()
    }
}

/// 取消控制器
///
/// 持有当前活动的作用域。任意时刻恰好有一个活动作用域。
#[derive(Debug)]
pub struct CancellationController {
    active: Mutex<CancellationScope>,
}

impl CancellationController {
    /// 创建控制器，并安装初始作用域
    pub fn new() -> Self {
        CancellationController {
            active: Mutex::new(CancellationScope::new()),
        }
    }

    /// 获取新命令应使用的作用域
    pub fn active_scope(&self) -> CancellationScope {
        self.active.lock().clone()
    }

    /// 取消当前作用域，并原子地安装新作用域
    ///
    /// 返回被取消的旧作用域。
    pub fn cancel(&self) -> CancellationScope {
        let mut active = self.active.lock();
        let fresh = CancellationScope::new();
        let old = std::mem::replace(&mut *active, fresh);
        old.cancel();
        old
    }

    /// 取消当前作用域但不替换（用于关闭）
    pub fn invalidate(&self) {
        self.active.lock().cancel();
    }
}

impl Default for CancellationController {
    fn default() -> Self {
        Self::new()
    }
}
