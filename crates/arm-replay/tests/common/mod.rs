//! 测试用假机械臂

#![allow(dead_code)]

use arm_replay::{ArmClient, CancellationScope, MoveError, MoveOptions};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

/// 记录所有运动的假机械臂
///
/// - 前 `blocking` 次运动阻塞在作用域上，直到被取消
/// - `fail_at` 指定的运动（从 0 计数）返回硬件错误
/// - 记录同时在途的最大运动数，用于检查串行下发
#[derive(Default)]
pub struct FakeArm {
    moves: Mutex<Vec<Vec<f64>>>,
    options: Mutex<Vec<Option<MoveOptions>>>,
    blocking: AtomicUsize,
    fail_at: Option<usize>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    move_delay: Duration,
}

impl FakeArm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(n: usize) -> Self {
        FakeArm {
            fail_at: Some(n),
            ..Default::default()
        }
    }

    /// 前 `n` 次运动阻塞直到作用域被取消
    pub fn blocking(n: usize) -> Self {
        FakeArm {
            blocking: AtomicUsize::new(n),
            ..Default::default()
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        FakeArm {
            move_delay: delay,
            ..Default::default()
        }
    }

    pub fn moves(&self) -> Vec<Vec<f64>> {
        self.moves.lock().clone()
    }

    /// 每次运动收到的运动选项
    pub fn received_options(&self) -> Vec<Option<MoveOptions>> {
        self.options.lock().clone()
    }

    pub fn move_count(&self) -> usize {
        self.moves.lock().len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// 等待直到至少 `n` 次运动已经开始
    pub fn wait_for_moves(&self, n: usize) {
        for _ in 0..5000 {
            if self.move_count() >= n {
                return;
            }
            thread::sleep(Duration::from_millis(1));
        }
        panic!("timed out waiting for {} moves", n);
    }

    fn take_blocking(&self) -> bool {
        self.blocking
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl ArmClient for FakeArm {
    fn move_to_joint_positions(
        &self,
        positions: &[f64],
        options: Option<&MoveOptions>,
        scope: &CancellationScope,
    ) -> Result<(), MoveError> {
        self.options.lock().push(options.cloned());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let index = {
            let mut moves = self.moves.lock();
            moves.push(positions.to_vec());
            moves.len() - 1
        };

        let result = if self.fail_at == Some(index) {
            Err(MoveError::Hardware(format!("fault on move {}", index)))
        } else if self.take_blocking() {
            if scope.wait_timeout(Duration::from_secs(30)) {
                Err(MoveError::Cancelled)
            } else {
                Err(MoveError::Hardware("blocking move never cancelled".to_string()))
            }
        } else if scope.wait_timeout(self.move_delay) {
            Err(MoveError::Cancelled)
        } else {
            Ok(())
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
