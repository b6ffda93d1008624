//! 请求串行器
//!
//! 指针、键盘焦点和剪贴板是整个桌面共享的，任意两个请求的输入交错
//! 都会让两者同时失败。串行器用一把公平锁持有桌面，请求按准入顺序执行。

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Mutex, MutexGuard};

use super::error::{AutomationError, AutomationResult};
use crate::state::config::{AdmissionMode, SerializerConfig};

/// 准入策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionPolicy {
    /// 排队，最多 `capacity` 个请求等待
    Queue { capacity: usize },
    /// 忙碌时直接拒绝
    Reject,
}

impl AdmissionPolicy {
    /// 可等待的请求数
    fn capacity(&self) -> usize {
        match self {
            Self::Queue { capacity } => *capacity,
            Self::Reject => 0,
        }
    }
}

impl From<&SerializerConfig> for AdmissionPolicy {
    fn from(config: &SerializerConfig) -> Self {
        match config.mode {
            AdmissionMode::Queue => Self::Queue {
                capacity: config.queue_capacity,
            },
            AdmissionMode::Reject => Self::Reject,
        }
    }
}

/// 占用计数，析构时归还
///
/// 等待中的 `acquire` 被取消时也会归还
struct Ticket<'a> {
    in_system: &'a AtomicUsize,
}

impl Drop for Ticket<'_> {
    fn drop(&mut self) {
        self.in_system.fetch_sub(1, Ordering::SeqCst);
    }
}

/// 已准入的请求，持有桌面直到析构
pub struct Admission<'a, D> {
    guard: MutexGuard<'a, D>,
    _ticket: Ticket<'a>,
}

impl<D> Deref for Admission<'_, D> {
    type Target = D;

    fn deref(&self) -> &D {
        &self.guard
    }
}

impl<D> DerefMut for Admission<'_, D> {
    fn deref_mut(&mut self) -> &mut D {
        &mut self.guard
    }
}

/// 请求串行器
pub struct RequestSerializer<D> {
    desktop: Mutex<D>,
    policy: AdmissionPolicy,
    /// 执行中和等待中的请求数
    in_system: AtomicUsize,
}

impl<D> RequestSerializer<D> {
    pub fn new(desktop: D, policy: AdmissionPolicy) -> Self {
        Self {
            desktop: Mutex::new(desktop),
            policy,
            in_system: AtomicUsize::new(0),
        }
    }

    pub fn policy(&self) -> AdmissionPolicy {
        self.policy
    }

    /// 执行中和等待中的请求数
    pub fn in_flight(&self) -> usize {
        self.in_system.load(Ordering::SeqCst)
    }

    /// 申请独占桌面
    ///
    /// # Errors
    ///
    /// 等待队列已满（拒绝模式下为桌面忙碌）时立即返回 `AutomationError::Busy`
    pub async fn acquire(&self) -> AutomationResult<Admission<'_, D>> {
        let ahead = self.in_system.fetch_add(1, Ordering::SeqCst);
        let ticket = Ticket {
            in_system: &self.in_system,
        };

        // ahead 包含正在执行的一个
        if ahead > self.policy.capacity() {
            let waiting = ahead.saturating_sub(1);
            tracing::warn!(waiting, policy = ?self.policy, "Request refused, driver busy");
            drop(ticket);
            return Err(AutomationError::Busy { waiting });
        }

        if ahead > 0 {
            tracing::debug!(position = ahead, "Request queued");
        }

        let guard = self.desktop.lock().await;

        Ok(Admission {
            guard,
            _ticket: ticket,
        })
    }

    /// 取回桌面
    pub fn into_inner(self) -> D {
        self.desktop.into_inner()
    }
}
