use std::sync::atomic::{AtomicUsize, Ordering};

use uuid::Uuid;

use crate::models::domain::UserRole;

/// Entity kinds that get their own identifier prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdKind {
    Student,
    Admin,
    Question,
    Progress,
}

impl IdKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            IdKind::Student => "STUDENT-",
            IdKind::Admin => "ADMIN-",
            IdKind::Question => "Q-",
            IdKind::Progress => "PROGRESS-",
        }
    }

    fn suffix_len(&self) -> usize {
        match self {
            IdKind::Student | IdKind::Admin => 6,
            IdKind::Question | IdKind::Progress => 12,
        }
    }
}

impl From<UserRole> for IdKind {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Student => IdKind::Student,
            UserRole::Admin => IdKind::Admin,
        }
    }
}

pub trait IdGenerator: Send + Sync {
    fn generate(&self, kind: IdKind) -> String;
}

/// Prefix plus the leading hex digits of a v4 UUID, e.g. `Q-1f0c9a7d3b2e`.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn generate(&self, kind: IdKind) -> String {
        let uuid = Uuid::new_v4().simple().to_string();
        format!("{}{}", kind.prefix(), &uuid[..kind.suffix_len()])
    }
}

/// Deterministic ids (`Q-1`, `PROGRESS-2`, ...) for tests and local tooling.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    next: AtomicUsize,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn generate(&self, kind: IdKind) -> String {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{}{}", kind.prefix(), n)
    }
}
