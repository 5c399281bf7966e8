//! Service configuration and default-priority policy.

use crate::model::item::ItemPriority;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Maximum hot items published when no override is configured.
pub const DEFAULT_HOT_ITEMS_LIMIT: u32 = 10;

/// How a freshly created item gets its priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityPolicy {
    /// Uniform over low/medium/high using the thread RNG.
    Random,
    /// Uniform, but reproducible for a given seed.
    Seeded(u64),
    /// Always the same priority.
    Fixed(ItemPriority),
}

/// Tunables for [`ProjectsService`](crate::service::projects_service::ProjectsService).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Cap for the hot items snapshot.
    pub hot_items_limit: u32,
    pub priority_policy: PriorityPolicy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            hot_items_limit: DEFAULT_HOT_ITEMS_LIMIT,
            priority_policy: PriorityPolicy::Random,
        }
    }
}

impl ServiceConfig {
    pub fn with_hot_items_limit(mut self, limit: u32) -> Self {
        self.hot_items_limit = limit;
        self
    }

    pub fn with_priority_policy(mut self, policy: PriorityPolicy) -> Self {
        self.priority_policy = policy;
        self
    }
}

/// Stateful priority source built from a [`PriorityPolicy`].
pub(crate) enum PriorityPicker {
    Thread,
    Seeded(StdRng),
    Fixed(ItemPriority),
}

impl PriorityPicker {
    pub(crate) fn from_policy(policy: PriorityPolicy) -> Self {
        match policy {
            PriorityPolicy::Random => Self::Thread,
            PriorityPolicy::Seeded(seed) => Self::Seeded(StdRng::seed_from_u64(seed)),
            PriorityPolicy::Fixed(priority) => Self::Fixed(priority),
        }
    }

    pub(crate) fn next_priority(&mut self) -> ItemPriority {
        match self {
            Self::Thread => pick(&mut rand::rng()),
            Self::Seeded(rng) => pick(rng),
            Self::Fixed(priority) => *priority,
        }
    }
}

fn pick(rng: &mut impl Rng) -> ItemPriority {
    ItemPriority::ALL[rng.random_range(0..ItemPriority::ALL.len())]
}
