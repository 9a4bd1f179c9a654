//! Deferred tasks on the simulation clock
//!
//! Tasks are never cancelled in place. Each carries the session generation
//! it was scheduled under; a task that fires after a restart finds a newer
//! generation and is dropped by the caller.

/// What a task does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Drop cooldown elapsed; a new fruit may be held
    DropCooldown,
    /// Re-check the fruits watched by game-over window `window`
    ConfirmGameOver { window: u64 },
    /// Periodic session save
    Autosave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Task {
    /// Tick at which the task fires
    pub due: u64,
    /// Session generation when scheduled
    pub generation: u64,
    pub kind: TaskKind,
}

/// Pending tasks ordered by due tick (ties keep scheduling order)
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    tasks: Vec<Task>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: u64, generation: u64, kind: TaskKind) {
        let pos = self.tasks.partition_point(|t| t.due <= due);
        self.tasks.insert(
            pos,
            Task {
                due,
                generation,
                kind,
            },
        );
    }

    /// Remove and return every task due at or before `now`
    pub fn take_due(&mut self, now: u64) -> Vec<Task> {
        let split = self.tasks.partition_point(|t| t.due <= now);
        self.tasks.drain(..split).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tasks_fire_in_due_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(30, 0, TaskKind::Autosave);
        scheduler.schedule(10, 0, TaskKind::DropCooldown);
        scheduler.schedule(10, 1, TaskKind::ConfirmGameOver { window: 4 });

        assert!(scheduler.take_due(5).is_empty());

        let due = scheduler.take_due(10);
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].kind, TaskKind::DropCooldown);
        assert_eq!(due[1].kind, TaskKind::ConfirmGameOver { window: 4 });

        let rest = scheduler.take_due(100);
        assert_eq!(rest.len(), 1);
        assert_eq!((rest[0].generation, rest[0].kind), (0, TaskKind::Autosave));
        assert!(scheduler.take_due(u64::MAX).is_empty());
    }
}
