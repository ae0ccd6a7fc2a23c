use std::time::Duration;

struct TimedTask<C> {
    remaining: Duration,
    // Taken exactly once when the delay elapses.
    action: Option<Box<dyn FnOnce(&mut C)>>,
}

/// One-shot delayed task queue, driven by explicit `tick` calls.
///
/// Tasks fire in schedule order once their delay has elapsed; a task
/// scheduled with zero delay fires on the next tick, not immediately.
pub struct TaskQueue<C> {
    tasks: Vec<TimedTask<C>>,
}

impl<C> TaskQueue<C> {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn schedule(&mut self, delay: Duration, action: impl FnOnce(&mut C) + 'static) {
        self.tasks.push(TimedTask {
            remaining: delay,
            action: Some(Box::new(action)),
        });
    }

    /// Advance all pending tasks by `dt` and run those that came due.
    /// Returns how many fired.
    pub fn tick(&mut self, dt: Duration, ctx: &mut C) -> usize {
        for task in &mut self.tasks {
            task.remaining = task.remaining.saturating_sub(dt);
        }
        let mut fired = 0;
        for task in &mut self.tasks {
            if task.remaining.is_zero() {
                if let Some(action) = task.action.take() {
                    action(ctx);
                    fired += 1;
                }
            }
        }
        self.tasks.retain(|t| t.action.is_some());
        fired
    }
}

impl<C> Default for TaskQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}
