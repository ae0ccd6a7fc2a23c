use std::collections::{BTreeSet, VecDeque};

use hollowvein_common::GridPoint;
use hollowvein_gen::{ChunkGenerator, Spawner};
use hollowvein_geom::GeomError;
use hollowvein_world::World;

/// What a queued command does when it executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Build,
    Teardown,
}

/// One unit of deferred chunk work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkCommand {
    pub position: GridPoint,
    pub kind: CommandKind,
}

/// Pipeline tuning.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Commands executed per `step` call.
    pub commands_per_tick: usize,
    /// Chunks within this ring of the focus are kept built.
    pub activation_radius: i32,
    /// Chunks beyond this ring of the focus are torn down. Must be at least
    /// the activation radius, or chunks would churn at the boundary.
    pub retire_radius: i32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            commands_per_tick: 2,
            activation_radius: 2,
            retire_radius: 4,
        }
    }
}

/// Running totals for instrumentation.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineStats {
    pub builds_completed: u64,
    pub teardowns_completed: u64,
    pub commands_queued: u64,
    pub duplicates_ignored: u64,
    pub commands_cancelled: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("chunk build failed: {0}")]
    Build(#[from] GeomError),
}

/// Budgeted chunk activation queue.
///
/// Requests are deduplicated against the world registry and the pending set,
/// then drained a fixed number per tick. A build command runs the generator
/// to completion before its chunk is registered; the world never holds a
/// partially built chunk.
pub struct ChunkPipeline {
    config: PipelineConfig,
    generator: ChunkGenerator,
    queue: VecDeque<ChunkCommand>,
    pending_builds: BTreeSet<GridPoint>,
    pending_teardowns: BTreeSet<GridPoint>,
    stats: PipelineStats,
}

impl ChunkPipeline {
    pub fn new(config: PipelineConfig, generator: ChunkGenerator) -> Self {
        assert!(
            config.retire_radius >= config.activation_radius,
            "retire radius must not be smaller than the activation radius"
        );
        assert!(config.commands_per_tick > 0, "command budget must be positive");
        Self {
            config,
            generator,
            queue: VecDeque::new(),
            pending_builds: BTreeSet::new(),
            pending_teardowns: BTreeSet::new(),
            stats: PipelineStats::default(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn is_pending(&self, position: GridPoint) -> bool {
        self.pending_builds.contains(&position) || self.pending_teardowns.contains(&position)
    }

    /// Queue a build unless the chunk already exists or a build is pending.
    /// Returns whether a command was queued.
    pub fn request_build(&mut self, world: &World, position: GridPoint) -> bool {
        if world.is_generated(position) || self.pending_builds.contains(&position) {
            self.stats.duplicates_ignored += 1;
            return false;
        }
        self.pending_builds.insert(position);
        self.queue.push_back(ChunkCommand {
            position,
            kind: CommandKind::Build,
        });
        self.stats.commands_queued += 1;
        true
    }

    /// Queue a teardown unless the chunk is absent or one is pending.
    pub fn request_teardown(&mut self, world: &World, position: GridPoint) -> bool {
        if !world.is_generated(position) || self.pending_teardowns.contains(&position) {
            self.stats.duplicates_ignored += 1;
            return false;
        }
        self.pending_teardowns.insert(position);
        self.queue.push_back(ChunkCommand {
            position,
            kind: CommandKind::Teardown,
        });
        self.stats.commands_queued += 1;
        true
    }

    /// Drop every queued command for a position. Cancellation has no side
    /// effects: a cancelled build leaves nothing behind, a cancelled teardown
    /// leaves the chunk in place. Returns whether anything was removed.
    pub fn cancel(&mut self, position: GridPoint) -> bool {
        let before = self.queue.len();
        self.queue.retain(|c| c.position != position);
        let removed = before - self.queue.len();
        if removed > 0 {
            self.pending_builds.remove(&position);
            self.pending_teardowns.remove(&position);
            self.stats.commands_cancelled += removed as u64;
            tracing::debug!(%position, removed, "commands cancelled");
        }
        removed > 0
    }

    /// Execute up to the per-tick budget of queued commands.
    ///
    /// Returns the number of commands executed. A geometry failure inside a
    /// build aborts the tick; the offending chunk is simply not registered.
    pub fn step<S: Spawner>(
        &mut self,
        world: &mut World,
        spawner: &mut S,
    ) -> Result<usize, PipelineError> {
        let _span = tracing::debug_span!("pipeline_step").entered();
        let mut executed = 0;
        while executed < self.config.commands_per_tick {
            let Some(command) = self.queue.pop_front() else {
                break;
            };
            match command.kind {
                CommandKind::Build => {
                    self.pending_builds.remove(&command.position);
                    if world.is_generated(command.position) {
                        // Raced with a direct insert; nothing to do.
                        continue;
                    }
                    let report = self.generator.build(command.position)?;
                    world.insert_chunk(report.chunk);
                    for spawn in report.enemies {
                        spawner.spawn_enemy(spawn.kind, spawn.position);
                    }
                    self.stats.builds_completed += 1;
                }
                CommandKind::Teardown => {
                    self.pending_teardowns.remove(&command.position);
                    if world.remove_chunk(command.position).is_some() {
                        self.stats.teardowns_completed += 1;
                    }
                }
            }
            executed += 1;
        }
        Ok(executed)
    }

    /// Reconcile the queue against a focus chunk position.
    ///
    /// Builds are requested for every ungenerated chunk within the activation
    /// ring; generated chunks beyond the retire ring are queued for teardown.
    /// Pending builds that drifted outside the retire ring are cancelled
    /// rather than completed and immediately retired.
    pub fn update_around(&mut self, world: &World, focus: GridPoint) {
        let _span = tracing::debug_span!("pipeline_update", %focus).entered();

        let stale: Vec<GridPoint> = self
            .pending_builds
            .iter()
            .copied()
            .filter(|p| p.chebyshev(focus) > self.config.retire_radius)
            .collect();
        for position in stale {
            self.cancel(position);
        }

        let r = self.config.activation_radius;
        for dy in -r..=r {
            for dx in -r..=r {
                self.request_build(world, focus + GridPoint::new(dx, dy));
            }
        }

        let retired: Vec<GridPoint> = world
            .positions()
            .filter(|p| p.chebyshev(focus) > self.config.retire_radius)
            .collect();
        for position in retired {
            self.request_teardown(world, position);
        }
    }
}
