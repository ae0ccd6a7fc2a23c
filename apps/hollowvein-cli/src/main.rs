use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hollowvein_common::{GridPoint, TrackableId};
use hollowvein_gen::{ChunkGenerator, GeneratorConfig, Spawner};
use hollowvein_persist::ChunkStore;
use hollowvein_stream::{ChunkPipeline, PipelineConfig, PositionTracker, TaskQueue};
use hollowvein_world::{CHUNK_SIZE, EnemyKind, World, chunk_position_of};

#[derive(Parser)]
#[command(name = "hollowvein-cli", about = "CLI tool for hollowvein world operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate info
    Info,
    /// Generate a square of chunks and persist them
    Generate {
        /// World seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Chunk radius around the origin
        #[arg(short, long, default_value = "3")]
        radius: i32,
        /// Store directory
        #[arg(short, long, default_value = "hollowvein_save")]
        out: PathBuf,
    },
    /// Run a streaming demo: a miner descends while chunks activate around it
    Explore {
        /// World seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Number of simulation ticks (100ms each)
        #[arg(short, long, default_value = "100")]
        ticks: u64,
    },
    /// Verify a stored world's integrity
    Verify {
        /// Store directory
        dir: PathBuf,
    },
}

#[derive(Default)]
struct TallySpawner {
    by_kind: BTreeMap<String, usize>,
}

impl Spawner for TallySpawner {
    fn spawn_enemy(&mut self, kind: EnemyKind, _position: GridPoint) {
        *self.by_kind.entry(format!("{kind:?}")).or_default() += 1;
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("hollowvein-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", hollowvein_common::crate_info());
            println!("geom: {}", hollowvein_geom::crate_info());
            println!("world: {}", hollowvein_world::crate_info());
            println!("gen: {}", hollowvein_gen::crate_info());
            println!("stream: {}", hollowvein_stream::crate_info());
            println!("persist: {}", hollowvein_persist::crate_info());
        }
        Commands::Generate { seed, radius, out } => generate(seed, radius, out)?,
        Commands::Explore { seed, ticks } => explore(seed, ticks)?,
        Commands::Verify { dir } => verify(dir)?,
    }

    Ok(())
}

fn generate(seed: u64, radius: i32, out: PathBuf) -> anyhow::Result<()> {
    println!("Generating chunks: seed={seed}, radius={radius}");
    let generator = ChunkGenerator::new(GeneratorConfig {
        world_seed: seed,
        ..GeneratorConfig::default()
    });

    let mut world = World::new();
    let mut total_enemies = 0;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let report = generator.build(GridPoint::new(dx, dy))?;
            total_enemies += report.enemies.len();
            world.insert_chunk(report.chunk);
        }
    }

    let mut store = ChunkStore::open(&out)?;
    let written = store.save_world(&world)?;
    store.verify_integrity()?;

    println!("Wrote {written} chunks to {}", out.display());
    println!("Enemy placements recorded: {total_enemies}");
    for chunk in world.chunks().values().take(5) {
        println!("  {}", chunk.summary());
    }
    Ok(())
}

fn explore(seed: u64, ticks: u64) -> anyhow::Result<()> {
    println!("Explore demo: seed={seed}, ticks={ticks}");
    let generator = ChunkGenerator::new(GeneratorConfig {
        world_seed: seed,
        ..GeneratorConfig::default()
    });

    let mut world = World::new();
    let mut pipeline = ChunkPipeline::new(PipelineConfig::default(), generator);
    let mut tracker = PositionTracker::new();
    let mut spawner = TallySpawner::default();
    let mut milestones: TaskQueue<()> = TaskQueue::new();

    // The miner starts at the surface and digs straight down.
    let miner_pos = Rc::new(RefCell::new(glam::Vec2::new(8.0, -1.0)));
    let miner = TrackableId::new();
    let provider_pos = Rc::clone(&miner_pos);
    tracker.track(miner, move || *provider_pos.borrow(), &world)?;
    tracker.subscribe(miner, "console", |old, new| {
        println!("  miner crossed {} -> {} (space {:?})", old.chunk, new.chunk, new.space);
    })?;

    let dt = Duration::from_millis(100);
    let total = dt * ticks as u32;
    milestones.schedule(total / 4, |_| println!("  [quarter mark]"));
    milestones.schedule(total * 3 / 4, |_| println!("  [three quarters]"));

    let descent_per_tick = 0.4f32;
    for _ in 0..ticks {
        miner_pos.borrow_mut().y -= descent_per_tick;
        let cell = {
            let p = *miner_pos.borrow();
            GridPoint::new(p.x.floor() as i32, p.y.floor() as i32)
        };
        pipeline.update_around(&world, chunk_position_of(cell));
        pipeline.step(&mut world, &mut spawner)?;
        tracker.advance(dt, &world);
        milestones.tick(dt, &mut ());
    }

    let stats = pipeline.stats();
    let final_depth = -(miner_pos.borrow().y.floor() as i32);
    println!("Final miner depth: {final_depth} cells ({} chunks)", final_depth / CHUNK_SIZE);
    println!(
        "Pipeline: {} built, {} retired, {} still queued",
        stats.builds_completed,
        stats.teardowns_completed,
        pipeline.queued()
    );
    println!("World holds {} chunks", world.chunk_count());
    if spawner.by_kind.is_empty() {
        println!("No enemies spawned");
    } else {
        println!("Enemies spawned:");
        for (kind, count) in &spawner.by_kind {
            println!("  {kind}: {count}");
        }
    }
    Ok(())
}

fn verify(dir: PathBuf) -> anyhow::Result<()> {
    let store = ChunkStore::open(&dir)?;
    store.verify_integrity()?;
    let world = store.load_world()?;
    println!("Store at {} is consistent", dir.display());
    println!(
        "Schema v{}, {} chunks stored",
        store.meta().chunk_schema_version,
        world.chunk_count()
    );
    let deepest = world.chunks().values().map(|c| c.depth()).max().unwrap_or(0);
    println!("Deepest stored chunk: {deepest} cells below the surface");
    Ok(())
}
