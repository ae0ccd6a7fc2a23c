use std::collections::BTreeMap;
use std::time::Duration;

use glam::Vec2;
use hollowvein_common::{GridPoint, TrackableId};
use hollowvein_world::{World, chunk_position_of};

/// Default sampling cadence.
pub const TRACK_INTERVAL: Duration = Duration::from_millis(250);

/// Where an entity currently is, in chunk/space terms.
///
/// `space` is the index of the containing space within the chunk, `None`
/// while inside solid ground or an ungenerated chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionData {
    pub chunk: GridPoint,
    pub space: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("entity {0:?} is already tracked")]
    AlreadyTracked(TrackableId),
    #[error("entity {0:?} is not tracked")]
    NotTracked(TrackableId),
    #[error("subscriber key `{0}` already registered")]
    DuplicateSubscriber(String),
    #[error("no subscriber registered under key `{0}`")]
    UnknownSubscriber(String),
}

type PositionProvider = Box<dyn FnMut() -> Vec2>;
type ChangeCallback = Box<dyn FnMut(&PositionData, &PositionData)>;

struct Subscriber {
    key: String,
    callback: ChangeCallback,
}

struct TrackedEntity {
    provider: PositionProvider,
    last: PositionData,
    subscribers: Vec<Subscriber>,
}

/// Samples tracked entity positions on a fixed cadence and notifies
/// subscribers on chunk or space transitions.
///
/// Sampling is pull-based: each tracked entity supplies a position provider
/// closure, queried only when the cadence fires. Subscribers on one entity
/// run in subscription order. With nothing tracked, `advance` does no work.
pub struct PositionTracker {
    interval: Duration,
    accumulator: Duration,
    entities: BTreeMap<TrackableId, TrackedEntity>,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::with_interval(TRACK_INTERVAL)
    }

    pub fn with_interval(interval: Duration) -> Self {
        assert!(!interval.is_zero(), "tracking interval must be positive");
        Self {
            interval,
            accumulator: Duration::ZERO,
            entities: BTreeMap::new(),
        }
    }

    pub fn tracked_count(&self) -> usize {
        self.entities.len()
    }

    /// Begin tracking an entity. The initial sample is taken immediately and
    /// returned; subscribers only hear about changes after this point.
    pub fn track(
        &mut self,
        id: TrackableId,
        provider: impl FnMut() -> Vec2 + 'static,
        world: &World,
    ) -> Result<PositionData, TrackError> {
        if self.entities.contains_key(&id) {
            return Err(TrackError::AlreadyTracked(id));
        }
        let mut provider: PositionProvider = Box::new(provider);
        let last = resolve(world, provider());
        self.entities.insert(
            id,
            TrackedEntity {
                provider,
                last,
                subscribers: Vec::new(),
            },
        );
        tracing::debug!(?id, chunk = %last.chunk, "tracking started");
        Ok(last)
    }

    pub fn untrack(&mut self, id: TrackableId) -> Result<(), TrackError> {
        self.entities
            .remove(&id)
            .map(|_| tracing::debug!(?id, "tracking stopped"))
            .ok_or(TrackError::NotTracked(id))
    }

    /// Last sampled position, without touching the provider.
    pub fn last_known(&self, id: TrackableId) -> Option<PositionData> {
        self.entities.get(&id).map(|e| e.last)
    }

    /// Register a change callback under a caller-chosen key. Keys are unique
    /// per entity and are the handle for unsubscribing.
    pub fn subscribe(
        &mut self,
        id: TrackableId,
        key: impl Into<String>,
        callback: impl FnMut(&PositionData, &PositionData) + 'static,
    ) -> Result<(), TrackError> {
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(TrackError::NotTracked(id))?;
        let key = key.into();
        if entity.subscribers.iter().any(|s| s.key == key) {
            return Err(TrackError::DuplicateSubscriber(key));
        }
        entity.subscribers.push(Subscriber {
            key,
            callback: Box::new(callback),
        });
        Ok(())
    }

    pub fn unsubscribe(&mut self, id: TrackableId, key: &str) -> Result<(), TrackError> {
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(TrackError::NotTracked(id))?;
        let before = entity.subscribers.len();
        entity.subscribers.retain(|s| s.key != key);
        if entity.subscribers.len() == before {
            return Err(TrackError::UnknownSubscriber(key.to_string()));
        }
        Ok(())
    }

    /// Advance tracker time. Samples fire on the fixed cadence; a long `dt`
    /// catches up one interval at a time.
    pub fn advance(&mut self, dt: Duration, world: &World) {
        if self.entities.is_empty() {
            // Nothing tracked: drop the time instead of banking a backlog.
            self.accumulator = Duration::ZERO;
            return;
        }
        self.accumulator += dt;
        while self.accumulator >= self.interval {
            self.accumulator -= self.interval;
            self.sample(world);
        }
    }

    fn sample(&mut self, world: &World) {
        for (id, entity) in &mut self.entities {
            let position = (entity.provider)();
            let cell = GridPoint::new(position.x.floor() as i32, position.y.floor() as i32);
            if still_inside(world, entity.last, cell) {
                continue;
            }
            let current = resolve(world, position);
            if current == entity.last {
                continue;
            }
            tracing::trace!(?id, from = %entity.last.chunk, to = %current.chunk, "position change");
            for subscriber in &mut entity.subscribers {
                (subscriber.callback)(&entity.last, &current);
            }
            entity.last = current;
        }
    }
}

impl Default for PositionTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Cheap containment check against the last-known chunk and space; true
/// means nothing changed and full resolution can be skipped.
fn still_inside(world: &World, last: PositionData, cell: GridPoint) -> bool {
    if chunk_position_of(cell) != last.chunk {
        return false;
    }
    let Some(index) = last.space else {
        // Was outside any space; a space may now contain the cell.
        return false;
    };
    world
        .get_chunk_at(last.chunk)
        .and_then(|c| c.spaces().get(index))
        .is_some_and(|s| s.contains(cell))
}

/// Map a continuous position to its grid cell, chunk, and space.
fn resolve(world: &World, position: Vec2) -> PositionData {
    let cell = GridPoint::new(position.x.floor() as i32, position.y.floor() as i32);
    let chunk = chunk_position_of(cell);
    let space = world
        .get_chunk_at(chunk)
        .and_then(|c| c.space_index_for(cell));
    PositionData { chunk, space }
}
