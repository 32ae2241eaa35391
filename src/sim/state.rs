//! Runner state and entity types
//!
//! Each entity category lives in its own list on [`RunnerState`]. Positions use
//! `x` for the horizontal offset, `y` for height above the ground and `z` for
//! depth in front of the player.

use std::fmt;

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::LETTER_SET_SIZE;
use crate::progression::{Costume, Currency, Wallet};
use crate::tuning::RunnerTuning;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunnerPhase {
    /// Active gameplay (a timed pause countdown may still freeze ticks)
    Playing,
    /// Pause menu is open
    Paused,
    /// Run ended; frozen until restart
    GameOver,
}

/// Which player action lets an obstacle be bypassed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Avoidance {
    None,
    Jump,
    Roll,
}

/// Static obstacle kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Cone,
    Manhole,
    Puddle,
    Fork,
    Spoon,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 5] = [
        ObstacleKind::Cone,
        ObstacleKind::Manhole,
        ObstacleKind::Puddle,
        ObstacleKind::Fork,
        ObstacleKind::Spoon,
    ];

    pub fn avoidance(&self) -> Avoidance {
        match self {
            ObstacleKind::Manhole | ObstacleKind::Puddle => Avoidance::Jump,
            ObstacleKind::Fork | ObstacleKind::Spoon => Avoidance::Roll,
            ObstacleKind::Cone => Avoidance::None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ObstacleKind::Cone => "cone",
            ObstacleKind::Manhole => "manhole",
            ObstacleKind::Puddle => "puddle",
            ObstacleKind::Fork => "fork",
            ObstacleKind::Spoon => "spoon",
        }
    }
}

/// Dynamic obstacle kinds. Only a lane change or invulnerability avoids these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovingKind {
    Car,
    Feet,
}

impl MovingKind {
    pub const ALL: [MovingKind; 2] = [MovingKind::Car, MovingKind::Feet];

    pub fn name(&self) -> &'static str {
        match self {
            MovingKind::Car => "car",
            MovingKind::Feet => "feet",
        }
    }
}

/// Collectible kinds; each credits one unit of its currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectibleKind {
    Coin,
    Strawberry,
    Chocolate,
}

impl CollectibleKind {
    pub const ALL: [CollectibleKind; 3] = [
        CollectibleKind::Coin,
        CollectibleKind::Strawberry,
        CollectibleKind::Chocolate,
    ];

    pub fn points(&self) -> u64 {
        match self {
            CollectibleKind::Coin => 100,
            CollectibleKind::Strawberry | CollectibleKind::Chocolate => 50,
        }
    }

    pub fn currency(&self) -> Currency {
        match self {
            CollectibleKind::Coin => Currency::Coin,
            CollectibleKind::Strawberry => Currency::Strawberry,
            CollectibleKind::Chocolate => Currency::Chocolate,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CollectibleKind::Coin => "coin",
            CollectibleKind::Strawberry => "strawberry",
            CollectibleKind::Chocolate => "chocolate",
        }
    }
}

/// Power-up kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Sweeps up every collectible in an extended depth band
    IcingGun,
    /// Timed status with no gameplay side effect
    HoneyCluster,
    /// Timed invulnerability
    Glaze,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [
        PowerUpKind::IcingGun,
        PowerUpKind::HoneyCluster,
        PowerUpKind::Glaze,
    ];

    pub fn grants_invulnerability(&self) -> bool {
        matches!(self, PowerUpKind::Glaze)
    }

    pub fn name(&self) -> &'static str {
        match self {
            PowerUpKind::IcingGun => "icing_gun",
            PowerUpKind::HoneyCluster => "honey_cluster",
            PowerUpKind::Glaze => "glaze",
        }
    }
}

/// The five symbols of the collection set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Letter {
    D,
    O,
    N,
    U,
    T,
}

impl Letter {
    pub const ALL: [Letter; LETTER_SET_SIZE] =
        [Letter::D, Letter::O, Letter::N, Letter::U, Letter::T];

    pub fn symbol(&self) -> char {
        match self {
            Letter::D => 'D',
            Letter::O => 'O',
            Letter::N => 'N',
            Letter::U => 'U',
            Letter::T => 'T',
        }
    }

    fn bit(&self) -> u8 {
        1 << (*self as u8)
    }
}

/// Letters gathered toward the current set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterSet {
    mask: u8,
}

impl LetterSet {
    /// Add a letter. Returns false if it was already in the set.
    pub fn insert(&mut self, letter: Letter) -> bool {
        let fresh = self.mask & letter.bit() == 0;
        self.mask |= letter.bit();
        fresh
    }

    pub fn contains(&self, letter: Letter) -> bool {
        self.mask & letter.bit() != 0
    }

    pub fn len(&self) -> usize {
        self.mask.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.mask == 0
    }

    pub fn is_complete(&self) -> bool {
        self.len() == LETTER_SET_SIZE
    }

    pub fn clear(&mut self) {
        self.mask = 0;
    }

    /// Letters still needed, in set order
    pub fn missing(&self) -> Vec<Letter> {
        Letter::ALL
            .iter()
            .copied()
            .filter(|l| !self.contains(*l))
            .collect()
    }

    /// Progress string such as `"D-N--"`
    pub fn progress(&self) -> String {
        Letter::ALL
            .iter()
            .map(|l| if self.contains(*l) { l.symbol() } else { '-' })
            .collect()
    }
}

/// A static obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    pub pos: Vec3,
}

/// A moving obstacle; expires after a fixed number of ticks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovingObstacle {
    pub id: u32,
    pub kind: MovingKind,
    pub pos: Vec3,
    pub age_ticks: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub id: u32,
    pub kind: CollectibleKind,
    pub pos: Vec3,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vec3,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LetterPickup {
    pub id: u32,
    pub letter: Letter,
    pub pos: Vec3,
}

/// What a particle burst was emitted for (renderer picks the color)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BurstKind {
    Coin,
    Strawberry,
    Chocolate,
    Letter,
    PowerUp,
}

impl From<CollectibleKind> for BurstKind {
    fn from(kind: CollectibleKind) -> Self {
        match kind {
            CollectibleKind::Coin => BurstKind::Coin,
            CollectibleKind::Strawberry => BurstKind::Strawberry,
            CollectibleKind::Chocolate => BurstKind::Chocolate,
        }
    }
}

/// A burst particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec3,
    pub vel: Vec3,
    pub kind: BurstKind,
    pub life: u32,
}

/// Trail particle dropped behind the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sprinkle {
    pub pos: Vec3,
    pub vel: Vec3,
    pub life: u32,
}

/// Player motion state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerMotion {
    Grounded,
    Jumping,
    Rolling,
}

/// The player donut
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub lane: usize,
    /// Current horizontal position (eases toward `target_x`)
    pub x: f32,
    pub target_x: f32,
    pub motion: PlayerMotion,
    /// Height above ground while jumping
    pub jump_height: f32,
    /// Upward velocity while jumping
    pub jump_velocity: f32,
    pub invulnerable: bool,
    pub power_up: Option<PowerUpKind>,
    pub power_up_ticks: u32,
    /// Currency earned this run
    pub wallet: Wallet,
    pub costume: Costume,
}

impl Player {
    /// Create a player standing in the middle lane
    pub fn new(tuning: &RunnerTuning) -> Self {
        let lane = tuning.lane_count / 2;
        let x = tuning.lane_x(lane);
        Self {
            lane,
            x,
            target_x: x,
            motion: PlayerMotion::Grounded,
            jump_height: 0.0,
            jump_velocity: 0.0,
            invulnerable: false,
            power_up: None,
            power_up_ticks: 0,
            wallet: Wallet::default(),
            costume: Costume::Default,
        }
    }

    pub fn is_jumping(&self) -> bool {
        self.motion == PlayerMotion::Jumping
    }

    pub fn is_rolling(&self) -> bool {
        self.motion == PlayerMotion::Rolling
    }

    pub fn on_ground(&self) -> bool {
        self.motion != PlayerMotion::Jumping
    }

    pub fn move_left(&mut self, tuning: &RunnerTuning) {
        if self.lane > 0 {
            self.lane -= 1;
            self.target_x = tuning.lane_x(self.lane);
        }
    }

    pub fn move_right(&mut self, tuning: &RunnerTuning) {
        if self.lane + 1 < tuning.lane_count {
            self.lane += 1;
            self.target_x = tuning.lane_x(self.lane);
        }
    }

    /// Start a jump (only from the ground, never mid-roll)
    pub fn jump(&mut self, tuning: &RunnerTuning) {
        if self.motion == PlayerMotion::Grounded {
            self.motion = PlayerMotion::Jumping;
            self.jump_velocity = tuning.jump_velocity;
        }
    }

    /// Start rolling (only from the ground, never mid-jump)
    pub fn roll(&mut self) {
        if self.motion == PlayerMotion::Grounded {
            self.motion = PlayerMotion::Rolling;
        }
    }

    pub fn stop_rolling(&mut self) {
        if self.motion == PlayerMotion::Rolling {
            self.motion = PlayerMotion::Grounded;
        }
    }

    pub fn activate_power_up(&mut self, kind: PowerUpKind, tuning: &RunnerTuning) {
        self.power_up = Some(kind);
        self.power_up_ticks = tuning.power_up_ticks;
        if kind.grants_invulnerability() {
            self.invulnerable = true;
        }
    }

    /// Per-tick kinematics: lane easing, jump arc and power-up countdown
    pub fn update(&mut self, tuning: &RunnerTuning) {
        self.x += (self.target_x - self.x) * tuning.lane_lerp;

        if self.motion == PlayerMotion::Jumping {
            self.jump_height += self.jump_velocity;
            self.jump_velocity -= tuning.gravity;
            if self.jump_height <= 0.0 {
                self.jump_height = 0.0;
                self.jump_velocity = 0.0;
                self.motion = PlayerMotion::Grounded;
            }
        }

        if self.power_up_ticks > 0 {
            self.power_up_ticks -= 1;
            if self.power_up_ticks == 0 {
                self.power_up = None;
                self.invulnerable = false;
            }
        }
    }
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    Obstacle(ObstacleKind),
    Moving(MovingKind),
}

impl fmt::Display for GameOverReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameOverReason::Obstacle(kind) => write!(f, "ran into a {}", kind.name()),
            GameOverReason::Moving(kind) => write!(f, "got caught by a {}", kind.name()),
        }
    }
}

/// Gameplay events emitted during a tick (for renderer/audio)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunnerEvent {
    Collected { kind: CollectibleKind },
    LetterCollected { letter: Letter, fresh: bool },
    LetterSetComplete,
    PowerUp { kind: PowerUpKind },
    IcingGunSweep { count: usize },
    SpeedUp { speed: f32 },
    GameOver { reason: GameOverReason },
}

/// Spawn counters, in ticks since the last spawn of each category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnTimers {
    pub obstacle: u32,
    pub moving: u32,
    pub collectible: u32,
    pub letter: u32,
}

/// Complete runner session state
#[derive(Debug, Clone)]
pub struct RunnerState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub tuning: RunnerTuning,
    pub phase: RunnerPhase,
    /// Remaining ticks of a timed pause; ticks are no-ops while nonzero
    pub pause_ticks: u32,
    pub score: u64,
    pub distance: f32,
    pub world_speed: f32,
    /// Simulated (unpaused) ticks
    pub time_ticks: u64,
    pub player: Player,
    pub obstacles: Vec<Obstacle>,
    pub moving_obstacles: Vec<MovingObstacle>,
    pub collectibles: Vec<Collectible>,
    pub power_ups: Vec<PowerUp>,
    pub letters: Vec<LetterPickup>,
    pub particles: Vec<Particle>,
    pub sprinkles: Vec<Sprinkle>,
    pub letter_set: LetterSet,
    pub letter_sets_completed: u32,
    pub timers: SpawnTimers,
    pub game_over: Option<GameOverReason>,
    /// Events from the most recent ticks, drained by the front end
    pub events: Vec<RunnerEvent>,
    /// Cosmetic particles enabled (off under reduced motion)
    pub cosmetics: bool,
    /// First-person camera; the player emits no sprinkles
    pub first_person: bool,
    next_id: u32,
}

impl RunnerState {
    /// Create a new run with the given seed
    pub fn new(seed: u64, tuning: RunnerTuning) -> Self {
        let player = Player::new(&tuning);
        let world_speed = tuning.base_speed;
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            phase: RunnerPhase::Playing,
            pause_ticks: 0,
            score: 0,
            distance: 0.0,
            world_speed,
            time_ticks: 0,
            player,
            obstacles: Vec::new(),
            moving_obstacles: Vec::new(),
            collectibles: Vec::new(),
            power_ups: Vec::new(),
            letters: Vec::new(),
            particles: Vec::new(),
            sprinkles: Vec::new(),
            letter_set: LetterSet::default(),
            letter_sets_completed: 0,
            timers: SpawnTimers::default(),
            game_over: None,
            events: Vec::new(),
            cosmetics: true,
            first_person: false,
            next_id: 1,
        }
    }

    /// Reset everything for a fresh run in one step. Costume and view
    /// preferences carry over; the RNG continues from its current state.
    pub fn restart(&mut self) {
        let costume = self.player.costume;
        self.player = Player::new(&self.tuning);
        self.player.costume = costume;
        self.phase = RunnerPhase::Playing;
        self.pause_ticks = 0;
        self.score = 0;
        self.distance = 0.0;
        self.world_speed = self.tuning.base_speed;
        self.time_ticks = 0;
        self.obstacles.clear();
        self.moving_obstacles.clear();
        self.collectibles.clear();
        self.power_ups.clear();
        self.letters.clear();
        self.particles.clear();
        self.sprinkles.clear();
        self.letter_set.clear();
        self.letter_sets_completed = 0;
        self.timers = SpawnTimers::default();
        self.game_over = None;
        self.events.clear();
        log::info!("Runner restarted (seed {})", self.seed);
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == RunnerPhase::GameOver
    }

    /// Ticks are skipped while paused, timed-paused or over
    pub fn is_frozen(&self) -> bool {
        self.phase != RunnerPhase::Playing || self.pause_ticks > 0
    }

    /// Take the pending events
    pub fn drain_events(&mut self) -> Vec<RunnerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Total live entities across every gameplay list
    pub fn entity_count(&self) -> usize {
        self.obstacles.len()
            + self.moving_obstacles.len()
            + self.collectibles.len()
            + self.power_ups.len()
            + self.letters.len()
    }
}
