/// Side length of one grid cell in pixels
pub const CELL_SIZE_PX: u32 = 20;

/// Default board size in cells (400x400 px canvas)
pub const DEFAULT_GRID_WIDTH: u16 = 20;
pub const DEFAULT_GRID_HEIGHT: u16 = 20;

/// Largest side a grid can have, since positions are `i16`
pub const MAX_GRID_SIDE: u16 = i16::MAX as u16;

/// Base points for every egg, plus a per-level bonus
pub const POINTS_PER_FOOD: u32 = 10;
pub const POINTS_PER_LEVEL: u32 = 5;

/// Highest level with its own configuration
pub const MAX_LEVEL: u32 = 6;

/// How long a level-up banner stays on screen before reverting to the playing status
pub const LEVEL_UP_BANNER_MS: u64 = 2000;

/// Maximum number of entries kept in the client-side leaderboard
pub const CLIENT_LEADERBOARD_CAPACITY: usize = 50;

/// Maximum number of entries written to the mirrored remote document
pub const MIRROR_LEADERBOARD_CAPACITY: usize = 100;

/// Entries returned by the full and top-10 leaderboard views
pub const LEADERBOARD_VIEW_LIMIT: usize = 50;
pub const TOP_TEN: usize = 10;

/// Player names are truncated to this many characters
pub const MAX_NAME_CHARS: usize = 15;

pub const DEFAULT_PLAYER_NAME: &str = "Anónimo";

/// Version tag written into persisted leaderboard documents
pub const LEADERBOARD_DOCUMENT_VERSION: &str = "1.0.0";

/// Durable client storage keys
pub const HIGH_SCORE_KEY: &str = "snakeHighScore";
pub const LEADERBOARD_KEY: &str = "pabloDevLeaderboard";
pub const PLAYER_NAME_KEY: &str = "playerNamePablo";
pub const SYNC_TOKEN_KEY: &str = "githubToken";

/// Where the game looks for a leaderboard service by default
pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:3000";

/// Static copy of the mirrored leaderboard, used when no service answers
pub const DEFAULT_FALLBACK_URL: &str =
    "https://raw.githubusercontent.com/frijolito2024/frijolito-snake/master/db.json";

/// Upper bound for any leaderboard request made by the game
pub const REQUEST_TIMEOUT_MS: u64 = 5000;

// Touch swipes shorter than this are taps
pub const MIN_SWIPE_DISTANCE_PX: f64 = 30.0;
