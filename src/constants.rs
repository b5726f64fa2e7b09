/// 间隔表（分钟）：5 分钟、30 分钟、12 小时、1 天、2 天、4 天、7 天、15 天
pub const INTERVAL_TABLE_MINUTES: [i64; 8] = [5, 30, 720, 1440, 2880, 5760, 10080, 21600];

/// Lower/upper bound of the mastery score.
pub const MASTERY_MIN: f64 = 0.0;
pub const MASTERY_MAX: f64 = 100.0;

/// 自信度取值范围
pub const CONFIDENCE_MIN: u8 = 1;
pub const CONFIDENCE_MAX: u8 = 5;

/// Mastery gained per confidence point on a correct answer.
pub const CORRECT_GAIN_PER_CONFIDENCE: f64 = 5.0;

/// Mastery lost per confidence point on a wrong answer.
pub const WRONG_PENALTY_PER_CONFIDENCE: f64 = 8.0;

/// 默认状态阈值
pub const DEFAULT_MASTERED_THRESHOLD: f64 = 90.0;
pub const DEFAULT_FORGOTTEN_THRESHOLD: f64 = 30.0;
pub const DEFAULT_FORGOTTEN_AFTER_REVIEWS: u32 = 3;

/// 复习窗口：复习时间前后各 2 小时
pub const REVIEW_WINDOW_HALF_WIDTH_HOURS: i64 = 2;

/// 默认每日新词数
pub const DEFAULT_DAILY_NEW_WORDS: u32 = 20;

/// 每日新词数上限
pub const MAX_DAILY_NEW_WORDS: u32 = 100;

/// 默认复习时间
pub const DEFAULT_REVIEW_TIME: &str = "20:00";

/// Max rows returned by one due-review query.
pub const DEFAULT_DUE_REVIEW_LIMIT: usize = 100;

/// 每分钟毫秒数
pub const MILLIS_PER_MINUTE: i64 = 60_000;
