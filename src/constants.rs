pub const RECIPE_COUNT_PER_PAGE: i64 = 25;

pub const MIN_PASSWORD_LENGTH: usize = 5;

pub const SESSION_LIFETIME_HOURS: i64 = 24;

pub const DB_POOL_MAX_CONNECTIONS: u32 = 5;
pub const DB_WAIT_MAX_ATTEMPTS: u32 = 60;
pub const DB_WAIT_RETRY_SECONDS: u64 = 1;

pub const USER_ROLES: &[(&str, &str)] = &[("user", "User"), ("admin", "Admin")];
