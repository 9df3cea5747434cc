//! Application-wide constants

// =============================================================================
// Authentication & Security
// =============================================================================

/// Default JWT token expiration in hours
pub const DEFAULT_JWT_EXPIRATION_HOURS: i64 = 100;

/// Minimum JWT secret length (security requirement)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Seconds per hour (for token expiration calculation)
pub const SECONDS_PER_HOUR: i64 = 3600;

/// Authorization header prefix for Bearer tokens
pub const BEARER_TOKEN_PREFIX: &str = "Bearer ";

/// JWT token type identifier
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

// =============================================================================
// Account Roles
// =============================================================================

/// Administrator role: manages classes and enrollments
pub const ROLE_ADMIN: &str = "admin";

/// Teacher role: records attendance
pub const ROLE_TEACHER: &str = "teacher";

/// Student role: subject of attendance records
pub const ROLE_STUDENT: &str = "student";

// =============================================================================
// Attendance
// =============================================================================

pub const STATUS_PRESENT: &str = "present";
pub const STATUS_ABSENT: &str = "absent";
pub const STATUS_LATE: &str = "late";
pub const STATUS_EXCUSED: &str = "excused";

// =============================================================================
// Server Configuration
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 5000;

/// Origin of the single-page client allowed by CORS
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

// =============================================================================
// Database
// =============================================================================

/// Default database connection URL (for development)
pub const DEFAULT_DATABASE_URL: &str = "sqlite://attendance.db?mode=rwc";

/// Default size of the connection pool
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: u64 = 8;
