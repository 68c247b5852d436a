//! Fixed table layout shared by every metric table.

/// Version of the JSON summaries emitted by the CLI.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Date bucket column, derived from the sample timestamp.
pub const CREATED_DATE_COLUMN: &str = "created_date";

/// Second-precision timestamp column.
pub const CREATED_AT_COLUMN: &str = "created_at";

/// Foreign key into the tags table.
pub const TAGS_ID_COLUMN: &str = "tags_id";

/// Leading columns of every metric table, in table order.
pub const PREFIX_COLUMNS: [&str; 3] = [CREATED_DATE_COLUMN, CREATED_AT_COLUMN, TAGS_ID_COLUMN];

/// Primary key column of the tags table.
pub const TAG_ID_COLUMN: &str = "id";

/// MergeTree index granularity used for all created tables.
pub const INDEX_GRANULARITY: u32 = 8192;

/// Size in bytes of one Float64 value, used for batch budgeting.
pub const FLOAT64_BYTES: usize = 8;

/// One mebibyte.
pub const MIB: usize = 1024 * 1024;

/// Default byte budget per write batch.
pub const DEFAULT_BATCH_BUDGET_BYTES: usize = MIB;
