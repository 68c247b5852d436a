//! Line-state machine for the benchmark data format.
//!
//! ```text
//! <header line>                      ignored
//! cpu,usage_user,usage_system        schema block, one metric per line
//! mem,used,free
//!                                    blank line ends the schema block
//! 1,hostname=host_0,region=...       tag line
//! cpu,1451606400000000000,58.5,2.2   data line
//! 2,hostname=host_0,region=...       tag line
//! mem,1451606400000000000,10,90      data line
//! ```
//!
//! The parser makes a single pass and owns everything it builds; the result
//! is handed back as a [`ParsedInput`] once the input is exhausted.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;
use tsload_common::{Error, TagId};

use crate::row::{InsertQueue, Row};
use crate::schema::{MetricSchema, SchemaError};
use crate::tags::{Tag, TagRegistry, TAG_ATTRIBUTE_COUNT, TAG_KEYS};

/// Fields on a tag line: the ordinal plus one per attribute.
const TAG_LINE_FIELDS: usize = 1 + TAG_ATTRIBUTE_COUNT;

/// Where the parser is in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Expecting the header line.
    Header,
    /// Inside the schema block.
    ColumnSchema,
    /// Expecting a tag line.
    TagLine,
    /// Expecting the data line that belongs to `tag_id`.
    DataLine { tag_id: TagId },
}

/// What went wrong on a line.
#[derive(Debug, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("input is empty, expected a header line")]
    MissingHeader,

    #[error("tag line has {found} fields, expected {}", TAG_LINE_FIELDS)]
    TagFieldCount { found: usize },

    #[error("tag field {field:?} is not a single key=value pair")]
    MalformedTagField { field: String },

    #[error("tag field {position} has key {found:?}, expected {expected:?}")]
    UnexpectedTagKey {
        position: usize,
        expected: &'static str,
        found: String,
    },

    #[error("data line needs a metric, a timestamp and at least one value")]
    DataFieldCount,

    #[error("invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("invalid float {value:?} in value column {column}")]
    InvalidFloat { column: usize, value: String },

    #[error("expected a data line after the tag line, found a blank line")]
    BlankDataLine,

    #[error("input ended after a tag line without its data line")]
    TruncatedRecord,

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A fatal input error, located by its 1-based line number.
#[derive(Debug, thiserror::Error)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    /// Convert into the crate-wide error, attributing read failures to `path`.
    pub fn into_error(self, path: &Path) -> Error {
        match self.kind {
            ParseErrorKind::Io(source) => Error::input_io(path, source),
            ParseErrorKind::Schema(err) => Error::Schema {
                metric: err.metric().to_string(),
                message: format!("line {}: {}", self.line, err),
            },
            kind => Error::Parse {
                line: self.line,
                message: kind.to_string(),
            },
        }
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        err.into_error(Path::new("<input>"))
    }
}

/// Everything recovered from one input.
#[derive(Debug, Clone, Default)]
pub struct ParsedInput {
    pub schema: MetricSchema,
    pub tags: TagRegistry,
    pub queue: InsertQueue,
    /// Lines consumed, header included.
    pub lines: usize,
}

/// Incremental parser; feed it lines in order, then call [`Parser::finish`].
#[derive(Debug)]
pub struct Parser {
    state: ParserState,
    line: usize,
    schema: MetricSchema,
    tags: TagRegistry,
    queue: InsertQueue,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Parser {
            state: ParserState::Header,
            line: 0,
            schema: MetricSchema::new(),
            tags: TagRegistry::new(),
            queue: InsertQueue::new(),
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn schema(&self) -> &MetricSchema {
        &self.schema
    }

    pub fn tags(&self) -> &TagRegistry {
        &self.tags
    }

    pub fn queue(&self) -> &InsertQueue {
        &self.queue
    }

    /// Consume one line (without its terminator) and advance the state.
    pub fn feed_line(&mut self, line: &str) -> Result<ParserState, ParseError> {
        self.line += 1;
        let line = line.strip_suffix('\r').unwrap_or(line);
        let next = match self.state {
            ParserState::Header => Ok(ParserState::ColumnSchema),
            ParserState::ColumnSchema => self.on_column_schema(line),
            ParserState::TagLine => self.on_tag_line(line),
            ParserState::DataLine { tag_id } => self.on_data_line(line, tag_id),
        };
        self.state = next.map_err(|kind| self.error(kind))?;
        Ok(self.state)
    }

    /// End of input: check the last record is complete and hand over the results.
    pub fn finish(self) -> Result<ParsedInput, ParseError> {
        match self.state {
            ParserState::Header => Err(ParseError {
                line: 1,
                kind: ParseErrorKind::MissingHeader,
            }),
            ParserState::DataLine { .. } => Err(ParseError {
                line: self.line + 1,
                kind: ParseErrorKind::TruncatedRecord,
            }),
            ParserState::ColumnSchema | ParserState::TagLine => Ok(ParsedInput {
                schema: self.schema,
                tags: self.tags,
                queue: self.queue,
                lines: self.line,
            }),
        }
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError {
            line: self.line,
            kind,
        }
    }

    fn on_column_schema(&mut self, line: &str) -> Result<ParserState, ParseErrorKind> {
        if line.is_empty() {
            return Ok(ParserState::TagLine);
        }
        let (metric, columns) = parse_schema_line(line);
        if self.schema.declare(metric, columns)? {
            debug!(metric, line = self.line, "discovered metric");
        }
        Ok(ParserState::ColumnSchema)
    }

    fn on_tag_line(&mut self, line: &str) -> Result<ParserState, ParseErrorKind> {
        if line.is_empty() {
            return Ok(ParserState::TagLine);
        }
        let tag = parse_tag_line(line)?;
        let tag_id = self.tags.resolve(tag);
        Ok(ParserState::DataLine { tag_id })
    }

    fn on_data_line(&mut self, line: &str, tag_id: TagId) -> Result<ParserState, ParseErrorKind> {
        if line.is_empty() {
            return Err(ParseErrorKind::BlankDataLine);
        }
        let record = parse_data_line(line)?;
        let expected = self
            .schema
            .columns(record.metric)
            .ok_or_else(|| SchemaError::UnknownMetric {
                metric: record.metric.to_string(),
            })?
            .len();
        if record.values.len() != expected {
            return Err(SchemaError::ColumnCountMismatch {
                metric: record.metric.to_string(),
                expected,
                found: record.values.len(),
            }
            .into());
        }
        let row = Row::from_timestamp_nanos(record.timestamp_nanos, tag_id, record.values)
            .ok_or_else(|| ParseErrorKind::InvalidTimestamp {
                value: record.timestamp_nanos.to_string(),
                reason: "out of range".to_string(),
            })?;
        self.queue.push(record.metric, row);
        Ok(ParserState::TagLine)
    }
}

/// Split a schema line into its metric name and column names.
pub fn parse_schema_line(line: &str) -> (&str, Vec<String>) {
    let mut fields = line.split(',');
    let metric = fields.next().unwrap_or_default();
    (metric, fields.map(str::to_string).collect())
}

/// Rebuild a tag from `<ordinal>,hostname=...,service_environment=...`.
///
/// The ordinal is ignored. Attributes are positional and each key must match
/// the attribute expected at its position.
pub fn parse_tag_line(line: &str) -> Result<Tag, ParseErrorKind> {
    let found = line.split(',').count();
    if found != TAG_LINE_FIELDS {
        return Err(ParseErrorKind::TagFieldCount { found });
    }

    let mut values: [&str; TAG_ATTRIBUTE_COUNT] = [""; TAG_ATTRIBUTE_COUNT];
    for (i, field) in line.split(',').skip(1).enumerate() {
        let mut parts = field.split('=');
        let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(ParseErrorKind::MalformedTagField {
                field: field.to_string(),
            });
        };
        if key != TAG_KEYS[i] {
            return Err(ParseErrorKind::UnexpectedTagKey {
                position: i + 2,
                expected: TAG_KEYS[i],
                found: key.to_string(),
            });
        }
        values[i] = value;
    }

    Ok(Tag::from_values(values.map(str::to_string)))
}

/// A decoded data line.
#[derive(Debug, Clone, PartialEq)]
pub struct DataRecord<'a> {
    pub metric: &'a str,
    pub timestamp_nanos: i64,
    pub values: Vec<f64>,
}

/// Decode `metric,timestampNanos,v1,v2,...`.
pub fn parse_data_line(line: &str) -> Result<DataRecord<'_>, ParseErrorKind> {
    let mut fields = line.split(',');
    let (Some(metric), Some(timestamp)) = (fields.next(), fields.next()) else {
        return Err(ParseErrorKind::DataFieldCount);
    };

    let timestamp_nanos =
        parse_timestamp(timestamp).map_err(|reason| ParseErrorKind::InvalidTimestamp {
            value: timestamp.to_string(),
            reason,
        })?;

    let values = fields
        .enumerate()
        .map(|(i, raw)| {
            raw.parse::<f64>()
                .map_err(|_| ParseErrorKind::InvalidFloat {
                    column: i + 1,
                    value: raw.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    if values.is_empty() {
        return Err(ParseErrorKind::DataFieldCount);
    }

    Ok(DataRecord {
        metric,
        timestamp_nanos,
        values,
    })
}

/// Unsigned decimal nanoseconds that fit in an `i64`. No sign is accepted.
fn parse_timestamp(raw: &str) -> Result<i64, String> {
    if !raw.starts_with(|c: char| c.is_ascii_digit()) {
        return Err("not an unsigned decimal integer".to_string());
    }
    let nanos = raw.parse::<u64>().map_err(|e| e.to_string())?;
    i64::try_from(nanos).map_err(|e| e.to_string())
}

/// Parse a whole stream.
pub fn parse_reader<R: BufRead>(mut reader: R) -> Result<ParsedInput, ParseError> {
    let mut parser = Parser::new();
    let mut buf = String::new();
    loop {
        buf.clear();
        let read = reader.read_line(&mut buf).map_err(|e| ParseError {
            line: parser.line + 1,
            kind: ParseErrorKind::Io(e),
        })?;
        if read == 0 {
            break;
        }
        let line = buf.strip_suffix('\n').unwrap_or(&buf);
        parser.feed_line(line)?;
    }
    parser.finish()
}

/// Open and parse a benchmark data file.
pub fn parse_file(path: &Path) -> Result<ParsedInput, Error> {
    let file = File::open(path).map_err(|e| Error::input_io(path, e))?;
    parse_reader(BufReader::new(file)).map_err(|e| e.into_error(path))
}
