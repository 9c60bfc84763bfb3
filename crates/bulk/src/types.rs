//! Types for the async Bulk API job and batch lifecycle.

use forcepull_client::security::xml;

/// XML namespace of async-API `jobInfo` and `batchInfo` documents.
const JOB_XMLNS: &str = "http://www.force.com/2009/06/asyncapi/dataload";

/// Async Bulk API operation types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOperation {
    /// Query records
    Query,
    /// Insert new records
    Insert,
    /// Update existing records
    Update,
    /// Upsert based on external ID
    Upsert,
    /// Delete records (soft delete)
    Delete,
    /// Hard delete records (permanent)
    HardDelete,
}

impl JobOperation {
    /// Get the API string for this operation.
    pub fn api_name(&self) -> &'static str {
        match self {
            JobOperation::Query => "query",
            JobOperation::Insert => "insert",
            JobOperation::Update => "update",
            JobOperation::Upsert => "upsert",
            JobOperation::Delete => "delete",
            JobOperation::HardDelete => "hardDelete",
        }
    }

    /// Check if this is a query operation.
    pub fn is_query(&self) -> bool {
        matches!(self, JobOperation::Query)
    }
}

/// Content type for job data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    #[default]
    Csv,
    Xml,
    Json,
}

impl ContentType {
    /// Get the API string for this content type.
    pub fn api_name(&self) -> &'static str {
        match self {
            ContentType::Csv => "CSV",
            ContentType::Xml => "XML",
            ContentType::Json => "JSON",
        }
    }
}

/// Concurrency mode for job processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcurrencyMode {
    Parallel,
    Serial,
}

impl ConcurrencyMode {
    /// Get the API string for this mode.
    pub fn api_name(&self) -> &'static str {
        match self {
            ConcurrencyMode::Parallel => "Parallel",
            ConcurrencyMode::Serial => "Serial",
        }
    }
}

/// Specification for a new job.
///
/// Renders as the `jobInfo` XML document the async API expects; element
/// order is fixed by the API schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    /// SObject API name
    pub object: String,
    /// Operation type
    pub operation: JobOperation,
    /// Content type of the batches this job will carry
    pub content_type: ContentType,
    /// Concurrency mode, server default when unset
    pub concurrency_mode: Option<ConcurrencyMode>,
    /// External ID field for upsert
    pub external_id_field: Option<String>,
}

impl JobSpec {
    /// Create a new job specification with CSV content.
    pub fn new(object: impl Into<String>, operation: JobOperation) -> Self {
        Self {
            object: object.into(),
            operation,
            content_type: ContentType::default(),
            concurrency_mode: None,
            external_id_field: None,
        }
    }

    /// Create a CSV query job specification.
    pub fn query(object: impl Into<String>) -> Self {
        Self::new(object, JobOperation::Query)
    }

    /// Set the content type.
    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    /// Set the concurrency mode.
    pub fn with_concurrency_mode(mut self, mode: ConcurrencyMode) -> Self {
        self.concurrency_mode = Some(mode);
        self
    }

    /// Set the external ID field for upsert operations.
    pub fn with_external_id_field(mut self, field: impl Into<String>) -> Self {
        self.external_id_field = Some(field.into());
        self
    }

    /// Render the `jobInfo` creation document.
    ///
    /// The schema requires `operation`, `object`, `externalIdFieldName`,
    /// `concurrencyMode`, `contentType` in exactly that order.
    pub fn to_xml(&self) -> String {
        let mut doc = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        doc.push_str(&format!("<jobInfo xmlns=\"{JOB_XMLNS}\">\n"));
        doc.push_str(&format!(
            "  <operation>{}</operation>\n",
            self.operation.api_name()
        ));
        doc.push_str(&format!("  <object>{}</object>\n", xml::escape(&self.object)));
        if let Some(field) = &self.external_id_field {
            doc.push_str(&format!(
                "  <externalIdFieldName>{}</externalIdFieldName>\n",
                xml::escape(field)
            ));
        }
        if let Some(mode) = self.concurrency_mode {
            doc.push_str(&format!(
                "  <concurrencyMode>{}</concurrencyMode>\n",
                mode.api_name()
            ));
        }
        doc.push_str(&format!(
            "  <contentType>{}</contentType>\n",
            self.content_type.api_name()
        ));
        doc.push_str("</jobInfo>");
        doc
    }
}

/// Render the `jobInfo` document that closes a job.
pub(crate) fn close_job_xml() -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<jobInfo xmlns=\"{JOB_XMLNS}\">\n  <state>Closed</state>\n</jobInfo>"
    )
}

/// Batch processing states reported by the async API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchState {
    /// Batch is waiting to be processed
    Queued,
    /// Batch is being processed
    InProgress,
    /// Batch finished successfully
    Completed,
    /// Batch failed
    Failed,
    /// Batch was not processed (job aborted or errored first)
    NotProcessed,
    /// State string this client does not know
    Other(String),
}

impl BatchState {
    /// Parse a state string. Accepts both `NotProcessed` and the spaced
    /// `Not Processed` spelling older API versions emit.
    pub fn parse(value: &str) -> Self {
        match value {
            "Queued" => BatchState::Queued,
            "InProgress" => BatchState::InProgress,
            "Completed" => BatchState::Completed,
            "Failed" => BatchState::Failed,
            "NotProcessed" | "Not Processed" => BatchState::NotProcessed,
            other => BatchState::Other(other.to_string()),
        }
    }

    /// Check if the batch is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BatchState::Completed | BatchState::Failed | BatchState::NotProcessed
        )
    }

    /// Check if the batch is in a terminal error state.
    pub fn is_error(&self) -> bool {
        matches!(self, BatchState::Failed | BatchState::NotProcessed)
    }

    /// Get the state string.
    pub fn as_str(&self) -> &str {
        match self {
            BatchState::Queued => "Queued",
            BatchState::InProgress => "InProgress",
            BatchState::Completed => "Completed",
            BatchState::Failed => "Failed",
            BatchState::NotProcessed => "NotProcessed",
            BatchState::Other(s) => s,
        }
    }
}

impl std::fmt::Display for BatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status record of one batch, as reported by the server.
///
/// Holds every child element of the `batchInfo` document as a
/// `(name, text)` field in document order, with typed accessors over the
/// fields the lifecycle logic reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStatus {
    fields: Vec<(String, String)>,
}

impl BatchStatus {
    /// Parse a flat `batchInfo` document.
    pub fn from_xml(xml: &str) -> Self {
        Self {
            fields: parse_info_fields(xml),
        }
    }

    /// Look up a field by element name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// Batch id.
    pub fn id(&self) -> Option<&str> {
        self.get("id")
    }

    /// Processing state, when reported.
    pub fn state(&self) -> Option<BatchState> {
        self.get("state").map(BatchState::parse)
    }

    /// Server message accompanying the state, usually set on failures.
    pub fn state_message(&self) -> Option<&str> {
        self.get("stateMessage")
    }

    /// Number of records processed so far.
    pub fn records_processed(&self) -> Option<u64> {
        self.get("numberRecordsProcessed")
            .and_then(|value| value.parse().ok())
    }

    /// Number of records that failed.
    pub fn records_failed(&self) -> Option<u64> {
        self.get("numberRecordsFailed")
            .and_then(|value| value.parse().ok())
    }

    /// All fields in document order.
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }
}

/// Progress snapshot handed to the progress hook when a completed batch's
/// result is fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgress {
    pub job_id: String,
    pub batch_id: String,
    /// Records processed, when the server reported a count.
    pub records_processed: Option<u64>,
    /// Records failed; only set when the count is greater than zero.
    pub records_failed: Option<u64>,
}

/// Extract `(name, text)` pairs from a flat async-API info document.
///
/// The `jobInfo`/`batchInfo` documents nest exactly one level: a root
/// element wrapping text-only children. The scan walks open tags, consumes
/// text only when the element closes immediately (leaf), and otherwise
/// descends by just continuing, so the root contributes no entry.
pub(crate) fn parse_info_fields(xml: &str) -> Vec<(String, String)> {
    let mut fields = Vec::new();
    let mut rest = xml;

    while let Some(start) = rest.find('<') {
        rest = &rest[start + 1..];

        // XML prolog
        if let Some(after) = rest.strip_prefix('?') {
            let Some(end) = after.find('>') else { break };
            rest = &after[end + 1..];
            continue;
        }
        // Closing tag
        if let Some(after) = rest.strip_prefix('/') {
            let Some(end) = after.find('>') else { break };
            rest = &after[end + 1..];
            continue;
        }

        let Some(tag_end) = rest.find('>') else { break };
        let tag = &rest[..tag_end];
        rest = &rest[tag_end + 1..];

        // Self-closing element, e.g. <stateMessage/>
        if let Some(bare) = tag.strip_suffix('/') {
            fields.push((element_name(bare).to_string(), String::new()));
            continue;
        }

        let name = element_name(tag);
        let close = format!("</{name}>");
        let Some(next_open) = rest.find('<') else { break };
        if rest[next_open..].starts_with(close.as_str()) {
            // Leaf element: take its text and consume the close tag.
            let text = xml::unescape(rest[..next_open].trim());
            rest = &rest[next_open + close.len()..];
            fields.push((name.to_string(), text));
        }
        // Container element (the root): children picked up by the scan.
    }
    fields
}

/// Look up one field of a flat info document, e.g. the `id` of a freshly
/// created job.
pub(crate) fn info_field(xml: &str, name: &str) -> Option<String> {
    parse_info_fields(xml)
        .into_iter()
        .find(|(field, _)| field == name)
        .map(|(_, value)| value)
}

fn element_name(tag: &str) -> &str {
    tag.split_whitespace().next().unwrap_or(tag)
}
