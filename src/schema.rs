//! Schema Descriptor
//!
//! Static textual description of the ER relational model handed to the
//! language model as grounding context. This must be kept in sync with the
//! actual database schema by the surrounding application.

/// Version tag for the schema description below. Bump whenever the text
/// changes so logged extractions can be correlated with the schema the
/// Coder saw.
pub const SCHEMA_VERSION: &str = "2024-06-er-v1";

/// Tables, columns, enums and relationships of the ER store.
pub const SCHEMA_CONTEXT: &str = r#"TABLES:
- Company (id, name, createdAt, updatedAt)
- ER (id, externalId, subject, overview, description, companyId, status, priorityLabel, submittedPriority, sentiment, committedVersion, requestedAt, updatedAtCsv, strategic, impact, technical, resource, market, totalCached, externalStatus, externalStatusAlt, externalRequestStatus, releaseId, devStatusId, source, lastSyncAt, externalUpdatedAt, zendeskTicketUrl, aiSummary, aiSuggestedScores, createdAt, updatedAt, themeId)
- Release (id, name, createdAt, updatedAt)
- DevelopmentStatus (id, name, createdAt, updatedAt)
- Tag (id, label)
- ERTag (erId, tagId)
- Comment (id, erId, authorId, body, createdAt)
- ERTheme (id, title, description, requirements, createdAt, updatedAt, suggestedScores)

ENUMS:
- ERStatus: OPEN, IN_REVIEW, ACCEPTED, REJECTED, DELIVERED, MANUAL_REVIEW, ACCEPT, REJECT
- ERSource: CSV, ZENDESK

RELATIONSHIPS:
- ER.companyId -> Company.id
- ER.releaseId -> Release.id
- ER.devStatusId -> DevelopmentStatus.id
- ER.themeId -> ERTheme.id
- ERTag -> joins ER and Tag"#;

/// Schema context plus version, bundled for injection into the agent steps.
#[derive(Debug, Clone)]
pub struct SchemaDescriptor {
    pub version: &'static str,
    pub context: &'static str,
}

impl Default for SchemaDescriptor {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION,
            context: SCHEMA_CONTEXT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_context_names_core_tables() {
        let schema = SchemaDescriptor::default();
        for table in ["Company", "ER", "Release", "Tag", "ERTheme"] {
            assert!(schema.context.contains(table), "missing table {}", table);
        }
        assert!(schema.context.contains("ERStatus"));
    }
}
