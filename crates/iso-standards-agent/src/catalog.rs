/// Built-in table of medical-device standards.
///
/// The catalog is constructed once at startup and shared as `Arc<StandardsCatalog>`.
/// It has no mutation path; every accessor borrows.
use crate::model::StandardRecord;

pub struct StandardsCatalog {
    records: Vec<StandardRecord>,
}

impl StandardsCatalog {
    /// The three standards the assistant knows about.
    pub fn builtin() -> Self {
        Self::from_records(vec![
            StandardRecord {
                identifier: "ISO 13485".to_string(),
                title: "Medical devices - Quality management systems - Requirements for regulatory purposes".to_string(),
                topic: "Quality Management Systems for Medical Devices".to_string(),
                scope: "Requirements for quality management system for medical device organizations".to_string(),
                product_application: "All medical devices and related services".to_string(),
                publication_date: "2016 (current version)".to_string(),
                summary: "Specifies requirements for a quality management system where an organization needs to demonstrate its ability to provide medical devices and related services that consistently meet customer and applicable regulatory requirements.".to_string(),
            },
            StandardRecord {
                identifier: "ISO 14971".to_string(),
                title: "Medical devices - Application of risk management to medical devices".to_string(),
                topic: "Risk Management for Medical Devices".to_string(),
                scope: "Application of risk management to medical devices".to_string(),
                product_application: "All medical devices throughout their lifecycle".to_string(),
                publication_date: "2019 (current version)".to_string(),
                summary: "Specifies a process for a manufacturer to identify the hazards associated with medical devices, to estimate and evaluate the associated risks, to control these risks, and to monitor the effectiveness of the controls.".to_string(),
            },
            StandardRecord {
                identifier: "IEC 62304".to_string(),
                title: "Medical device software - Software life cycle processes".to_string(),
                topic: "Medical Device Software - Software Life Cycle Processes".to_string(),
                scope: "Software development life cycle processes for medical device software".to_string(),
                product_application: "Medical device software and software as medical devices".to_string(),
                publication_date: "2006 (current version)".to_string(),
                summary: "Defines the life cycle requirements for medical device software. The processes, activities, and tasks described in this standard establish a common framework for medical device software life cycle processes.".to_string(),
            },
        ])
    }

    /// Build a catalog from explicit records. Later duplicates of an identifier are dropped.
    pub fn from_records(records: Vec<StandardRecord>) -> Self {
        let mut unique: Vec<StandardRecord> = Vec::with_capacity(records.len());
        for record in records {
            let key = normalize_identifier(&record.identifier);
            if unique
                .iter()
                .all(|r| normalize_identifier(&r.identifier) != key)
            {
                unique.push(record);
            }
        }
        Self { records: unique }
    }

    pub fn records(&self) -> &[StandardRecord] {
        &self.records
    }

    pub fn identifiers(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.identifier.as_str()).collect()
    }

    /// Look up a record by identifier, ignoring case, spacing and a `:year` suffix.
    pub fn get(&self, identifier: &str) -> Option<&StandardRecord> {
        let key = normalize_identifier(identifier);
        if key.is_empty() {
            return None;
        }
        self.records
            .iter()
            .find(|r| normalize_identifier(&r.identifier) == key)
    }

    /// Canonical identifier for a loosely written reference such as "iso13485:2016".
    pub fn resolve(&self, identifier: &str) -> Option<&str> {
        self.get(identifier).map(|r| r.identifier.as_str())
    }

    /// Records whose descriptive text contains `keyword` (case-insensitive), in catalog order.
    pub fn find_by_keyword(&self, keyword: &str) -> Vec<&StandardRecord> {
        let needle = keyword.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.records
            .iter()
            .filter(|r| searchable_text(r).contains(&needle))
            .collect()
    }
}

fn searchable_text(record: &StandardRecord) -> String {
    format!(
        "{} {} {} {}",
        record.topic, record.scope, record.product_application, record.summary
    )
    .to_lowercase()
}

pub(crate) fn normalize_identifier(identifier: &str) -> String {
    let base = identifier.split(':').next().unwrap_or_default();
    base.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}
