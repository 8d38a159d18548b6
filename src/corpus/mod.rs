//! Knowledge base corpus model and traversal
//!
//! The knowledge base is a fixed 3-level directory tree: subject directories
//! (`math`, `english`) containing topic directories containing subtopic
//! directories, with markdown files at every level. Filename suffixes convey
//! the document type (`-overview.md`, `-study-notes.md`); anything else is
//! generic content.

use crate::error::{Result, SatkbError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

/// Filename suffix marking overview documents
const OVERVIEW_SUFFIX: &str = "-overview.md";
/// Filename suffix marking study-notes documents
const STUDY_NOTES_SUFFIX: &str = "-study-notes.md";

/// The fixed subject set of the knowledge base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Math,
    English,
}

impl Subject {
    /// All subjects, in traversal order
    pub const ALL: [Subject; 2] = [Subject::Math, Subject::English];

    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::Math => "math",
            Subject::English => "english",
        }
    }

    /// Display name with leading capital ("Math", "English")
    pub fn display_name(&self) -> &'static str {
        match self {
            Subject::Math => "Math",
            Subject::English => "English",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subject {
    type Err = SatkbError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "math" => Ok(Subject::Math),
            "english" => Ok(Subject::English),
            other => Err(SatkbError::Knowledge(format!(
                "Unknown subject '{}' (expected one of: math, english)",
                other
            ))),
        }
    }
}

/// Subject filter for search operations
///
/// Unrecognized subjects are rejected at parse time, so downstream code
/// never sees a malformed filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectFilter {
    All,
    Only(Subject),
}

impl SubjectFilter {
    /// The subject to filter on, if any
    pub fn subject(&self) -> Option<Subject> {
        match self {
            SubjectFilter::All => None,
            SubjectFilter::Only(subject) => Some(*subject),
        }
    }

    /// Whether a document with the given subject passes the filter
    pub fn matches(&self, subject: Subject) -> bool {
        match self {
            SubjectFilter::All => true,
            SubjectFilter::Only(wanted) => *wanted == subject,
        }
    }
}

impl fmt::Display for SubjectFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectFilter::All => f.write_str("all"),
            SubjectFilter::Only(subject) => f.write_str(subject.as_str()),
        }
    }
}

impl FromStr for SubjectFilter {
    type Err = SatkbError;

    fn from_str(s: &str) -> Result<Self> {
        if s == "all" {
            Ok(SubjectFilter::All)
        } else {
            Ok(SubjectFilter::Only(s.parse()?))
        }
    }
}

/// Document type tag derived from the file's position and name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    SubjectOverview,
    SubjectNotes,
    TopicOverview,
    TopicNotes,
    SubtopicOverview,
    SubtopicNotes,
    TopicContent,
    SubtopicContent,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::SubjectOverview => "subject_overview",
            DocumentKind::SubjectNotes => "subject_notes",
            DocumentKind::TopicOverview => "topic_overview",
            DocumentKind::TopicNotes => "topic_notes",
            DocumentKind::SubtopicOverview => "subtopic_overview",
            DocumentKind::SubtopicNotes => "subtopic_notes",
            DocumentKind::TopicContent => "topic_content",
            DocumentKind::SubtopicContent => "subtopic_content",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata attached to every indexed document
///
/// Serializes to the flat JSON object stored alongside each vector:
/// `subject`, optional `topic`/`subtopic`, `type`, `title`, `file_path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocMetadata {
    pub subject: Subject,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtopic: Option<String>,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub title: String,
    pub file_path: String,
}

/// A unit of retrievable text extracted from the knowledge base
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub text: String,
    pub metadata: DocMetadata,
}

/// Walk the knowledge base and collect every non-empty document
///
/// Traversal is depth-first over the fixed subject → topic → subtopic
/// hierarchy; directory entries are visited in name order so repeated scans
/// of an unchanged tree produce the same document sequence. Files whose
/// trimmed content is empty are skipped.
pub fn scan_knowledge_base(root: &Path) -> Result<Vec<SourceDocument>> {
    if !root.is_dir() {
        return Err(SatkbError::Knowledge(format!(
            "Knowledge base root not found: {}",
            root.display()
        )));
    }

    let mut documents = Vec::new();

    for subject in Subject::ALL {
        let subject_path = root.join(subject.as_str());
        if !subject_path.is_dir() {
            debug!("Subject directory missing, skipping: {:?}", subject_path);
            continue;
        }
        collect_subject(subject, &subject_path, &mut documents)?;
    }

    Ok(documents)
}

fn collect_subject(
    subject: Subject,
    subject_path: &Path,
    documents: &mut Vec<SourceDocument>,
) -> Result<()> {
    // Subject-level files use fixed names, not suffix scanning
    let overview = subject_path.join(format!("{}-overview.md", subject.as_str()));
    if overview.is_file() {
        push_document(
            documents,
            &overview,
            DocMetadata {
                subject,
                topic: None,
                subtopic: None,
                kind: DocumentKind::SubjectOverview,
                title: format!("{} Overview", subject.display_name()),
                file_path: overview.display().to_string(),
            },
        );
    }

    let study_notes = subject_path.join(format!("{}-study-notes.md", subject.as_str()));
    if study_notes.is_file() {
        push_document(
            documents,
            &study_notes,
            DocMetadata {
                subject,
                topic: None,
                subtopic: None,
                kind: DocumentKind::SubjectNotes,
                title: format!("{} Study Notes", subject.display_name()),
                file_path: study_notes.display().to_string(),
            },
        );
    }

    for topic_dir in sorted_entries(subject_path)? {
        if topic_dir.is_dir() {
            let topic_name = entry_name(&topic_dir);
            collect_topic(subject, &topic_name, &topic_dir, documents)?;
        }
    }

    Ok(())
}

fn collect_topic(
    subject: Subject,
    topic_name: &str,
    topic_path: &Path,
    documents: &mut Vec<SourceDocument>,
) -> Result<()> {
    for entry in sorted_entries(topic_path)? {
        if entry.is_file() && has_md_extension(&entry) {
            let file_name = entry_name(&entry);
            let topic_title = title_case(topic_name);
            let (kind, title) = if file_name.ends_with(OVERVIEW_SUFFIX) {
                (DocumentKind::TopicOverview, format!("{} Overview", topic_title))
            } else if file_name.ends_with(STUDY_NOTES_SUFFIX) {
                (DocumentKind::TopicNotes, format!("{} Study Notes", topic_title))
            } else {
                let stem = file_stem(&entry);
                (DocumentKind::TopicContent, format!("{} - {}", topic_title, stem))
            };

            push_document(
                documents,
                &entry,
                DocMetadata {
                    subject,
                    topic: Some(topic_name.to_string()),
                    subtopic: None,
                    kind,
                    title,
                    file_path: entry.display().to_string(),
                },
            );
        } else if entry.is_dir() {
            let subtopic_name = entry_name(&entry);
            collect_subtopic(subject, topic_name, &subtopic_name, &entry, documents)?;
        }
    }

    Ok(())
}

fn collect_subtopic(
    subject: Subject,
    topic_name: &str,
    subtopic_name: &str,
    subtopic_path: &Path,
    documents: &mut Vec<SourceDocument>,
) -> Result<()> {
    for entry in sorted_entries(subtopic_path)? {
        if !entry.is_file() || !has_md_extension(&entry) {
            continue;
        }

        let file_name = entry_name(&entry);
        let subtopic_title = title_case(subtopic_name);
        let (kind, title) = if file_name.ends_with(OVERVIEW_SUFFIX) {
            (
                DocumentKind::SubtopicOverview,
                format!("{} Overview", subtopic_title),
            )
        } else if file_name.ends_with(STUDY_NOTES_SUFFIX) {
            (
                DocumentKind::SubtopicNotes,
                format!("{} Study Notes", subtopic_title),
            )
        } else {
            let stem = file_stem(&entry);
            (
                DocumentKind::SubtopicContent,
                format!("{} - {}", subtopic_title, stem),
            )
        };

        push_document(
            documents,
            &entry,
            DocMetadata {
                subject,
                topic: Some(topic_name.to_string()),
                subtopic: Some(subtopic_name.to_string()),
                kind,
                title,
                file_path: entry.display().to_string(),
            },
        );
    }

    Ok(())
}

/// Read a file and append it as a document, skipping empty or unreadable ones
fn push_document(documents: &mut Vec<SourceDocument>, path: &Path, metadata: DocMetadata) {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to read {:?}, skipping: {}", path, e);
            return;
        }
    };

    if text.trim().is_empty() {
        debug!("Skipping empty document: {:?}", path);
        return;
    }

    documents.push(SourceDocument { text, metadata });
}

/// Directory entries sorted by file name for deterministic traversal
fn sorted_entries(dir: &Path) -> Result<Vec<std::path::PathBuf>> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .map_err(|e| SatkbError::Io {
            source: e,
            context: format!("Failed to read directory: {:?}", dir),
        })?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();
    Ok(entries)
}

fn has_md_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md")
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Convert a directory name like "linear-equations" to "Linear Equations"
pub fn title_case(name: &str) -> String {
    name.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn sample_corpus() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        write(&root.join("math/math-overview.md"), "# Math\nNumbers and shapes.");
        write(
            &root.join("math/math-study-notes.md"),
            "# Math Notes\nPractice daily.",
        );
        write(
            &root.join("math/algebra/algebra-overview.md"),
            "# Algebra\nVariables and equations.",
        );
        write(
            &root.join("math/algebra/linear-equations/linear-equations-study-notes.md"),
            "# Linear Equations\nSlope-intercept form.",
        );
        write(
            &root.join("math/algebra/extra-practice.md"),
            "Worked examples for factoring.",
        );
        write(
            &root.join("english/reading/reading-overview.md"),
            "# Reading\nCentral ideas and evidence.",
        );
        // Empty file must be skipped
        write(&root.join("english/english-overview.md"), "   \n  ");

        temp
    }

    #[test]
    fn test_scan_counts_non_empty_documents() {
        let temp = sample_corpus();
        let docs = scan_knowledge_base(temp.path()).unwrap();

        // 7 files written, one of them blank
        assert_eq!(docs.len(), 6);
    }

    #[test]
    fn test_scan_missing_root_errors() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        assert!(scan_knowledge_base(&missing).is_err());
    }

    #[test]
    fn test_kind_and_title_derivation() {
        let temp = sample_corpus();
        let docs = scan_knowledge_base(temp.path()).unwrap();

        let by_kind = |kind: DocumentKind| {
            docs.iter()
                .find(|d| d.metadata.kind == kind)
                .unwrap_or_else(|| panic!("no document of kind {}", kind))
        };

        assert_eq!(by_kind(DocumentKind::SubjectOverview).metadata.title, "Math Overview");
        assert_eq!(
            by_kind(DocumentKind::TopicOverview).metadata.title,
            "Algebra Overview"
        );
        assert_eq!(
            by_kind(DocumentKind::SubtopicNotes).metadata.title,
            "Linear Equations Study Notes"
        );

        let generic = by_kind(DocumentKind::TopicContent);
        assert_eq!(generic.metadata.title, "Algebra - extra-practice");
        assert_eq!(generic.metadata.topic.as_deref(), Some("algebra"));
        assert_eq!(generic.metadata.subtopic, None);
    }

    #[test]
    fn test_subtopic_metadata_carries_full_path() {
        let temp = sample_corpus();
        let docs = scan_knowledge_base(temp.path()).unwrap();

        let subtopic = docs
            .iter()
            .find(|d| d.metadata.kind == DocumentKind::SubtopicNotes)
            .unwrap();
        assert_eq!(subtopic.metadata.subject, Subject::Math);
        assert_eq!(subtopic.metadata.topic.as_deref(), Some("algebra"));
        assert_eq!(subtopic.metadata.subtopic.as_deref(), Some("linear-equations"));
    }

    #[test]
    fn test_scan_is_deterministic() {
        let temp = sample_corpus();
        let first = scan_knowledge_base(temp.path()).unwrap();
        let second = scan_knowledge_base(temp.path()).unwrap();

        let paths = |docs: &[SourceDocument]| {
            docs.iter().map(|d| d.metadata.file_path.clone()).collect::<Vec<_>>()
        };
        assert_eq!(paths(&first), paths(&second));
    }

    #[test]
    fn test_metadata_wire_format() {
        let metadata = DocMetadata {
            subject: Subject::Math,
            topic: Some("algebra".to_string()),
            subtopic: None,
            kind: DocumentKind::TopicNotes,
            title: "Algebra Study Notes".to_string(),
            file_path: "satKnowledge/math/algebra/algebra-study-notes.md".to_string(),
        };

        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["subject"], "math");
        assert_eq!(json["topic"], "algebra");
        assert_eq!(json["type"], "topic_notes");
        assert!(json.get("subtopic").is_none());
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("linear-equations"), "Linear Equations");
        assert_eq!(title_case("reading"), "Reading");
        assert_eq!(title_case("command-of-evidence"), "Command Of Evidence");
    }

    #[test]
    fn test_subject_filter_parsing() {
        assert_eq!("all".parse::<SubjectFilter>().unwrap(), SubjectFilter::All);
        assert_eq!(
            "math".parse::<SubjectFilter>().unwrap(),
            SubjectFilter::Only(Subject::Math)
        );
        assert!("history".parse::<SubjectFilter>().is_err());
    }
}
