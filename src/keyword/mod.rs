//! Offline keyword search over the knowledge base
//!
//! A lexical fallback to the semantic pipeline: the same subject → topic →
//! subtopic tree is held in memory with per-file word counts and section
//! splits, and queries are scored by phrase and word occurrence counts. No
//! embedding calls, no network; usable when the hosted services are not.

use crate::corpus::{title_case, DocumentKind, Subject, SubjectFilter};
use crate::error::{Result, SatkbError};
use ahash::AHashMap;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

const OVERVIEW_SUFFIX: &str = "-overview.md";
const STUDY_NOTES_SUFFIX: &str = "-study-notes.md";
const METADATA_FILE: &str = "metadata.json";

/// A `#`-headed section split out of a markdown file
#[derive(Debug, Clone)]
pub struct Section {
    pub header: String,
    pub content: String,
}

/// One markdown file held in the index
#[derive(Debug, Clone)]
pub struct IndexedFile {
    pub file_path: String,
    pub content: String,
    pub word_count: usize,
    pub sections: Vec<Section>,
}

/// Subtopic-level entry
#[derive(Debug, Clone, Default)]
pub struct SubtopicEntry {
    pub overview: Option<IndexedFile>,
    pub study_notes: Option<IndexedFile>,
    pub metadata: Option<serde_json::Value>,
}

/// Topic-level entry
#[derive(Debug, Clone, Default)]
pub struct TopicEntry {
    pub overview: Option<IndexedFile>,
    pub study_notes: Option<IndexedFile>,
    pub metadata: Option<serde_json::Value>,
    pub subtopics: AHashMap<String, SubtopicEntry>,
}

/// Subject-level entry
#[derive(Debug, Clone, Default)]
pub struct SubjectEntry {
    pub overview: Option<IndexedFile>,
    pub study_notes: Option<IndexedFile>,
    pub topics: AHashMap<String, TopicEntry>,
}

/// A scored keyword search hit
#[derive(Debug, Clone, Serialize)]
pub struct KeywordHit {
    pub subject: Subject,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtopic: Option<String>,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub title: String,
    pub content: String,
    pub file_path: String,
    pub relevance_score: f64,
}

/// In-memory keyword index over the knowledge base
pub struct KeywordIndex {
    subjects: AHashMap<Subject, SubjectEntry>,
}

impl KeywordIndex {
    /// Build the index by walking the knowledge base
    pub fn build(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(SatkbError::Knowledge(format!(
                "Knowledge base root not found: {}",
                root.display()
            )));
        }

        let mut subjects = AHashMap::new();
        for subject in Subject::ALL {
            let subject_path = root.join(subject.as_str());
            if !subject_path.is_dir() {
                debug!("Subject directory missing, skipping: {:?}", subject_path);
                continue;
            }
            subjects.insert(subject, index_subject(subject, &subject_path)?);
        }

        Ok(Self { subjects })
    }

    /// Search the index, lexically scored, best first
    ///
    /// Zero-score entries are dropped; an unindexed subject or an empty
    /// query yields no results.
    pub fn search(
        &self,
        query: &str,
        filter: SubjectFilter,
        max_results: usize,
    ) -> Vec<KeywordHit> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        let mut hits = Vec::new();
        for subject in Subject::ALL {
            if !filter.matches(subject) {
                continue;
            }
            if let Some(entry) = self.subjects.get(&subject) {
                collect_subject_hits(&query, subject, entry, &mut hits);
            }
        }

        hits.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(max_results);
        hits
    }

    /// List topic names per subject, sorted
    pub fn topics(&self, filter: SubjectFilter) -> Vec<(Subject, Vec<String>)> {
        Subject::ALL
            .iter()
            .filter(|subject| filter.matches(**subject))
            .map(|subject| {
                let mut names: Vec<String> = self
                    .subjects
                    .get(subject)
                    .map(|entry| entry.topics.keys().cloned().collect())
                    .unwrap_or_default();
                names.sort();
                (*subject, names)
            })
            .collect()
    }

    /// Direct lookup of a topic's indexed content
    pub fn topic(&self, subject: Subject, topic: &str) -> Option<&TopicEntry> {
        self.subjects.get(&subject)?.topics.get(topic)
    }

    /// Direct lookup of a subtopic's indexed content
    pub fn subtopic(
        &self,
        subject: Subject,
        topic: &str,
        subtopic: &str,
    ) -> Option<&SubtopicEntry> {
        self.topic(subject, topic)?.subtopics.get(subtopic)
    }
}

fn index_subject(subject: Subject, subject_path: &Path) -> Result<SubjectEntry> {
    let mut entry = SubjectEntry {
        overview: read_indexed_file(
            &subject_path.join(format!("{}-overview.md", subject.as_str())),
        ),
        study_notes: read_indexed_file(
            &subject_path.join(format!("{}-study-notes.md", subject.as_str())),
        ),
        topics: AHashMap::new(),
    };

    for topic_dir in read_dir_entries(subject_path)? {
        if topic_dir.is_dir() {
            let topic_name = file_name(&topic_dir);
            entry
                .topics
                .insert(topic_name, index_topic(&topic_dir)?);
        }
    }

    Ok(entry)
}

fn index_topic(topic_path: &Path) -> Result<TopicEntry> {
    let mut entry = TopicEntry::default();

    for path in read_dir_entries(topic_path)? {
        if path.is_file() {
            let name = file_name(&path);
            if name.ends_with(OVERVIEW_SUFFIX) {
                entry.overview = read_indexed_file(&path);
            } else if name.ends_with(STUDY_NOTES_SUFFIX) {
                entry.study_notes = read_indexed_file(&path);
            } else if name == METADATA_FILE {
                entry.metadata = read_json_file(&path);
            }
        } else if path.is_dir() {
            let subtopic_name = file_name(&path);
            entry
                .subtopics
                .insert(subtopic_name, index_subtopic(&path)?);
        }
    }

    Ok(entry)
}

fn index_subtopic(subtopic_path: &Path) -> Result<SubtopicEntry> {
    let mut entry = SubtopicEntry::default();

    for path in read_dir_entries(subtopic_path)? {
        if !path.is_file() {
            continue;
        }
        let name = file_name(&path);
        if name.ends_with(OVERVIEW_SUFFIX) {
            entry.overview = read_indexed_file(&path);
        } else if name.ends_with(STUDY_NOTES_SUFFIX) {
            entry.study_notes = read_indexed_file(&path);
        } else if name == METADATA_FILE {
            entry.metadata = read_json_file(&path);
        }
    }

    Ok(entry)
}

fn collect_subject_hits(
    query: &str,
    subject: Subject,
    entry: &SubjectEntry,
    hits: &mut Vec<KeywordHit>,
) {
    push_hit(
        query,
        hits,
        entry.overview.as_ref(),
        subject,
        None,
        None,
        DocumentKind::SubjectOverview,
        format!("{} Overview", subject.display_name()),
    );
    push_hit(
        query,
        hits,
        entry.study_notes.as_ref(),
        subject,
        None,
        None,
        DocumentKind::SubjectNotes,
        format!("{} Study Notes", subject.display_name()),
    );

    for (topic_name, topic) in &entry.topics {
        let topic_title = title_case(topic_name);
        push_hit(
            query,
            hits,
            topic.overview.as_ref(),
            subject,
            Some(topic_name),
            None,
            DocumentKind::TopicOverview,
            format!("{} Overview", topic_title),
        );
        push_hit(
            query,
            hits,
            topic.study_notes.as_ref(),
            subject,
            Some(topic_name),
            None,
            DocumentKind::TopicNotes,
            format!("{} Study Notes", topic_title),
        );

        for (subtopic_name, subtopic) in &topic.subtopics {
            let subtopic_title = title_case(subtopic_name);
            push_hit(
                query,
                hits,
                subtopic.overview.as_ref(),
                subject,
                Some(topic_name),
                Some(subtopic_name),
                DocumentKind::SubtopicOverview,
                format!("{} Overview", subtopic_title),
            );
            push_hit(
                query,
                hits,
                subtopic.study_notes.as_ref(),
                subject,
                Some(topic_name),
                Some(subtopic_name),
                DocumentKind::SubtopicNotes,
                format!("{} Study Notes", subtopic_title),
            );
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn push_hit(
    query: &str,
    hits: &mut Vec<KeywordHit>,
    file: Option<&IndexedFile>,
    subject: Subject,
    topic: Option<&String>,
    subtopic: Option<&String>,
    kind: DocumentKind,
    title: String,
) {
    let Some(file) = file else { return };

    let score = relevance_score(query, &file.content);
    if score <= 0.0 {
        return;
    }

    hits.push(KeywordHit {
        subject,
        topic: topic.cloned(),
        subtopic: subtopic.cloned(),
        kind,
        title,
        content: file.content.clone(),
        file_path: file.file_path.clone(),
        relevance_score: score,
    });
}

/// Lexical relevance: exact-phrase occurrences weigh 10, occurrences of
/// each query word longer than 2 chars weigh 2, normalized per 100 words
/// of content.
fn relevance_score(query: &str, content: &str) -> f64 {
    if content.is_empty() {
        return 0.0;
    }

    let content_lower = content.to_lowercase();
    let total_words = content.split_whitespace().count();

    let mut score = content_lower.matches(query).count() as f64 * 10.0;

    for word in query.split_whitespace() {
        if word.len() > 2 {
            score += content_lower.matches(word).count() as f64 * 2.0;
        }
    }

    if total_words > 0 {
        score /= total_words as f64 / 100.0;
    }

    score
}

/// Split markdown content into header-delimited sections
fn extract_sections(content: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current = Section {
        header: String::new(),
        content: String::new(),
    };

    for line in content.lines() {
        if line.starts_with('#') {
            if !current.content.trim().is_empty() {
                sections.push(current);
            }
            current = Section {
                header: line.trim().to_string(),
                content: String::new(),
            };
        } else {
            current.content.push_str(line);
            current.content.push('\n');
        }
    }

    if !current.content.trim().is_empty() {
        sections.push(current);
    }

    sections
}

fn read_indexed_file(path: &Path) -> Option<IndexedFile> {
    if !path.is_file() {
        return None;
    }

    match std::fs::read_to_string(path) {
        Ok(content) => Some(IndexedFile {
            file_path: path.display().to_string(),
            word_count: content.split_whitespace().count(),
            sections: extract_sections(&content),
            content,
        }),
        Err(e) => {
            warn!("Failed to read {:?}, skipping: {}", path, e);
            None
        }
    }
}

fn read_json_file(path: &Path) -> Option<serde_json::Value> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Failed to parse {:?}, skipping: {}", path, e);
            None
        }
    }
}

fn read_dir_entries(dir: &Path) -> Result<Vec<std::path::PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| SatkbError::Io {
            source: e,
            context: format!("Failed to read directory: {:?}", dir),
        })?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    Ok(entries)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
