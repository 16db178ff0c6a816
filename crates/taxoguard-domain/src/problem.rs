//! Problems: the check-agnostic unit every pass reports before it becomes a `Finding`.

use serde_json::Value;
use taxoguard_types::{DocumentPath, Location, SubjectKind};

#[derive(Clone, Debug, PartialEq)]
pub struct Problem {
    pub check_id: String,
    pub code: &'static str,
    pub message: String,
    /// Entity the problem is about; `None` for taxonomy-wide problems.
    pub subject: Option<Location>,
    pub help: Option<&'static str>,
    pub data: Value,
}

impl Problem {
    pub fn new(check_id: impl Into<String>, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            check_id: check_id.into(),
            code,
            message: message.into(),
            subject: None,
            help: None,
            data: Value::Null,
        }
    }

    pub fn about(mut self, kind: SubjectKind, id: &str) -> Self {
        self.subject = Some(Location {
            kind,
            id: id.to_string(),
            parent: None,
            path: None,
        });
        self
    }

    /// Scope the subject to one parent relationship.
    pub fn under(mut self, parent: Option<&str>) -> Self {
        if let Some(subject) = self.subject.as_mut() {
            subject.parent = parent.map(str::to_string);
        }
        self
    }

    /// Pin the document the subject came from.
    pub fn at(mut self, path: Option<DocumentPath>) -> Self {
        if let Some(subject) = self.subject.as_mut() {
            subject.path = path;
        }
        self
    }

    pub fn help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }

    pub fn data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    pub fn subject_id(&self) -> Option<&str> {
        self.subject.as_ref().map(|s| s.id.as_str())
    }
}
