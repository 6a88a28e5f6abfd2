//! Create forms for projects and tasks, edited inside the terminal.

use serde_json::{Map, Value};

use crate::projects::ProjectInput;
use crate::record::RecordId;
use crate::tasks::TaskInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Project,
    Task { project: RecordId },
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub key: &'static str,
    pub value: String,
    pub required: bool,
    pub hint: &'static str,
}

impl FormField {
    fn new(label: &'static str, key: &'static str) -> Self {
        Self {
            label,
            key,
            value: String::new(),
            required: false,
            hint: "",
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn default_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    fn hint(mut self, hint: &'static str) -> Self {
        self.hint = hint;
        self
    }
}

#[derive(Debug)]
pub enum Submission {
    Project(ProjectInput),
    Task(TaskInput),
}

#[derive(Debug, Clone)]
pub struct Form {
    pub kind: FormKind,
    pub fields: Vec<FormField>,
    pub focused: usize,
    pub error: Option<String>,
}

impl Form {
    /// Project form. Keys are the short names the project pages always used.
    pub fn project() -> Self {
        Self {
            kind: FormKind::Project,
            fields: vec![
                FormField::new("Name", "name").required(),
                FormField::new("Description", "description"),
                FormField::new("Status", "status")
                    .default_value("planning")
                    .hint("planning | active | on-hold | completed"),
                FormField::new("Start date", "startDate").hint("YYYY-MM-DD"),
                FormField::new("Due date", "dueDate").hint("YYYY-MM-DD"),
            ],
            focused: 0,
            error: None,
        }
    }

    /// Task form for `project`, keyed by the record service's column names.
    pub fn task(project: RecordId) -> Self {
        Self {
            kind: FormKind::Task { project },
            fields: vec![
                FormField::new("Title", "Title_c").required(),
                FormField::new("Description", "Description_c"),
                FormField::new("Status", "Status_c")
                    .default_value("todo")
                    .hint("todo | in-progress | done"),
                FormField::new("Priority", "Priority_c")
                    .default_value("medium")
                    .hint("low | medium | high"),
                FormField::new("Assignee id", "Assigned_To_c").hint("blank for unassigned"),
                FormField::new("Due date", "Due_Date_c").hint("YYYY-MM-DD"),
            ],
            focused: 0,
            error: None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.kind {
            FormKind::Project => "New project",
            FormKind::Task { .. } => "New task",
        }
    }

    pub fn focus_next(&mut self) {
        self.focused = (self.focused + 1) % self.fields.len();
    }

    pub fn focus_prev(&mut self) {
        self.focused = (self.focused + self.fields.len() - 1) % self.fields.len();
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focused) {
            field.value.push(c);
        }
        self.error = None;
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focused) {
            field.value.pop();
        }
    }

    pub fn set(&mut self, key: &str, value: &str) {
        if let Some(field) = self.fields.iter_mut().find(|f| f.key == key) {
            field.value = value.to_string();
        }
    }

    /// The form as an input payload. Blank optional fields are left out,
    /// except a blank assignee which explicitly clears the assignment.
    pub fn to_json(&self) -> Value {
        let mut payload = Map::new();
        for field in &self.fields {
            let value = field.value.trim();
            if value.is_empty() {
                if field.key == "Assigned_To_c" {
                    payload.insert(field.key.to_string(), Value::Null);
                }
                continue;
            }
            payload.insert(field.key.to_string(), Value::String(value.to_string()));
        }
        if let FormKind::Task { project } = self.kind {
            payload.insert("project_c".to_string(), Value::from(project.get()));
        }
        Value::Object(payload)
    }

    pub fn validate(&self) -> Result<(), String> {
        match self
            .fields
            .iter()
            .find(|f| f.required && f.value.trim().is_empty())
        {
            Some(field) => Err(format!("{} is required", field.label)),
            None => Ok(()),
        }
    }

    /// Validates and normalizes the form into a service input.
    pub fn submission(&self) -> Result<Submission, String> {
        self.validate()?;
        let json = self.to_json();
        let submission = match self.kind {
            FormKind::Project => ProjectInput::from_json(&json).map(Submission::Project),
            FormKind::Task { .. } => TaskInput::from_json(&json).map(Submission::Task),
        };
        submission.map_err(|err| format!("Invalid input: {err}"))
    }
}
