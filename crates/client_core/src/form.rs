//! Surface model for a submittable form: named controls, the submit
//! trigger, and the per-form submission state machine.

use shared::domain::{FormId, HttpMethod};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttachment {
    pub filename: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    File(FileAttachment),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormControl {
    pub name: String,
    pub value: Option<FieldValue>,
    pub invalid: bool,
    pub error: Option<String>,
}

impl FormControl {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(FieldValue::Text(value.into())),
            invalid: false,
            error: None,
        }
    }

    pub fn file(name: impl Into<String>, attachment: FileAttachment) -> Self {
        Self {
            name: name.into(),
            value: Some(FieldValue::File(attachment)),
            invalid: false,
            error: None,
        }
    }

    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            invalid: false,
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitControl {
    pub label: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Idle,
    InFlight,
}

#[derive(Debug, Clone)]
pub struct FormDescriptor {
    pub id: FormId,
    pub action: String,
    pub method: HttpMethod,
    background_eligible: bool,
    persistent: bool,
    pub controls: Vec<FormControl>,
    pub submit: SubmitControl,
    phase: FormPhase,
}

impl FormDescriptor {
    pub fn new(id: impl Into<String>, action: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            id: FormId::new(id),
            action: action.into(),
            method,
            background_eligible: false,
            persistent: false,
            controls: Vec::new(),
            submit: SubmitControl {
                label: "Save".to_string(),
                enabled: true,
            },
            phase: FormPhase::Idle,
        }
    }

    /// Explicit opt-in marker for background submission.
    pub fn background_eligible(mut self) -> Self {
        self.background_eligible = true;
        self
    }

    /// Persistent forms keep their values after a successful submission.
    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }

    pub fn with_submit_label(mut self, label: impl Into<String>) -> Self {
        self.submit.label = label.into();
        self
    }

    pub fn with_text_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.controls.push(FormControl::text(name, value));
        self
    }

    pub fn with_file_field(mut self, name: impl Into<String>, attachment: FileAttachment) -> Self {
        self.controls.push(FormControl::file(name, attachment));
        self
    }

    pub fn with_empty_field(mut self, name: impl Into<String>) -> Self {
        self.controls.push(FormControl::empty(name));
        self
    }

    pub fn is_background_eligible(&self) -> bool {
        self.background_eligible
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn control(&self, name: &str) -> Option<&FormControl> {
        self.controls.iter().find(|control| control.name == name)
    }

    pub fn control_mut(&mut self, name: &str) -> Option<&mut FormControl> {
        self.controls.iter_mut().find(|control| control.name == name)
    }

    pub fn set_value(&mut self, name: &str, value: FieldValue) -> bool {
        match self.control_mut(name) {
            Some(control) => {
                control.value = Some(value);
                true
            }
            None => false,
        }
    }

    /// Guarded `Idle -> InFlight` transition; false when a submission is
    /// already outstanding.
    pub(crate) fn try_begin_submission(&mut self) -> bool {
        if self.phase == FormPhase::InFlight {
            return false;
        }
        self.phase = FormPhase::InFlight;
        true
    }

    pub(crate) fn finish_submission(&mut self) {
        self.phase = FormPhase::Idle;
    }

    pub fn clear_values(&mut self) {
        for control in &mut self.controls {
            control.value = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> FormDescriptor {
        FormDescriptor::new("customer-create", "/customers/create/", HttpMethod::Post)
            .background_eligible()
            .with_text_field("name", "Wanjiku")
            .with_empty_field("notes")
    }

    #[test]
    fn begin_submission_is_guarded() {
        let mut form = form();
        assert_eq!(form.phase(), FormPhase::Idle);
        assert!(form.try_begin_submission());
        assert_eq!(form.phase(), FormPhase::InFlight);
        assert!(!form.try_begin_submission());
        form.finish_submission();
        assert!(form.try_begin_submission());
    }

    #[test]
    fn clear_values_empties_every_control() {
        let mut form = form();
        form.clear_values();
        assert!(form.controls.iter().all(|control| control.value.is_none()));
    }

    #[test]
    fn set_value_targets_named_control_only() {
        let mut form = form();
        assert!(form.set_value("notes", FieldValue::Text("follow up".into())));
        assert!(!form.set_value("missing", FieldValue::Text("x".into())));
        assert_eq!(
            form.control("notes").and_then(|control| control.value.clone()),
            Some(FieldValue::Text("follow up".into()))
        );
    }
}
