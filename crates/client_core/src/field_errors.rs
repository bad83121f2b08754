//! Maps server-reported validation errors onto form controls.

use std::collections::BTreeMap;

use tracing::debug;

use crate::form::FormDescriptor;

pub struct FieldErrorPresenter;

impl FieldErrorPresenter {
    /// Applies `errors` after a full reset, so no stale marker survives a
    /// repeat submission. Entries naming no control are dropped.
    pub fn present(form: &mut FormDescriptor, errors: &BTreeMap<String, String>) {
        Self::clear(form);
        for (field, message) in errors {
            match form.control_mut(field) {
                Some(control) => {
                    control.invalid = true;
                    control.error = Some(message.clone());
                }
                None => {
                    debug!(form = %form.id, field = %field, "dropping error for unknown control");
                }
            }
        }
    }

    pub fn clear(form: &mut FormDescriptor) {
        for control in &mut form.controls {
            control.invalid = false;
            control.error = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use shared::domain::HttpMethod;

    use super::*;

    fn form() -> FormDescriptor {
        FormDescriptor::new("signup", "/signup/", HttpMethod::Post)
            .background_eligible()
            .with_text_field("email", "bad-address")
            .with_text_field("phone", "0712345678")
    }

    fn errors(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(field, message)| (field.to_string(), message.to_string()))
            .collect()
    }

    fn invalid_count(form: &FormDescriptor) -> usize {
        form.controls.iter().filter(|control| control.invalid).count()
    }

    #[test]
    fn empty_then_single_error_leaves_exactly_one_marker() {
        let mut form = form();
        FieldErrorPresenter::present(&mut form, &errors(&[]));
        FieldErrorPresenter::present(&mut form, &errors(&[("email", "invalid")]));

        assert_eq!(invalid_count(&form), 1);
        let email = form.control("email").expect("email control");
        assert!(email.invalid);
        assert_eq!(email.error.as_deref(), Some("invalid"));
    }

    #[test]
    fn empty_mapping_fully_resets_prior_markers() {
        let mut form = form();
        FieldErrorPresenter::present(
            &mut form,
            &errors(&[("email", "invalid"), ("phone", "too short")]),
        );
        assert_eq!(invalid_count(&form), 2);

        FieldErrorPresenter::present(&mut form, &errors(&[]));
        assert_eq!(invalid_count(&form), 0);
        assert!(form.controls.iter().all(|control| control.error.is_none()));
    }

    #[test]
    fn presenting_twice_is_idempotent() {
        let mut form = form();
        let mapping = errors(&[("email", "invalid")]);
        FieldErrorPresenter::present(&mut form, &mapping);
        let first = form.clone();
        FieldErrorPresenter::present(&mut form, &mapping);

        assert_eq!(form.controls, first.controls);
    }

    #[test]
    fn unknown_field_is_silently_dropped() {
        let mut form = form();
        FieldErrorPresenter::present(&mut form, &errors(&[("nonexistent", "nope")]));
        assert_eq!(invalid_count(&form), 0);
    }
}
