//! Edit dialog state: the flat form copy of one user, per-field validation
//! errors and input focus.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{User, UserFormData};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FormField {
    Name,
    Email,
    City,
}

impl FormField {
    pub const ALL: [FormField; 3] = [FormField::Name, FormField::Email, FormField::City];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::Email => "Email",
            FormField::City => "City",
        }
    }

    pub fn next(self) -> Self {
        match self {
            FormField::Name => FormField::Email,
            FormField::Email => FormField::City,
            FormField::City => FormField::Name,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FormField::Name => FormField::City,
            FormField::Email => FormField::Name,
            FormField::City => FormField::Email,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub name: Option<String>,
    pub email: Option<String>,
    pub city: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.city.is_none()
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        match field {
            FormField::Name => self.name.as_deref(),
            FormField::Email => self.email.as_deref(),
            FormField::City => self.city.as_deref(),
        }
    }

    fn clear(&mut self, field: FormField) {
        match field {
            FormField::Name => self.name = None,
            FormField::Email => self.email = None,
            FormField::City => self.city = None,
        }
    }
}

/// Validate a form copy. Empty result means it can be saved.
pub fn validate(data: &UserFormData) -> FieldErrors {
    let mut errors = FieldErrors::default();
    if data.name.trim().is_empty() {
        errors.name = Some("Name is required".to_string());
    }
    if data.email.trim().is_empty() {
        errors.email = Some("Email is required".to_string());
    } else if !is_valid_email(&data.email) {
        errors.email = Some("Invalid email format".to_string());
    }
    if data.city.trim().is_empty() {
        errors.city = Some("City is required".to_string());
    }
    errors
}

/// An open edit dialog bound to one user.
#[derive(Clone, Debug)]
pub struct EditForm {
    pub user_id: u64,
    pub data: UserFormData,
    pub errors: FieldErrors,
    pub focus: FormField,
}

impl EditForm {
    pub fn open(user: &User) -> Self {
        Self {
            user_id: user.id,
            data: UserFormData::from_user(user),
            errors: FieldErrors::default(),
            focus: FormField::Name,
        }
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.data.name,
            FormField::Email => &self.data.email,
            FormField::City => &self.data.city,
        }
    }

    fn value_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.data.name,
            FormField::Email => &mut self.data.email,
            FormField::City => &mut self.data.city,
        }
    }

    /// Replace a field's text; clears only that field's error.
    pub fn set_value(&mut self, field: FormField, value: impl Into<String>) {
        *self.value_mut(field) = value.into();
        self.errors.clear(field);
    }

    pub fn insert_char(&mut self, c: char) {
        let field = self.focus;
        self.value_mut(field).push(c);
        self.errors.clear(field);
    }

    pub fn backspace(&mut self) {
        let field = self.focus;
        self.value_mut(field).pop();
        self.errors.clear(field);
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Validate; on success hand back what the store needs to apply the edit.
    pub fn submit(&mut self) -> Option<(u64, UserFormData)> {
        self.errors = validate(&self.data);
        if self.errors.is_empty() {
            Some((self.user_id, self.data.clone()))
        } else {
            None
        }
    }
}
