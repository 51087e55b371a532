use std::{fmt, num::NonZeroUsize};

use non_empty_string::NonEmptyString;

use crate::domain::{code::CourseCode, config::RegistrarConfig, section::Section};

/// A course in the catalog.
///
/// The [`CourseCode`] is the course's identity and is immutable after
/// construction; credits and the department label can be revised later.
/// A course owns its sections in creation order, and each section carries
/// a back-reference to this course's code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    code: CourseCode,
    credits: u8,
    department: Option<String>,
    sections: Vec<Section>,
}

impl Course {
    /// Creates a course with no credits assigned yet.
    #[must_use]
    pub const fn new(code: CourseCode) -> Self {
        Self {
            code,
            credits: 0,
            department: None,
            sections: Vec::new(),
        }
    }

    /// Creates a course worth the given number of credits.
    #[must_use]
    pub const fn with_credits(code: CourseCode, credits: u8) -> Self {
        Self {
            code,
            credits,
            department: None,
            sections: Vec::new(),
        }
    }

    /// The course's identity.
    #[must_use]
    pub const fn code(&self) -> &CourseCode {
        &self.code
    }

    /// The number of credits the course is worth.
    #[must_use]
    pub const fn credits(&self) -> u8 {
        self.credits
    }

    /// Revises the number of credits.
    pub const fn set_credits(&mut self, credits: u8) {
        self.credits = credits;
    }

    /// The name of the department the course belongs to, if it has been
    /// added to one.
    #[must_use]
    pub fn department(&self) -> Option<&str> {
        self.department.as_deref()
    }

    /// Records the department the course belongs to.
    pub fn set_department(&mut self, department: String) {
        self.department = Some(department);
    }

    /// Adds a section with the default capacities and returns it for
    /// further setup.
    pub fn add_section(&mut self, session: NonEmptyString) -> &mut Section {
        self.push_section(Section::new(self.code.clone(), session))
    }

    /// Adds a section with explicit seat and waitlist capacities.
    pub fn add_section_with_capacity(
        &mut self,
        session: NonEmptyString,
        capacity: NonZeroUsize,
        waitlist_capacity: usize,
    ) -> &mut Section {
        self.push_section(Section::with_capacity(
            self.code.clone(),
            session,
            capacity,
            waitlist_capacity,
        ))
    }

    /// Adds a section with the capacities from `config`.
    pub fn add_section_configured(
        &mut self,
        session: NonEmptyString,
        config: &RegistrarConfig,
    ) -> &mut Section {
        self.push_section(Section::configured(self.code.clone(), session, config))
    }

    /// The course's sections, in creation order.
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Looks up a section by session label.
    #[must_use]
    pub fn section(&self, session: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.session() == session)
    }

    /// Looks up a section by session label, mutably.
    pub fn section_mut(&mut self, session: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.session() == session)
    }

    fn push_section(&mut self, section: Section) -> &mut Section {
        tracing::debug!("Opened section {}", section.id());
        self.sections.push(section);
        self.sections
            .last_mut()
            .expect("just pushed a section")
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({} credits)", self.code, self.credits)
    }
}
