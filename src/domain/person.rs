use std::fmt;

use chrono::{NaiveDate, Utc};
use non_empty_string::NonEmptyString;

use crate::domain::{
    identity::{IdAllocator, PersonId},
    section::{Section, SectionId},
};

/// The gender recorded for a person.
///
/// Constructors take an `Option<Gender>`; anything not explicitly supplied
/// is recorded as [`Gender::Other`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
    /// Any other or unspecified gender.
    #[default]
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        };
        write!(f, "{s}")
    }
}

/// Errors that can occur when constructing or mutating a person.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PersonError {
    /// A name field was empty.
    #[error("{field} name must not be empty")]
    EmptyName {
        /// Which name field was empty (`"first"` or `"last"`).
        field: &'static str,
    },

    /// The date of birth is not strictly before today.
    #[error("Date of birth {0} must be strictly before today")]
    DobNotInPast(NaiveDate),
}

/// Identity fields shared by students and instructors.
///
/// Construction fails fast on an empty name or a date of birth that is not
/// strictly in the past; no half-built person is ever observable. The id is
/// issued by the [`IdAllocator`] passed at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    first_name: NonEmptyString,
    last_name: NonEmptyString,
    dob: NaiveDate,
    gender: Gender,
    id: PersonId,
}

impl Person {
    /// Creates a new person and allocates them a unique id.
    ///
    /// # Errors
    ///
    /// Returns [`PersonError`] if either name is empty, or if `dob` is not
    /// strictly before today.
    pub fn new(
        first_name: &str,
        last_name: &str,
        dob: NaiveDate,
        gender: Option<Gender>,
        ids: &mut IdAllocator,
    ) -> Result<Self, PersonError> {
        let first = NonEmptyString::new(first_name.to_string())
            .map_err(|_| PersonError::EmptyName { field: "first" })?;
        let last = NonEmptyString::new(last_name.to_string())
            .map_err(|_| PersonError::EmptyName { field: "last" })?;
        check_dob(dob)?;

        let id = ids.allocate(first_name, last_name);
        Ok(Self {
            first_name: first,
            last_name: last,
            dob,
            gender: gender.unwrap_or_default(),
            id,
        })
    }

    /// The person's first name.
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.first_name.as_str()
    }

    /// The person's last name.
    #[must_use]
    pub fn last_name(&self) -> &str {
        self.last_name.as_str()
    }

    /// The person's date of birth.
    #[must_use]
    pub const fn dob(&self) -> NaiveDate {
        self.dob
    }

    /// The person's recorded gender.
    #[must_use]
    pub const fn gender(&self) -> Gender {
        self.gender
    }

    /// The person's unique id.
    ///
    /// Ids are stable for the lifetime of the person; renaming does not
    /// re-derive the id.
    #[must_use]
    pub const fn id(&self) -> &PersonId {
        &self.id
    }

    /// Sets the first name.
    ///
    /// # Errors
    ///
    /// Returns [`PersonError::EmptyName`] if the name is empty.
    pub fn set_first_name(&mut self, first_name: &str) -> Result<(), PersonError> {
        self.first_name = NonEmptyString::new(first_name.to_string())
            .map_err(|_| PersonError::EmptyName { field: "first" })?;
        Ok(())
    }

    /// Sets the last name.
    ///
    /// # Errors
    ///
    /// Returns [`PersonError::EmptyName`] if the name is empty.
    pub fn set_last_name(&mut self, last_name: &str) -> Result<(), PersonError> {
        self.last_name = NonEmptyString::new(last_name.to_string())
            .map_err(|_| PersonError::EmptyName { field: "last" })?;
        Ok(())
    }

    /// Sets the date of birth.
    ///
    /// # Errors
    ///
    /// Returns [`PersonError::DobNotInPast`] if `dob` is not strictly before
    /// today; the stored date is unchanged in that case.
    pub fn set_dob(&mut self, dob: NaiveDate) -> Result<(), PersonError> {
        check_dob(dob)?;
        self.dob = dob;
        Ok(())
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

fn check_dob(dob: NaiveDate) -> Result<(), PersonError> {
    if dob < Utc::now().date_naive() {
        Ok(())
    } else {
        Err(PersonError::DobNotInPast(dob))
    }
}

/// A student who can be admitted to sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    person: Person,
}

impl Student {
    /// Creates a new student.
    ///
    /// # Errors
    ///
    /// Returns [`PersonError`] if either name is empty, or if `dob` is not
    /// strictly before today.
    pub fn new(
        first_name: &str,
        last_name: &str,
        dob: NaiveDate,
        gender: Option<Gender>,
        ids: &mut IdAllocator,
    ) -> Result<Self, PersonError> {
        Ok(Self {
            person: Person::new(first_name, last_name, dob, gender, ids)?,
        })
    }

    /// The student's identity fields.
    #[must_use]
    pub const fn person(&self) -> &Person {
        &self.person
    }

    /// Mutable access to the student's identity fields.
    pub const fn person_mut(&mut self) -> &mut Person {
        &mut self.person
    }

    /// The student's unique id.
    #[must_use]
    pub const fn id(&self) -> &PersonId {
        self.person.id()
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.person)
    }
}

/// Errors that can occur when assigning a section to an instructor.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RosterError {
    /// The instructor already teaches the section.
    #[error("Instructor already teaches {section}")]
    AlreadyTeaches {
        /// The section that was assigned twice.
        section: SectionId,
    },

    /// The instructor's taught-section list is at its limit.
    #[error("Roster is full ({limit} sections)")]
    Full {
        /// The roster limit in force.
        limit: usize,
    },
}

/// Error returned by bounds-checked roster lookups.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Index {index} is out of range for a roster of {len} sections")]
pub struct IndexOutOfRange {
    /// The requested index.
    pub index: usize,
    /// The roster length at the time of the lookup.
    pub len: usize,
}

/// An instructor with a capped list of taught sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instructor {
    person: Person,
    limit: usize,
    sections: Vec<SectionId>,
}

impl Instructor {
    /// The default cap on sections taught at once.
    pub const DEFAULT_ROSTER_LIMIT: usize = 10;

    /// Creates a new instructor with the default roster limit.
    ///
    /// # Errors
    ///
    /// Returns [`PersonError`] if either name is empty, or if `dob` is not
    /// strictly before today.
    pub fn new(
        first_name: &str,
        last_name: &str,
        dob: NaiveDate,
        gender: Option<Gender>,
        ids: &mut IdAllocator,
    ) -> Result<Self, PersonError> {
        Ok(Self {
            person: Person::new(first_name, last_name, dob, gender, ids)?,
            limit: Self::DEFAULT_ROSTER_LIMIT,
            sections: Vec::new(),
        })
    }

    /// Replaces the roster limit.
    ///
    /// Sections already on the roster are unaffected, even if the new limit
    /// is below the current count; only further assignments are capped.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// The instructor's identity fields.
    #[must_use]
    pub const fn person(&self) -> &Person {
        &self.person
    }

    /// Mutable access to the instructor's identity fields.
    pub const fn person_mut(&mut self) -> &mut Person {
        &mut self.person
    }

    /// The instructor's unique id.
    #[must_use]
    pub const fn id(&self) -> &PersonId {
        self.person.id()
    }

    /// Assigns a section to this instructor and sets the reciprocal
    /// instructor reference on the section.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::AlreadyTeaches`] if the section is already on
    /// the roster, or [`RosterError::Full`] if the roster is at its limit.
    /// The section is untouched on failure.
    pub fn assign(&mut self, section: &mut Section) -> Result<(), RosterError> {
        let section_id = section.id();
        if self.teaches(&section_id) {
            return Err(RosterError::AlreadyTeaches {
                section: section_id,
            });
        }
        if self.sections.len() >= self.limit {
            return Err(RosterError::Full { limit: self.limit });
        }

        section.set_instructor(self.person.id().clone());
        tracing::debug!("{} now teaches {section_id}", self.person);
        self.sections.push(section_id);
        Ok(())
    }

    /// Whether the given section is on this instructor's roster.
    #[must_use]
    pub fn teaches(&self, section: &SectionId) -> bool {
        self.sections.contains(section)
    }

    /// The sections taught, in assignment order.
    #[must_use]
    pub fn sections(&self) -> &[SectionId] {
        &self.sections
    }

    /// The number of sections currently taught.
    #[must_use]
    pub fn sections_taught(&self) -> usize {
        self.sections.len()
    }

    /// Bounds-checked lookup of the section at `index` in assignment order.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] if `index` is past the end of the roster.
    pub fn section_at(&self, index: usize) -> Result<&SectionId, IndexOutOfRange> {
        self.sections.get(index).ok_or(IndexOutOfRange {
            index,
            len: self.sections.len(),
        })
    }
}

impl fmt::Display for Instructor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.person)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::Days;
    use non_empty_string::NonEmptyString;

    use super::*;
    use crate::domain::{CourseCode, RegistrarConfig};

    fn dob() -> NaiveDate {
        NaiveDate::from_ymd_opt(2004, 3, 21).unwrap()
    }

    fn section(session: &str) -> Section {
        Section::new(
            CourseCode::from_str("CMPS-433").unwrap(),
            NonEmptyString::new(session.to_string()).unwrap(),
        )
    }

    #[test]
    fn person_construction_validates_names() {
        let mut ids = IdAllocator::new();
        let error = Person::new("", "Joe", dob(), None, &mut ids).unwrap_err();
        assert_eq!(error, PersonError::EmptyName { field: "first" });

        let error = Person::new("Michael", "", dob(), None, &mut ids).unwrap_err();
        assert_eq!(error, PersonError::EmptyName { field: "last" });
    }

    #[test]
    fn dob_must_be_strictly_in_the_past() {
        let mut ids = IdAllocator::new();
        let today = Utc::now().date_naive();

        let error = Person::new("Michael", "Joe", today, None, &mut ids).unwrap_err();
        assert_eq!(error, PersonError::DobNotInPast(today));

        let tomorrow = today.checked_add_days(Days::new(1)).unwrap();
        assert!(Person::new("Michael", "Joe", tomorrow, None, &mut ids).is_err());

        let yesterday = today.checked_sub_days(Days::new(1)).unwrap();
        assert!(Person::new("Michael", "Joe", yesterday, None, &mut ids).is_ok());
    }

    #[test]
    fn gender_defaults_to_other() {
        let mut ids = IdAllocator::new();
        let person = Person::new("Michael", "Joe", dob(), None, &mut ids).unwrap();
        assert_eq!(person.gender(), Gender::Other);

        let person = Person::new("Ada", "Lovelace", dob(), Some(Gender::Female), &mut ids).unwrap();
        assert_eq!(person.gender(), Gender::Female);
    }

    #[test]
    fn renaming_keeps_the_id() {
        let mut ids = IdAllocator::new();
        let mut person = Person::new("Michael", "Joe", dob(), None, &mut ids).unwrap();
        let id = person.id().clone();

        person.set_first_name("Mike").unwrap();
        person.set_last_name("Doe").unwrap();
        assert_eq!(person.first_name(), "Mike");
        assert_eq!(person.last_name(), "Doe");
        assert_eq!(person.id(), &id);

        assert!(person.set_first_name("").is_err());
        assert_eq!(person.first_name(), "Mike");
    }

    #[test]
    fn set_dob_rejects_future_and_keeps_old_value() {
        let mut ids = IdAllocator::new();
        let mut person = Person::new("Michael", "Joe", dob(), None, &mut ids).unwrap();

        let tomorrow = Utc::now()
            .date_naive()
            .checked_add_days(Days::new(1))
            .unwrap();
        assert!(person.set_dob(tomorrow).is_err());
        assert_eq!(person.dob(), dob());

        let earlier = NaiveDate::from_ymd_opt(1999, 1, 1).unwrap();
        person.set_dob(earlier).unwrap();
        assert_eq!(person.dob(), earlier);
    }

    #[test]
    fn assign_sets_reciprocal_reference() {
        let mut ids = IdAllocator::new();
        let mut instructor = Instructor::new("Grace", "Hopper", dob(), None, &mut ids).unwrap();
        let mut section = section("CAS");

        instructor.assign(&mut section).unwrap();

        assert!(section.has_teacher());
        assert_eq!(section.instructor(), Some(instructor.id()));
        assert!(instructor.teaches(&section.id()));
        assert_eq!(instructor.sections_taught(), 1);
    }

    #[test]
    fn duplicate_assignment_is_rejected() {
        let mut ids = IdAllocator::new();
        let mut instructor = Instructor::new("Grace", "Hopper", dob(), None, &mut ids).unwrap();
        let mut section = section("CAS");

        instructor.assign(&mut section).unwrap();
        let error = instructor.assign(&mut section).unwrap_err();

        assert_eq!(
            error,
            RosterError::AlreadyTeaches {
                section: section.id()
            }
        );
        assert_eq!(instructor.sections_taught(), 1);
    }

    #[test]
    fn full_roster_rejects_further_assignments() {
        let mut ids = IdAllocator::new();
        let mut instructor = Instructor::new("Grace", "Hopper", dob(), None, &mut ids)
            .unwrap()
            .with_limit(2);

        let mut first = section("A1");
        let mut second = section("A2");
        let mut third = section("A3");

        instructor.assign(&mut first).unwrap();
        instructor.assign(&mut second).unwrap();
        let error = instructor.assign(&mut third).unwrap_err();

        assert_eq!(error, RosterError::Full { limit: 2 });
        assert!(!third.has_teacher());
        assert_eq!(instructor.sections_taught(), 2);
    }

    #[test]
    fn roster_limit_can_come_from_config() {
        let mut ids = IdAllocator::new();
        let mut config = RegistrarConfig::default();
        config.set_roster_limit(1);

        let mut instructor = Instructor::new("Grace", "Hopper", dob(), None, &mut ids)
            .unwrap()
            .with_limit(config.roster_limit());

        let mut first = section("A1");
        let mut second = section("A2");
        instructor.assign(&mut first).unwrap();
        assert_eq!(
            instructor.assign(&mut second).unwrap_err(),
            RosterError::Full { limit: 1 }
        );
    }

    #[test]
    fn section_at_is_bounds_checked() {
        let mut ids = IdAllocator::new();
        let mut instructor = Instructor::new("Grace", "Hopper", dob(), None, &mut ids).unwrap();
        let mut section = section("CAS");
        instructor.assign(&mut section).unwrap();

        assert_eq!(instructor.section_at(0).unwrap(), &section.id());
        assert_eq!(
            instructor.section_at(1).unwrap_err(),
            IndexOutOfRange { index: 1, len: 1 }
        );
    }
}
