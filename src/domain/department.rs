use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use serde::{Deserialize, Serialize};

use crate::domain::{
    code::{CourseCode, CourseNumber},
    config::RegistrarConfig,
    course::Course,
    identity::PersonId,
    person::{Instructor, RosterError},
};

/// The level a course is classified at within a department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Courses below the graduate threshold.
    Undergraduate,
    /// Courses at or above the graduate threshold.
    Graduate,
    /// Courses below the undergraduate floor (continuing education,
    /// certificates and the like).
    NonDegree,
}

impl Level {
    /// Every level, in catalog order.
    pub const ALL: [Self; 3] = [Self::Undergraduate, Self::Graduate, Self::NonDegree];
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::Undergraduate => "Undergraduate",
            Self::Graduate => "Graduate",
            Self::NonDegree => "Non-Degree",
        };
        write!(f, "{s}")
    }
}

/// Thresholds that map a course number to a [`Level`].
///
/// Numbers at or above `graduate_min` are graduate courses; numbers at or
/// above `undergraduate_min` (but below `graduate_min`) are undergraduate;
/// anything below the floor is non-degree. The defaults (100/500) classify
/// every recognised course number as undergraduate or graduate; lifting
/// `undergraduate_min` makes the non-degree bucket reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelPolicy {
    /// The lowest course number classified as undergraduate.
    #[serde(default = "default_undergraduate_min")]
    pub undergraduate_min: u16,

    /// The lowest course number classified as graduate.
    #[serde(default = "default_graduate_min")]
    pub graduate_min: u16,
}

impl Default for LevelPolicy {
    fn default() -> Self {
        Self {
            undergraduate_min: default_undergraduate_min(),
            graduate_min: default_graduate_min(),
        }
    }
}

impl LevelPolicy {
    /// Classifies a course number.
    #[must_use]
    pub const fn classify(self, number: CourseNumber) -> Level {
        let n = number.get();
        if n >= self.graduate_min {
            Level::Graduate
        } else if n >= self.undergraduate_min {
            Level::Undergraduate
        } else {
            Level::NonDegree
        }
    }
}

const fn default_undergraduate_min() -> u16 {
    100
}

const fn default_graduate_min() -> u16 {
    500
}

/// Errors that can occur when wiring an instructor to a section through a
/// department.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AssignError {
    /// No instructor with the given id is on the department's roster.
    #[error("No instructor with id {0} in this department")]
    InstructorNotFound(PersonId),

    /// No section with the given course code and session exists in the
    /// department.
    #[error("No section {course}/{session} in this department")]
    SectionNotFound {
        /// The course code that was looked up.
        course: CourseCode,
        /// The session label that was looked up.
        session: String,
    },

    /// The instructor's roster rejected the assignment.
    #[error(transparent)]
    Roster(#[from] RosterError),
}

/// A department of the school.
///
/// Owns its courses, classifies each into exactly one level bucket when it
/// is added, and keeps the instructor roster. There is no removal or
/// re-classification: once a course is in a bucket, it stays there.
#[derive(Debug)]
pub struct Department {
    name: String,
    config: RegistrarConfig,
    courses: Vec<Course>,
    levels: BTreeMap<Level, BTreeSet<CourseCode>>,
    instructors: Vec<Instructor>,
}

impl Department {
    /// Creates a department with the default configuration.
    #[must_use]
    pub fn new(name: String) -> Self {
        Self::with_config(name, RegistrarConfig::default())
    }

    /// Creates a department with an explicit configuration.
    #[must_use]
    pub fn with_config(name: String, config: RegistrarConfig) -> Self {
        let levels = Level::ALL
            .into_iter()
            .map(|level| (level, BTreeSet::new()))
            .collect();
        Self {
            name,
            config,
            courses: Vec::new(),
            levels,
            instructors: Vec::new(),
        }
    }

    /// The department's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The configuration in force for this department.
    #[must_use]
    pub const fn config(&self) -> &RegistrarConfig {
        &self.config
    }

    /// Adds a course, classifying it into exactly one level bucket and
    /// stamping its department label.
    ///
    /// A course whose code is already classified is a no-op: the incoming
    /// course is discarded and `false` is returned. Returns `true` when
    /// the course was added.
    pub fn add_course(&mut self, mut course: Course) -> bool {
        if self.levels.values().any(|codes| codes.contains(course.code())) {
            tracing::debug!("Course {} already classified, ignoring", course.code());
            return false;
        }

        let level = self.config.levels().classify(course.code().number());
        course.set_department(self.name.clone());
        self.levels
            .entry(level)
            .or_default()
            .insert(course.code().clone());
        tracing::info!("Added course {} to {} ({level})", course.code(), self.name);
        self.courses.push(course);
        true
    }

    /// The department's courses, in the order they were added.
    #[must_use]
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    /// Looks up a course by code.
    #[must_use]
    pub fn course(&self, code: &CourseCode) -> Option<&Course> {
        self.courses.iter().find(|c| c.code() == code)
    }

    /// Looks up a course by code, mutably.
    pub fn course_mut(&mut self, code: &CourseCode) -> Option<&mut Course> {
        self.courses.iter_mut().find(|c| c.code() == code)
    }

    /// The level bucket a course was classified into, if it is in this
    /// department.
    #[must_use]
    pub fn level_of(&self, code: &CourseCode) -> Option<Level> {
        self.levels
            .iter()
            .find(|(_, codes)| codes.contains(code))
            .map(|(&level, _)| level)
    }

    /// The course codes classified at the given level, in code order.
    pub fn courses_at_level(&self, level: Level) -> impl Iterator<Item = &CourseCode> {
        self.levels.get(&level).into_iter().flatten()
    }

    /// Adds an instructor to the department's roster.
    pub fn hire(&mut self, instructor: Instructor) {
        tracing::info!("Hired {} into {}", instructor, self.name);
        self.instructors.push(instructor);
    }

    /// The department's instructors, in hiring order.
    #[must_use]
    pub fn instructors(&self) -> &[Instructor] {
        &self.instructors
    }

    /// Looks up an instructor by id.
    #[must_use]
    pub fn instructor(&self, id: &PersonId) -> Option<&Instructor> {
        self.instructors.iter().find(|i| i.id() == id)
    }

    /// Assigns a section of one of this department's courses to one of its
    /// instructors, setting the reciprocal reference on the section.
    ///
    /// # Errors
    ///
    /// Returns [`AssignError::InstructorNotFound`] or
    /// [`AssignError::SectionNotFound`] when either party is unknown, and
    /// [`AssignError::Roster`] when the instructor's roster rejects the
    /// assignment (duplicate, or at its limit).
    pub fn assign_instructor(
        &mut self,
        instructor: &PersonId,
        course: &CourseCode,
        session: &str,
    ) -> Result<(), AssignError> {
        let Some(instructor) = self.instructors.iter_mut().find(|i| i.id() == instructor) else {
            return Err(AssignError::InstructorNotFound(instructor.clone()));
        };
        let section = self
            .courses
            .iter_mut()
            .find(|c| c.code() == course)
            .and_then(|c| c.section_mut(session))
            .ok_or_else(|| AssignError::SectionNotFound {
                course: course.clone(),
                session: session.to_string(),
            })?;

        instructor.assign(section)?;
        Ok(())
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} department", self.name)
    }
}
