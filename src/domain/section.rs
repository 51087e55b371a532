//! The bounded-capacity enrollment registry.
//!
//! A [`Section`] is one offering of a course: a fixed number of seats, a
//! FIFO waitlist for the overflow, and an optional instructor. Admission
//! and withdrawal are the only ways seats change hands, and every freed
//! seat is refilled from the head of the waitlist before anything else
//! happens.

use std::{collections::VecDeque, fmt, num::NonZeroUsize};

use non_empty_string::NonEmptyString;

use crate::domain::{
    code::CourseCode, config::RegistrarConfig, identity::PersonId, person::Student,
};

/// Identifies a section: the owning course's code plus the session label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SectionId {
    course: CourseCode,
    session: NonEmptyString,
}

impl SectionId {
    /// The code of the course this section belongs to.
    #[must_use]
    pub const fn course(&self) -> &CourseCode {
        &self.course
    }

    /// The session label.
    #[must_use]
    pub fn session(&self) -> &str {
        self.session.as_str()
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.course, self.session)
    }
}

/// Where a successful admission placed the student.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The student was seated directly.
    Seated,
    /// The seats were full; the student joined the waitlist.
    Waitlisted,
}

/// The outcome of a withdrawal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Withdrawal {
    /// The student was seated and has been removed.
    Removed {
        /// The waitlisted student promoted into the freed seat, if any.
        promoted: Option<PersonId>,
    },
    /// The student did not occupy a seat; nothing changed.
    NotSeated,
}

/// Errors that can occur when admitting a student.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EnrollError {
    /// Both the seats and the waitlist are full; the student was admitted
    /// nowhere.
    #[error("Section {section} is full and so is its waitlist")]
    CapacityExceeded {
        /// The section that rejected the admission.
        section: SectionId,
    },
}

/// One offering of a course, with its own seats and waitlist.
///
/// Seats hold students in admission order; the waitlist is strictly FIFO,
/// so the longest-waiting student is always promoted first. Capacities are
/// fixed at construction. A section must have at least one seat; a
/// waitlist capacity of zero means overflow admissions fail outright.
///
/// Every mutating operation takes `&mut self`, which makes admission and
/// withdrawal on one section mutually exclusive by construction. Sections
/// are independent of each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    course: CourseCode,
    session: NonEmptyString,
    capacity: NonZeroUsize,
    waitlist_capacity: usize,
    seats: Vec<PersonId>,
    waitlist: VecDeque<PersonId>,
    instructor: Option<PersonId>,
}

impl Section {
    /// The default seat capacity.
    pub const DEFAULT_CAPACITY: NonZeroUsize = NonZeroUsize::new(30).unwrap();

    /// The default waitlist capacity.
    pub const DEFAULT_WAITLIST_CAPACITY: usize = 30;

    /// Creates a section with the default capacities.
    ///
    /// `course` is the back-reference to the owning course; it is fixed for
    /// the lifetime of the section.
    #[must_use]
    pub fn new(course: CourseCode, session: NonEmptyString) -> Self {
        Self::with_capacity(
            course,
            session,
            Self::DEFAULT_CAPACITY,
            Self::DEFAULT_WAITLIST_CAPACITY,
        )
    }

    /// Creates a section with explicit seat and waitlist capacities.
    #[must_use]
    pub fn with_capacity(
        course: CourseCode,
        session: NonEmptyString,
        capacity: NonZeroUsize,
        waitlist_capacity: usize,
    ) -> Self {
        Self {
            course,
            session,
            capacity,
            waitlist_capacity,
            seats: Vec::with_capacity(capacity.get()),
            waitlist: VecDeque::new(),
            instructor: None,
        }
    }

    /// Creates a section with the capacities from `config`.
    #[must_use]
    pub fn configured(
        course: CourseCode,
        session: NonEmptyString,
        config: &RegistrarConfig,
    ) -> Self {
        Self::with_capacity(
            course,
            session,
            config.section_capacity(),
            config.waitlist_capacity(),
        )
    }

    /// This section's identity.
    #[must_use]
    pub fn id(&self) -> SectionId {
        SectionId {
            course: self.course.clone(),
            session: self.session.clone(),
        }
    }

    /// The code of the course this section belongs to.
    #[must_use]
    pub const fn course(&self) -> &CourseCode {
        &self.course
    }

    /// The session label.
    #[must_use]
    pub fn session(&self) -> &str {
        self.session.as_str()
    }

    /// The seat capacity.
    #[must_use]
    pub const fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    /// The waitlist capacity.
    #[must_use]
    pub const fn waitlist_capacity(&self) -> usize {
        self.waitlist_capacity
    }

    /// Admits a student: seats them if a seat is free, waitlists them
    /// otherwise.
    ///
    /// Before the incoming student is considered, any free seats are
    /// refilled from the head of the waitlist, so a section never reports
    /// "seats full" while promotions are pending.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollError::CapacityExceeded`] when both the seats and
    /// the waitlist are full. The student is admitted nowhere in that case.
    pub fn admit(&mut self, student: &Student) -> Result<Placement, EnrollError> {
        self.promote_waiting();

        if self.seats.len() < self.capacity.get() {
            tracing::debug!("Seated {student} in {}/{}", self.course, self.session);
            self.seats.push(student.id().clone());
            Ok(Placement::Seated)
        } else if self.waitlist.len() < self.waitlist_capacity {
            tracing::debug!("Waitlisted {student} for {}/{}", self.course, self.session);
            self.waitlist.push_back(student.id().clone());
            Ok(Placement::Waitlisted)
        } else {
            Err(EnrollError::CapacityExceeded { section: self.id() })
        }
    }

    /// Admits each student in turn, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first [`EnrollError::CapacityExceeded`] encountered;
    /// students before the failing one keep their placements.
    pub fn admit_all<'a>(
        &mut self,
        students: impl IntoIterator<Item = &'a Student>,
    ) -> Result<(), EnrollError> {
        for student in students {
            self.admit(student)?;
        }
        Ok(())
    }

    /// Withdraws a seated student, compacting the seat list and promoting
    /// the head of the waitlist into the freed seat.
    ///
    /// A student who does not occupy a seat (including one who is only
    /// waitlisted) leaves the section untouched: the result is
    /// [`Withdrawal::NotSeated`], not an error.
    pub fn withdraw(&mut self, student: &Student) -> Withdrawal {
        let Some(index) = self.seats.iter().position(|id| id == student.id()) else {
            return Withdrawal::NotSeated;
        };

        self.seats.remove(index);
        tracing::debug!("Withdrew {student} from {}/{}", self.course, self.session);

        let promoted = self.waitlist.pop_front();
        if let Some(id) = &promoted {
            tracing::debug!("Promoted {id} from the waitlist of {}/{}", self.course, self.session);
            self.seats.push(id.clone());
        }
        Withdrawal::Removed { promoted }
    }

    /// Withdraws each student in turn.
    pub fn withdraw_all<'a>(&mut self, students: impl IntoIterator<Item = &'a Student>) {
        for student in students {
            self.withdraw(student);
        }
    }

    /// Sets the instructor reference, replacing any previous one.
    pub fn set_instructor(&mut self, instructor: PersonId) {
        self.instructor = Some(instructor);
    }

    /// The assigned instructor's id, if any.
    #[must_use]
    pub const fn instructor(&self) -> Option<&PersonId> {
        self.instructor.as_ref()
    }

    /// Whether an instructor is assigned.
    #[must_use]
    pub const fn has_teacher(&self) -> bool {
        self.instructor.is_some()
    }

    /// The seated students, in admission order.
    #[must_use]
    pub fn seated(&self) -> &[PersonId] {
        &self.seats
    }

    /// The waitlisted students, head first.
    pub fn waitlisted(&self) -> impl Iterator<Item = &PersonId> {
        self.waitlist.iter()
    }

    /// The number of seats taken.
    #[must_use]
    pub fn seats_taken(&self) -> usize {
        self.seats.len()
    }

    /// The number of students on the waitlist.
    #[must_use]
    pub fn waitlist_len(&self) -> usize {
        self.waitlist.len()
    }

    /// The number of free seats.
    #[must_use]
    pub fn remaining_seats(&self) -> usize {
        self.capacity.get() - self.seats.len()
    }

    /// Whether the given student occupies a seat.
    #[must_use]
    pub fn is_seated(&self, id: &PersonId) -> bool {
        self.seats.contains(id)
    }

    /// Whether the given student is on the waitlist.
    #[must_use]
    pub fn is_waitlisted(&self, id: &PersonId) -> bool {
        self.waitlist.contains(id)
    }

    /// Moves waitlisted students into free seats, head of the queue first,
    /// until either the seats are full or the waitlist is empty.
    fn promote_waiting(&mut self) {
        while self.seats.len() < self.capacity.get() {
            let Some(id) = self.waitlist.pop_front() else {
                break;
            };
            tracing::debug!("Promoted {id} from the waitlist of {}/{}", self.course, self.session);
            self.seats.push(id);
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}/{}: {}/{} seated, {} waitlisted",
            self.course,
            self.session,
            self.seats.len(),
            self.capacity,
            self.waitlist.len(),
        )?;
        if self.has_teacher() {
            write!(f, ", staffed")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::NaiveDate;

    use super::*;
    use crate::domain::identity::IdAllocator;

    fn code() -> CourseCode {
        CourseCode::from_str("CMPS-433").unwrap()
    }

    fn session(s: &str) -> NonEmptyString {
        NonEmptyString::new(s.to_string()).unwrap()
    }

    fn students(count: usize, ids: &mut IdAllocator) -> Vec<Student> {
        let dob = NaiveDate::from_ymd_opt(2003, 9, 1).unwrap();
        (0..count)
            .map(|i| Student::new("Student", &format!("Number{i}"), dob, None, ids).unwrap())
            .collect()
    }

    fn small_section(capacity: usize, waitlist: usize) -> Section {
        Section::with_capacity(
            code(),
            session("CAS"),
            NonZeroUsize::new(capacity).unwrap(),
            waitlist,
        )
    }

    #[test]
    fn defaults_are_thirty_seats_and_thirty_waitlist_slots() {
        let section = Section::new(code(), session("CAS"));
        assert_eq!(section.capacity().get(), 30);
        assert_eq!(section.waitlist_capacity(), 30);
        assert_eq!(section.seats_taken(), 0);
        assert!(!section.has_teacher());
    }

    #[test]
    fn admission_fills_seats_then_waitlist() {
        let mut ids = IdAllocator::new();
        let students = students(5, &mut ids);
        let mut section = small_section(3, 2);

        for student in &students[..3] {
            assert_eq!(section.admit(student).unwrap(), Placement::Seated);
        }
        for student in &students[3..] {
            assert_eq!(section.admit(student).unwrap(), Placement::Waitlisted);
        }

        assert_eq!(section.seats_taken(), 3);
        assert_eq!(section.waitlist_len(), 2);
        assert_eq!(section.remaining_seats(), 0);
    }

    #[test]
    fn bounds_hold_for_any_admit_prefix() {
        let mut ids = IdAllocator::new();
        let all = students(10, &mut ids);
        let mut section = small_section(4, 3);

        let mut successful = 0;
        for student in &all {
            if section.admit(student).is_ok() {
                successful += 1;
            }
            assert!(section.seats_taken() <= 4);
            assert!(section.waitlist_len() <= 3);
            assert_eq!(section.seats_taken() + section.waitlist_len(), successful);
        }
        assert_eq!(successful, 7);
    }

    #[test]
    fn overfull_section_rejects_with_capacity_exceeded() {
        let mut ids = IdAllocator::new();
        let students = students(3, &mut ids);
        let mut section = small_section(1, 1);

        section.admit(&students[0]).unwrap();
        section.admit(&students[1]).unwrap();

        let error = section.admit(&students[2]).unwrap_err();
        assert_eq!(
            error,
            EnrollError::CapacityExceeded {
                section: section.id()
            }
        );
        assert!(!section.is_seated(students[2].id()));
        assert!(!section.is_waitlisted(students[2].id()));
    }

    #[test]
    fn single_seat_no_waitlist() {
        let mut ids = IdAllocator::new();
        let students = students(2, &mut ids);
        let mut section = small_section(1, 0);

        assert_eq!(section.admit(&students[0]).unwrap(), Placement::Seated);
        let error = section.admit(&students[1]).unwrap_err();
        assert!(matches!(error, EnrollError::CapacityExceeded { .. }));
    }

    #[test]
    fn fifo_promotion_on_withdrawal() {
        let mut ids = IdAllocator::new();
        let students = students(4, &mut ids);
        let [a, b, c, d] = students.as_slice() else {
            unreachable!()
        };
        let mut section = small_section(2, 2);

        section.admit(a).unwrap();
        section.admit(b).unwrap();
        assert_eq!(section.admit(c).unwrap(), Placement::Waitlisted);
        assert_eq!(section.admit(d).unwrap(), Placement::Waitlisted);

        // C waited longer than D, so C gets the freed seat.
        let outcome = section.withdraw(a);
        assert_eq!(
            outcome,
            Withdrawal::Removed {
                promoted: Some(c.id().clone())
            }
        );
        assert_eq!(section.seated(), vec![b.id().clone(), c.id().clone()]);
        assert_eq!(section.waitlisted().collect::<Vec<_>>(), vec![d.id()]);
    }

    #[test]
    fn scenario_two_seats_one_waitlist_slot() {
        let mut ids = IdAllocator::new();
        let students = students(4, &mut ids);
        let [a, b, c, d] = students.as_slice() else {
            unreachable!()
        };
        let mut section = small_section(2, 1);

        assert_eq!(section.admit(a).unwrap(), Placement::Seated);
        assert_eq!(section.admit(b).unwrap(), Placement::Seated);
        assert_eq!(section.admit(c).unwrap(), Placement::Waitlisted);

        let error = section.admit(d).unwrap_err();
        assert!(matches!(error, EnrollError::CapacityExceeded { .. }));
        assert!(!section.is_seated(d.id()));
        assert!(!section.is_waitlisted(d.id()));

        let outcome = section.withdraw(a);
        assert_eq!(
            outcome,
            Withdrawal::Removed {
                promoted: Some(c.id().clone())
            }
        );
        assert_eq!(section.seated(), vec![b.id().clone(), c.id().clone()]);
        assert_eq!(section.waitlist_len(), 0);
    }

    #[test]
    fn withdrawing_an_absent_student_is_a_no_op() {
        let mut ids = IdAllocator::new();
        let students = students(2, &mut ids);
        let mut section = small_section(2, 1);

        section.admit(&students[0]).unwrap();
        assert_eq!(section.withdraw(&students[1]), Withdrawal::NotSeated);
        assert_eq!(section.seats_taken(), 1);
    }

    #[test]
    fn withdrawing_from_an_empty_section_is_a_no_op() {
        let mut ids = IdAllocator::new();
        let students = students(1, &mut ids);
        let mut section = small_section(2, 1);

        assert_eq!(section.withdraw(&students[0]), Withdrawal::NotSeated);
        assert_eq!(section.seats_taken(), 0);
        assert_eq!(section.waitlist_len(), 0);
    }

    #[test]
    fn withdrawal_without_waitlist_promotes_nobody() {
        let mut ids = IdAllocator::new();
        let students = students(2, &mut ids);
        let mut section = small_section(2, 1);

        section.admit(&students[0]).unwrap();
        section.admit(&students[1]).unwrap();

        let outcome = section.withdraw(&students[0]);
        assert_eq!(outcome, Withdrawal::Removed { promoted: None });
        assert_eq!(section.seats_taken(), 1);
    }

    #[test]
    fn seat_order_is_admission_order() {
        let mut ids = IdAllocator::new();
        let students = students(3, &mut ids);
        let mut section = small_section(3, 1);

        section.admit_all(&students).unwrap();
        let expected: Vec<_> = students.iter().map(|s| s.id().clone()).collect();
        assert_eq!(section.seated(), expected);
    }

    #[test]
    fn admit_all_stops_at_the_first_failure() {
        let mut ids = IdAllocator::new();
        let students = students(4, &mut ids);
        let mut section = small_section(2, 1);

        let error = section.admit_all(&students).unwrap_err();
        assert!(matches!(error, EnrollError::CapacityExceeded { .. }));
        assert_eq!(section.seats_taken(), 2);
        assert_eq!(section.waitlist_len(), 1);
    }

    #[test]
    fn withdraw_all_drains_seats_and_waitlist() {
        let mut ids = IdAllocator::new();
        let students = students(3, &mut ids);
        let mut section = small_section(2, 1);

        section.admit_all(&students).unwrap();
        section.withdraw_all(&students);

        assert_eq!(section.seats_taken(), 0);
        assert_eq!(section.waitlist_len(), 0);
    }

    #[test]
    fn instructor_assignment_is_idempotent_replacement() {
        let mut ids = IdAllocator::new();
        let mut section = small_section(2, 1);
        let first = ids.allocate("Grace", "Hopper");
        let second = ids.allocate("Alan", "Turing");

        section.set_instructor(first.clone());
        assert!(section.has_teacher());
        assert_eq!(section.instructor(), Some(&first));

        section.set_instructor(second.clone());
        assert_eq!(section.instructor(), Some(&second));
    }

    #[test]
    fn display_summarises_occupancy() {
        let mut ids = IdAllocator::new();
        let students = students(3, &mut ids);
        let mut section = small_section(2, 1);
        section.admit_all(&students).unwrap();

        assert_eq!(section.to_string(), "CMPS-433/CAS: 2/2 seated, 1 waitlisted");

        section.set_instructor(ids.allocate("Grace", "Hopper"));
        assert_eq!(
            section.to_string(),
            "CMPS-433/CAS: 2/2 seated, 1 waitlisted, staffed"
        );
    }
}
