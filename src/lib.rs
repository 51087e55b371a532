//! In-memory school course catalog and enrollment ledger.
//!
//! Courses are grouped into departments and offered as sections. Each
//! [`Section`] is a bounded-capacity enrollment registry: students are
//! seated until the seats run out, overflow onto a FIFO waitlist, and are
//! promoted into freed seats in the order they started waiting.

pub mod domain;
pub use domain::{
    Course, CourseCode, Department, EnrollError, IdAllocator, Instructor, Level, Placement,
    RegistrarConfig, Section, Student, Withdrawal,
};
