//! Practice-session scheduling.
//!
//! Parts are assigned to rooms, time slots and instructors. Every part runs exactly
//! once, rooms and instructors are never double-booked, instructor workloads are kept
//! even, and participants belonging to several parts are spared concurrent sessions
//! in proportion to their overlap priority.
//!
//! ```no_run
//! use practice_scheduler::{Part, Participant, Room, TimeSlot, build_problem, solve};
//!
//! let problem = build_problem(
//!     vec![
//!         Participant::new(1, "Ms. Tanaka", [Part::A, Part::B]).instructor(),
//!         Participant::new(2, "Sasaki", [Part::A, Part::B]).with_overlap_priority(100),
//!     ],
//!     vec![Room::new(1, "Room A")],
//!     vec![TimeSlot::new(1, "Period 1"), TimeSlot::new(2, "Period 2")],
//!     vec![Part::A, Part::B],
//! )?;
//! match solve(&problem, 30.0, 100)? {
//!     Some(solution) => println!("{} sessions", solution.sessions.len()),
//!     None => println!("no schedule; relax constraints or extend the time limit"),
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod schedule;
pub mod solver;

pub use config::SolveConfig;
pub use error::ValidationError;
pub use schedule::{
    Part, Participant, PracticeSession, Room, SchedulingProblem, SchedulingSolution, TimeSlot, Timetable,
    build_problem, export_timetable_xlsx,
};
pub use solver::{SolveEngine, solve, solve_with_config, solve_with_engine};
