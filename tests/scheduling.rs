use std::collections::{BTreeMap, HashSet};

use practice_scheduler::model::{SessionKey, build_model_pipeline};
use practice_scheduler::solver::extract_sessions;
use practice_scheduler::{
    Part, Participant, Room, SchedulingProblem, SchedulingSolution, SolveConfig, TimeSlot, ValidationError,
    build_problem, export_timetable_xlsx, solve, solve_with_config,
};

fn rooms(n: u32) -> Vec<Room> {
    (1..=n).map(|id| Room::new(id, format!("Room {id}"))).collect()
}

fn slots(n: u32) -> Vec<TimeSlot> {
    (1..=n).map(|id| TimeSlot::new(id, format!("Period {id}"))).collect()
}

/// Five instructors with two parts each (A shared by two of them) and eighteen
/// players, each in two parts.
fn ensemble() -> SchedulingProblem {
    use Part::*;
    let instructors = [
        (1, "Tanaka", [A, B], 100),
        (2, "Sato", [C, D], 75),
        (3, "Suzuki", [E, F], 50),
        (4, "Takahashi", [G, H], 25),
        (5, "Yamada", [I, A], 0),
    ];
    let players = [
        ([A, B], 100),
        ([B, C], 50),
        ([C, D], 0),
        ([D, E], 100),
        ([E, F], 25),
        ([F, G], 75),
        ([G, H], 0),
        ([H, I], 100),
        ([I, A], 50),
        ([A, C], 75),
        ([B, D], 25),
        ([C, E], 50),
        ([D, F], 100),
        ([E, G], 0),
        ([F, H], 75),
        ([G, I], 25),
        ([H, A], 50),
        ([I, B], 100),
    ];

    let mut people: Vec<Participant> = instructors
        .into_iter()
        .map(|(id, name, parts, priority)| {
            Participant::new(id, name, parts)
                .instructor()
                .with_overlap_priority(priority)
        })
        .collect();
    people.extend(players.into_iter().enumerate().map(|(i, (parts, priority))| {
        let id = 6 + i as u32;
        Participant::new(id, format!("Player {id}"), parts).with_overlap_priority(priority)
    }));

    build_problem(people, rooms(3), slots(3), Part::ALL.to_vec()).unwrap()
}

fn assert_structurally_valid(problem: &SchedulingProblem, solution: &SchedulingSolution) {
    for part in problem.parts() {
        assert_eq!(
            solution.sessions.iter().filter(|s| s.part == *part).count(),
            1,
            "part {part} must run exactly once"
        );
    }

    let mut cells = HashSet::new();
    let mut teaching = HashSet::new();
    for s in &solution.sessions {
        assert!(cells.insert((s.room_id, s.time_slot_id)), "room double-booked: {s:?}");
        assert!(teaching.insert((s.instructor_id, s.time_slot_id)), "instructor double-booked: {s:?}");
        assert!(problem.participant(s.instructor_id).unwrap().is_instructor);
    }
}

fn keys(solution: &SchedulingSolution) -> Vec<SessionKey> {
    solution
        .sessions
        .iter()
        .map(|s| SessionKey::new(s.part, s.room_id, s.time_slot_id, s.instructor_id))
        .collect()
}

#[test]
fn ensemble_schedule_is_valid_and_balanced() {
    let problem = ensemble();
    let solution = solve(&problem, 60.0, 100).unwrap().expect("ensemble is feasible");

    assert_eq!(solution.sessions.len(), 9);
    assert_structurally_valid(&problem, &solution);

    let counts = solution.instructor_session_counts(&problem);
    let max = counts.values().max().unwrap();
    let min = counts.values().min().unwrap();
    assert_eq!(max - min, 1, "9 parts over 5 instructors: {counts:?}");

    // counts 2,2,2,2,1
    assert!((solution.fairness + 0.16).abs() < 1e-9);
    // range 1 at weight 100; the parts split into overlap-free slot groups
    assert_eq!(solution.objective_value, 100.0);
}

#[test]
fn sessions_carry_the_part_roster() {
    let problem = ensemble();
    let solution = solve(&problem, 60.0, 100).unwrap().unwrap();

    let a = solution.session_for_part(Part::A).unwrap();
    let expected: Vec<u32> = problem.participants_by_part(Part::A).map(|p| p.id).collect();
    assert_eq!(a.participant_ids, expected);
    assert!(a.participant_ids.contains(&1) && a.participant_ids.contains(&5));

    let ids: Vec<usize> = solution.sessions.iter().map(|s| s.id).collect();
    assert_eq!(ids, (0..9).collect::<Vec<_>>());
}

#[test]
fn single_room_slot_and_part_is_trivially_feasible() {
    let problem = build_problem(
        vec![Participant::new(1, "Solo", [Part::A]).instructor()],
        rooms(1),
        slots(1),
        vec![Part::A],
    )
    .unwrap();

    let solution = solve(&problem, 5.0, 100).unwrap().unwrap();
    assert_eq!(solution.sessions.len(), 1);
    let session = &solution.sessions[0];
    assert_eq!((session.part, session.room_id, session.time_slot_id, session.instructor_id), (Part::A, 1, 1, 1));
    assert_eq!(solution.fairness, 0.0);
    assert_eq!(solution.objective_value, -1.0);
}

#[test]
fn zero_rooms_fail_before_solving() {
    let result = build_problem(
        vec![Participant::new(1, "Solo", [Part::A]).instructor()],
        Vec::new(),
        slots(1),
        vec![Part::A],
    );
    assert_eq!(result, Err(ValidationError::NoRooms));
}

#[test]
fn too_few_cells_means_no_solution() {
    let problem = build_problem(
        vec![
            Participant::new(1, "T1", [Part::A]).instructor(),
            Participant::new(2, "T2", [Part::B]).instructor(),
        ],
        rooms(1),
        slots(2),
        vec![Part::A, Part::B, Part::C],
    )
    .unwrap();
    assert!(solve(&problem, 5.0, 100).unwrap().is_none());
}

#[test]
fn part_nobody_teaches_means_no_solution() {
    let problem = build_problem(
        vec![
            Participant::new(1, "T1", [Part::A]).instructor(),
            Participant::new(2, "P", [Part::A, Part::B]),
        ],
        rooms(2),
        slots(2),
        vec![Part::A, Part::B],
    )
    .unwrap();
    let config = SolveConfig::new(5.0, 100).restricted_to_declared_parts();
    assert!(solve_with_config(&problem, &config).unwrap().is_none());

    // by default any instructor may take any part
    assert!(solve(&problem, 5.0, 100).unwrap().is_some());
}

#[test]
fn high_priority_participant_is_kept_apart() {
    let problem = build_problem(
        vec![
            Participant::new(1, "T1", [Part::A]).instructor(),
            Participant::new(2, "T2", [Part::B]).instructor(),
            Participant::new(3, "Both", [Part::A, Part::B]).with_overlap_priority(100),
        ],
        rooms(2),
        slots(2),
        vec![Part::A, Part::B],
    )
    .unwrap();

    let solution = solve(&problem, 5.0, 100).unwrap().unwrap();
    assert_structurally_valid(&problem, &solution);
    let a = solution.session_for_part(Part::A).unwrap();
    let b = solution.session_for_part(Part::B).unwrap();
    assert_ne!(a.time_slot_id, b.time_slot_id);
    assert_eq!(solution.objective_value, 0.0);
}

#[test]
fn zero_priority_overlap_is_free() {
    let build = |priority: u8| {
        build_problem(
            vec![
                Participant::new(1, "T1", [Part::A]).instructor(),
                Participant::new(2, "T2", [Part::B]).instructor(),
                Participant::new(3, "Both", [Part::A, Part::B]).with_overlap_priority(priority),
            ],
            rooms(2),
            slots(2),
            vec![Part::A, Part::B],
        )
        .unwrap()
    };
    let overlapping = [SessionKey::new(Part::A, 1, 1, 1), SessionKey::new(Part::B, 2, 1, 2)];
    let config = SolveConfig::default();

    let free = build(0);
    let free_model = build_model_pipeline(&free, &config);
    let free_cost = free_model.linear.evaluate(&free_model.assignment_for(overlapping));

    let costly = build(60);
    let costly_model = build_model_pipeline(&costly, &config);
    let costly_cost = costly_model.linear.evaluate(&costly_model.assignment_for(overlapping));

    assert_eq!(free_cost, 0);
    assert_eq!(costly_cost, 60);
}

#[test]
fn re_extraction_reproduces_the_schedule() {
    let problem = ensemble();
    let config = SolveConfig::default();
    let solution = solve_with_config(&problem, &config).unwrap().unwrap();

    let model = build_model_pipeline(&problem, &config);
    let assignment = model.assignment_for(keys(&solution));
    let first = extract_sessions(&problem, &model.session_vars, &assignment);
    let second = extract_sessions(&problem, &model.session_vars, &assignment);
    assert_eq!(first, second);

    let by_part = |sessions: &[practice_scheduler::PracticeSession]| {
        sessions
            .iter()
            .map(|s| (s.part, (s.room_id, s.time_slot_id, s.instructor_id)))
            .collect::<BTreeMap<_, _>>()
    };
    assert_eq!(by_part(&first), by_part(&solution.sessions));
    assert!(model.linear.is_satisfied_by(&assignment));
    assert_eq!(model.linear.evaluate(&assignment) as f64, solution.objective_value);
}

#[test]
fn spread_cap_keeps_workloads_within_one() {
    let problem = ensemble();
    let config = SolveConfig::new(60.0, 0).with_spread_cap(1);
    let solution = solve_with_config(&problem, &config).unwrap().unwrap();
    assert_structurally_valid(&problem, &solution);

    let counts = solution.instructor_session_counts(&problem);
    assert!(counts.values().max().unwrap() - counts.values().min().unwrap() <= 1);
}

#[test]
fn timetable_and_export_reflect_sessions() {
    let problem = ensemble();
    let solution = solve(&problem, 60.0, 100).unwrap().unwrap();

    let table = solution.timetable(&problem);
    assert_eq!(table.len(), 9);
    for s in &solution.sessions {
        let cell = table.cell(s.time_slot_id, s.room_id);
        assert_eq!(cell.len(), 1);
        assert_eq!(cell[0], s);
    }

    let bytes = export_timetable_xlsx(&solution, &problem).unwrap();
    assert!(bytes.starts_with(b"PK"));
}

/// Nine parts over 4 rooms and 4 slots, seven instructors and eighty players in three
/// parts each: far too much overlap structure to prove optimal in under a second.
fn crowded_rehearsal() -> SchedulingProblem {
    let parts = Part::ALL;
    let mut people: Vec<Participant> = (0..7u32)
        .map(|i| {
            let own = [parts[i as usize % 9], parts[(i as usize + 4) % 9]];
            Participant::new(i + 1, format!("Coach {}", i + 1), own).instructor()
        })
        .collect();
    people.extend((0..80u32).map(|i| {
        let k = i as usize;
        let own = [parts[k % 9], parts[(k / 9 + k + 1) % 9], parts[(2 * k + 5) % 9]];
        Participant::new(100 + i, format!("Player {i}"), own).with_overlap_priority((i * 13 % 100) as u8 + 1)
    }));
    build_problem(people, rooms(4), slots(4), Part::ALL.to_vec()).unwrap()
}

#[test]
fn solve_stops_at_the_time_budget() {
    let problem = crowded_rehearsal();
    let budget = 0.5;
    let start = std::time::Instant::now();
    let result = solve(&problem, budget, 100).unwrap();
    let elapsed = start.elapsed().as_secs_f64();

    assert!(elapsed < budget + 5.0, "took {elapsed:.2}s on a {budget}s budget");
    if let Some(solution) = result {
        assert_structurally_valid(&problem, &solution);
        #[cfg(not(feature = "cp-sat"))]
        assert!(!solution.is_optimal, "incumbent cannot be proven optimal this fast");
    }
}
