//! Spreadsheet export of a solved schedule.
use anyhow::Result;
use rust_xlsxwriter::{Format, Workbook};

use super::{SchedulingProblem, SchedulingSolution};

/// Builds an `.xlsx` workbook in memory.
///
/// Sheet "Timetable" has one row per slot and one column per room; each cell lists
/// `PART (instructor)` for the sessions there. Sheet "Instructors" lists every
/// instructor with declared parts and realized session count.
pub fn export_timetable_xlsx(solution: &SchedulingSolution, problem: &SchedulingProblem) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Timetable")?;
    sheet.write_string_with_format(0, 0, "Slot \\ Room", &bold)?;
    for (col, room) in problem.rooms().iter().enumerate() {
        sheet.write_string_with_format(0, col as u16 + 1, &room.name, &bold)?;
        sheet.set_column_width(col as u16 + 1, 18)?;
    }

    let table = solution.timetable(problem);
    for (row, (slot_id, cells)) in table.rows().enumerate() {
        let row = row as u32 + 1;
        let slot_name = problem
            .time_slots()
            .iter()
            .find(|t| t.id == slot_id)
            .map(|t| t.name.as_str())
            .unwrap_or_default();
        sheet.write_string_with_format(row, 0, slot_name, &bold)?;
        for (col, (_, sessions)) in cells.iter().enumerate() {
            let text = if sessions.is_empty() {
                "-".to_string()
            } else {
                sessions
                    .iter()
                    .map(|s| {
                        let instructor = problem
                            .participant(s.instructor_id)
                            .map(|p| p.name.as_str())
                            .unwrap_or("?");
                        format!("{} ({instructor})", s.part)
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            sheet.write_string(row, col as u16 + 1, &text)?;
        }
    }

    let counts = solution.instructor_session_counts(problem);
    let sheet = workbook.add_worksheet();
    sheet.set_name("Instructors")?;
    for (col, header) in ["Instructor", "Parts", "Sessions"].iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }
    for (row, instructor) in problem.instructors().enumerate() {
        let row = row as u32 + 1;
        let parts = instructor
            .parts
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        sheet.write_string(row, 0, &instructor.name)?;
        sheet.write_string(row, 1, &parts)?;
        sheet.write_number(row, 2, counts.get(&instructor.id).copied().unwrap_or(0) as f64)?;
    }

    Ok(workbook.save_to_buffer()?)
}
