//! Session transitions. `step` never mutates its input: it returns the next
//! state together with the effects the driver must run. No I/O happens here.

use super::state::{EditDraft, FetchKind, InFlight, LostRecord, Mode, SessionState, Ticket};
use crate::catalog::CatalogError;
use crate::error::{Notice, SessionError};
use crate::model::{DirectoryRow, EntryRecord, FieldIndex, Fields};
use crate::services::{EditError, EditStage, SubmitError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    ChooseMode(Mode),
    Back,
    RefreshCatalog,
    SelectCenter(Option<String>),
    SelectStudent(Option<String>),
    SetField(FieldIndex, String),
    Submit,
    BeginEdit(String),
    SetEditField(FieldIndex, String),
    CancelEdit,
    SaveEdit,
    AcknowledgeLoss,

    CentersLoaded {
        ticket: Ticket,
        result: Result<Vec<String>, CatalogError>,
    },
    StudentsLoaded {
        ticket: Ticket,
        result: Result<Vec<String>, CatalogError>,
    },
    ProfileLoaded {
        ticket: Ticket,
        result: Result<Option<DirectoryRow>, CatalogError>,
    },
    EntriesLoaded {
        ticket: Ticket,
        entries: Vec<EntryRecord>,
    },
    Submitted {
        result: Result<EntryRecord, SubmitError>,
    },
    Saved {
        record: EntryRecord,
        result: Result<Vec<EntryRecord>, EditError>,
    },
    BannerExpired {
        ticket: Ticket,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadCenters {
        ticket: Ticket,
    },
    LoadStudents {
        ticket: Ticket,
        center: String,
    },
    LoadProfile {
        ticket: Ticket,
        center: String,
        student: String,
    },
    LoadEntries {
        ticket: Ticket,
        center: String,
    },
    /// Abort the outstanding fetch of this kind, if any.
    Cancel(FetchKind),
    Submit {
        center: String,
        student: String,
        fields: Fields,
    },
    SaveEdit {
        record: EntryRecord,
    },
    ArmBanner {
        ticket: Ticket,
    },
    Notify(Notice),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("not available in {0} mode")]
    WrongMode(Mode),

    #[error("{0}")]
    StepOutOfOrder(&'static str),

    #[error("unknown center: {0}")]
    UnknownCenter(String),

    #[error("student {0} is not registered at the selected center")]
    UnknownStudent(String),

    #[error("no listed entry with timestamp {0}")]
    UnknownRecord(String),

    #[error("{0} is required")]
    MissingField(FieldIndex),

    #[error("a {0:?} is already in flight")]
    Busy(InFlight),

    #[error("entry {0} was lost by a failed save; acknowledge it first")]
    LossUnacknowledged(String),
}

impl TransitionError {
    pub fn code(&self) -> &'static str {
        match self {
            TransitionError::WrongMode(_) => "wrong_mode",
            TransitionError::StepOutOfOrder(_) => "step_out_of_order",
            TransitionError::UnknownCenter(_) => "unknown_center",
            TransitionError::UnknownStudent(_) => "unknown_student",
            TransitionError::UnknownRecord(_) => "unknown_record",
            TransitionError::MissingField(_) => "missing_field",
            TransitionError::Busy(_) => "busy",
            TransitionError::LossUnacknowledged(_) => "loss_unacknowledged",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Transition {
    pub state: SessionState,
    pub effects: Vec<Effect>,
}

/// Initial state: menu, with the center list requested.
pub fn start() -> Transition {
    let mut state = SessionState::default();
    let ticket = state.issue(FetchKind::Centers);
    Transition {
        state,
        effects: vec![Effect::LoadCenters { ticket }],
    }
}

pub fn step(state: &SessionState, event: Event) -> Result<Transition, TransitionError> {
    let mut next = state.clone();
    let mut effects = Vec::new();

    match event {
        Event::ChooseMode(mode) => {
            if state.mode != Mode::Menu || mode == Mode::Menu {
                return Err(TransitionError::WrongMode(state.mode));
            }
            clear_selections(&mut next, &mut effects);
            next.mode = mode;
        }
        Event::Back => {
            clear_selections(&mut next, &mut effects);
            next.mode = Mode::Menu;
        }
        Event::RefreshCatalog => {
            let ticket = next.issue(FetchKind::Centers);
            effects.push(Effect::LoadCenters { ticket });
        }
        Event::SelectCenter(center) => select_center(&mut next, &mut effects, center)?,
        Event::SelectStudent(student) => select_student(&mut next, &mut effects, student)?,
        Event::SetField(index, value) => {
            if state.mode != Mode::NewEntry {
                return Err(TransitionError::WrongMode(state.mode));
            }
            if state.selected_student.is_none() {
                return Err(TransitionError::StepOutOfOrder("select a student first"));
            }
            next.fields.set(index, value);
        }
        Event::Submit => {
            if state.mode != Mode::NewEntry {
                return Err(TransitionError::WrongMode(state.mode));
            }
            if let Some(flight) = state.in_flight {
                return Err(TransitionError::Busy(flight));
            }
            let (Some(center), Some(student)) = (&state.selected_center, &state.selected_student)
            else {
                return Err(TransitionError::StepOutOfOrder(
                    "select a center and a student first",
                ));
            };
            if let Some(index) = state.fields.first_blank() {
                return Err(TransitionError::MissingField(index));
            }
            next.in_flight = Some(InFlight::Submission);
            effects.push(Effect::Submit {
                center: center.clone(),
                student: student.clone(),
                fields: state.fields.clone(),
            });
        }
        Event::BeginEdit(record_id) => {
            if state.mode != Mode::Edit {
                return Err(TransitionError::WrongMode(state.mode));
            }
            if state.in_flight == Some(InFlight::EditSave) {
                return Err(TransitionError::Busy(InFlight::EditSave));
            }
            let record = state
                .entries
                .iter()
                .find(|e| e.timestamp == record_id)
                .ok_or(TransitionError::UnknownRecord(record_id))?;
            next.editing = Some(EditDraft {
                record_id: record.timestamp.clone(),
                student_name: record.student_name.clone(),
                fields: record.fields(),
            });
        }
        Event::SetEditField(index, value) => {
            let Some(draft) = next.editing.as_mut() else {
                return Err(TransitionError::StepOutOfOrder("no entry is being edited"));
            };
            draft.fields.set(index, value);
        }
        Event::CancelEdit => {
            next.editing = None;
        }
        Event::SaveEdit => {
            if state.mode != Mode::Edit {
                return Err(TransitionError::WrongMode(state.mode));
            }
            if let Some(flight) = state.in_flight {
                return Err(TransitionError::Busy(flight));
            }
            if let Some(lost) = &state.lost {
                return Err(TransitionError::LossUnacknowledged(
                    lost.record.timestamp.clone(),
                ));
            }
            let (Some(draft), Some(center)) = (&state.editing, &state.selected_center) else {
                return Err(TransitionError::StepOutOfOrder("no entry is being edited"));
            };
            next.in_flight = Some(InFlight::EditSave);
            effects.push(Effect::SaveEdit {
                record: EntryRecord::new(
                    draft.record_id.clone(),
                    center,
                    &draft.student_name,
                    &draft.fields,
                ),
            });
        }
        Event::AcknowledgeLoss => {
            next.lost = None;
        }

        Event::CentersLoaded { ticket, result } => {
            if next.settle(FetchKind::Centers, ticket) {
                next.centers = unwrap_or_notify(result, &mut effects);
            }
        }
        Event::StudentsLoaded { ticket, result } => {
            if next.settle(FetchKind::Students, ticket) {
                next.students = unwrap_or_notify(result, &mut effects);
            }
        }
        Event::ProfileLoaded { ticket, result } => {
            if next.settle(FetchKind::Profile, ticket) {
                next.profile = unwrap_or_notify(result, &mut effects);
            }
        }
        Event::EntriesLoaded { ticket, entries } => {
            if next.settle(FetchKind::Entries, ticket) {
                next.entries = entries;
            }
        }
        Event::Submitted { result } => {
            next.in_flight = None;
            match result {
                Ok(_) => {
                    // The user may have left the form while the insert ran.
                    if next.mode == Mode::NewEntry {
                        next.fields = Fields::default();
                        next.selected_center = None;
                        clear_students(&mut next, &mut effects);
                    }
                    let ticket = next.next_ticket();
                    next.banner = Some(ticket);
                    effects.push(Effect::ArmBanner { ticket });
                }
                Err(e) => effects.push(Effect::Notify(SessionError::from(e).into())),
            }
        }
        Event::Saved { record, result } => {
            next.in_flight = None;
            match result {
                Ok(refreshed) => {
                    if next
                        .editing
                        .as_ref()
                        .is_some_and(|d| d.record_id == record.timestamp)
                    {
                        next.editing = None;
                    }
                    if next.mode == Mode::Edit
                        && next.selected_center.as_deref() == Some(record.center_name.as_str())
                    {
                        next.entries = refreshed;
                    }
                    effects.push(Effect::Notify(Notice::info(
                        "entry_updated",
                        format!("Entry {} updated", record.timestamp),
                    )));
                }
                Err(e) => {
                    if e.stage == EditStage::Insert {
                        next.lost = Some(LostRecord {
                            record,
                            reason: e.cause.to_string(),
                        });
                    }
                    effects.push(Effect::Notify(SessionError::from(e).into()));
                }
            }
        }
        Event::BannerExpired { ticket } => {
            if next.banner == Some(ticket) {
                next.banner = None;
            }
        }
    }

    Ok(Transition {
        state: next,
        effects,
    })
}

fn select_center(
    next: &mut SessionState,
    effects: &mut Vec<Effect>,
    center: Option<String>,
) -> Result<(), TransitionError> {
    if next.mode == Mode::Menu {
        return Err(TransitionError::WrongMode(Mode::Menu));
    }
    if let Some(c) = &center {
        if !next.centers.contains(c) {
            return Err(TransitionError::UnknownCenter(c.clone()));
        }
    }
    next.selected_center = center.clone();

    if next.mode.lists_entries() {
        next.entries.clear();
        next.editing = None;
        cancel(next, effects, FetchKind::Entries);
        if let Some(center) = center {
            let ticket = next.issue(FetchKind::Entries);
            effects.push(Effect::LoadEntries { ticket, center });
        }
    } else {
        clear_students(next, effects);
        if let Some(center) = center {
            let ticket = next.issue(FetchKind::Students);
            effects.push(Effect::LoadStudents { ticket, center });
        }
    }
    Ok(())
}

fn select_student(
    next: &mut SessionState,
    effects: &mut Vec<Effect>,
    student: Option<String>,
) -> Result<(), TransitionError> {
    if next.mode != Mode::NewEntry {
        return Err(TransitionError::WrongMode(next.mode));
    }
    let Some(center) = next.selected_center.clone() else {
        return Err(TransitionError::StepOutOfOrder("select a center first"));
    };
    if let Some(s) = &student {
        if !next.students.contains(s) {
            return Err(TransitionError::UnknownStudent(s.clone()));
        }
    }
    next.selected_student = student.clone();
    next.profile = None;
    cancel(next, effects, FetchKind::Profile);
    if let Some(student) = student {
        let ticket = next.issue(FetchKind::Profile);
        effects.push(Effect::LoadProfile {
            ticket,
            center,
            student,
        });
    }
    Ok(())
}

fn cancel(next: &mut SessionState, effects: &mut Vec<Effect>, kind: FetchKind) {
    if next.pending.slot(kind).take().is_some() {
        effects.push(Effect::Cancel(kind));
    }
}

/// Student options, selection and profile all hang off the selected center.
fn clear_students(next: &mut SessionState, effects: &mut Vec<Effect>) {
    next.students.clear();
    next.selected_student = None;
    next.profile = None;
    cancel(next, effects, FetchKind::Students);
    cancel(next, effects, FetchKind::Profile);
}

/// Everything a mode switch discards. Centers, in-flight work, the banner and
/// an unacknowledged loss survive.
fn clear_selections(next: &mut SessionState, effects: &mut Vec<Effect>) {
    next.selected_center = None;
    clear_students(next, effects);
    next.fields = Fields::default();
    next.entries.clear();
    next.editing = None;
    cancel(next, effects, FetchKind::Entries);
}

/// Catalog failures degrade to an empty value plus a notice.
fn unwrap_or_notify<T: Default>(result: Result<T, CatalogError>, effects: &mut Vec<Effect>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            effects.push(Effect::Notify(SessionError::from(e).into()));
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    fn idx(n: u64) -> FieldIndex {
        FieldIndex::new(n).expect("field index")
    }

    fn apply(state: &SessionState, event: Event) -> (SessionState, Vec<Effect>) {
        let t = step(state, event).expect("transition");
        (t.state, t.effects)
    }

    fn with_centers() -> SessionState {
        let t = start();
        let Effect::LoadCenters { ticket } = t.effects[0] else {
            panic!("expected center load");
        };
        apply(
            &t.state,
            Event::CentersLoaded {
                ticket,
                result: Ok(vec!["Acme".into(), "Globex".into()]),
            },
        )
        .0
    }

    fn ticket_of(effects: &[Effect]) -> Ticket {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::LoadStudents { ticket, .. }
                | Effect::LoadProfile { ticket, .. }
                | Effect::LoadEntries { ticket, .. }
                | Effect::LoadCenters { ticket } => Some(*ticket),
                _ => None,
            })
            .expect("a load effect")
    }

    /// New-entry mode with Acme/Bob selected and students loaded.
    fn at_fields() -> SessionState {
        let (s, _) = apply(&with_centers(), Event::ChooseMode(Mode::NewEntry));
        let (s, fx) = apply(&s, Event::SelectCenter(Some("Acme".into())));
        let (s, _) = apply(
            &s,
            Event::StudentsLoaded {
                ticket: ticket_of(&fx),
                result: Ok(vec!["Alice".into(), "Bob".into()]),
            },
        );
        apply(&s, Event::SelectStudent(Some("Bob".into()))).0
    }

    fn filled(mut s: SessionState) -> SessionState {
        for i in FieldIndex::all() {
            s = apply(&s, Event::SetField(i, format!("v{}", i.get()))).0;
        }
        s
    }

    fn entry(ts: &str, student: &str) -> EntryRecord {
        EntryRecord::new(ts.into(), "Acme", student, &Fields::from(["a", "b", "c", "d", "e"]))
    }

    /// Edit mode on Acme with two listed entries.
    fn at_edit_list() -> SessionState {
        let (s, _) = apply(&with_centers(), Event::ChooseMode(Mode::Edit));
        let (s, fx) = apply(&s, Event::SelectCenter(Some("Acme".into())));
        apply(
            &s,
            Event::EntriesLoaded {
                ticket: ticket_of(&fx),
                entries: vec![entry("t1", "Alice"), entry("t2", "Bob")],
            },
        )
        .0
    }

    #[test]
    fn start_is_menu_and_loads_centers() {
        let t = start();
        assert_eq!(t.state.mode, Mode::Menu);
        assert!(matches!(t.effects[..], [Effect::LoadCenters { .. }]));
        assert_eq!(with_centers().centers, vec!["Acme", "Globex"]);
    }

    #[test]
    fn catalog_failure_fails_open_to_empty() {
        let t = start();
        let (s, fx) = apply(
            &t.state,
            Event::CentersLoaded {
                ticket: ticket_of(&t.effects),
                result: Err(CatalogError::Unavailable(StoreError::Unreachable("x".into()))),
            },
        );
        assert!(s.centers.is_empty());
        assert!(s.pending.centers.is_none());
        assert!(matches!(&fx[..], [Effect::Notify(n)] if n.code == "catalog_unavailable"));
    }

    #[test]
    fn steps_are_strictly_ordered() {
        let (s, _) = apply(&with_centers(), Event::ChooseMode(Mode::NewEntry));
        assert_eq!(
            step(&s, Event::SelectStudent(Some("Bob".into()))).unwrap_err().code(),
            "step_out_of_order"
        );
        assert_eq!(
            step(&s, Event::SetField(idx(1), "x".into())).unwrap_err().code(),
            "step_out_of_order"
        );
        assert_eq!(
            step(&s, Event::SelectCenter(Some("Initech".into()))).unwrap_err().code(),
            "unknown_center"
        );
        assert_eq!(
            step(&with_centers(), Event::SelectCenter(Some("Acme".into())))
                .unwrap_err()
                .code(),
            "wrong_mode"
        );
    }

    #[test]
    fn changing_center_discards_student_and_profile() {
        let s = at_fields();
        let profile_ticket = s.pending.profile.expect("profile requested");
        let (s, _) = apply(
            &s,
            Event::ProfileLoaded {
                ticket: profile_ticket,
                result: Ok(Some(DirectoryRow::new("Acme", "Bob"))),
            },
        );
        assert!(s.profile.is_some());
        assert_eq!(s.selected_student.as_deref(), Some("Bob"));

        let (s, fx) = apply(&s, Event::SelectCenter(Some("Globex".into())));
        assert!(s.selected_student.is_none());
        assert!(s.profile.is_none());
        assert!(s.students.is_empty());
        assert!(fx.iter().any(|e| matches!(e, Effect::LoadStudents { center, .. } if center == "Globex")));

        let (s, _) = apply(
            &s,
            Event::StudentsLoaded {
                ticket: ticket_of(&fx),
                result: Ok(vec!["Carol".into()]),
            },
        );
        assert_eq!(s.students, vec!["Carol"]);
        assert_eq!(
            step(&s, Event::SelectStudent(Some("Bob".into()))).unwrap_err().code(),
            "unknown_student"
        );
    }

    #[test]
    fn superseded_student_fetch_is_discarded() {
        let (s, _) = apply(&with_centers(), Event::ChooseMode(Mode::NewEntry));
        let (s, first) = apply(&s, Event::SelectCenter(Some("Acme".into())));
        let (s, second) = apply(&s, Event::SelectCenter(Some("Globex".into())));
        assert!(second.contains(&Effect::Cancel(FetchKind::Students)));

        let (s, _) = apply(
            &s,
            Event::StudentsLoaded {
                ticket: ticket_of(&first),
                result: Ok(vec!["Alice".into(), "Bob".into()]),
            },
        );
        assert!(s.students.is_empty(), "late Acme result must not land");

        let (s, _) = apply(
            &s,
            Event::StudentsLoaded {
                ticket: ticket_of(&second),
                result: Ok(vec!["Carol".into()]),
            },
        );
        assert_eq!(s.students, vec!["Carol"]);
    }

    #[test]
    fn submit_requires_all_fields_and_blocks_second_submit() {
        let s = at_fields();
        assert_eq!(step(&s, Event::Submit).unwrap_err(), TransitionError::MissingField(idx(1)));

        let s = filled(s);
        assert!(s.can_submit());
        let (s, fx) = apply(&s, Event::Submit);
        assert_eq!(s.in_flight, Some(InFlight::Submission));
        assert!(!s.can_submit());
        assert!(matches!(&fx[..], [Effect::Submit { center, student, .. }] if center == "Acme" && student == "Bob"));
        assert_eq!(step(&s, Event::Submit).unwrap_err().code(), "busy");
    }

    #[test]
    fn accepted_submit_resets_form_and_raises_banner() {
        let (s, _) = apply(&filled(at_fields()), Event::Submit);
        let record = entry("t9", "Bob");
        let (s, fx) = apply(&s, Event::Submitted { result: Ok(record) });
        assert!(s.in_flight.is_none());
        assert!(s.fields.is_empty());
        assert!(s.selected_center.is_none());
        assert!(s.selected_student.is_none());
        assert!(s.profile.is_none());
        let Some(Effect::ArmBanner { ticket }) = fx.last().cloned() else {
            panic!("banner not armed: {fx:?}");
        };
        assert_eq!(s.banner, Some(ticket));

        let (s, _) = apply(&s, Event::BannerExpired { ticket: ticket + 100 });
        assert!(s.banner.is_some());
        let (s, _) = apply(&s, Event::BannerExpired { ticket });
        assert!(s.banner.is_none());
    }

    #[test]
    fn submit_landing_after_mode_switch_keeps_the_new_selection() {
        let (s, _) = apply(&filled(at_fields()), Event::Submit);
        let (s, _) = apply(&s, Event::Back);
        let (s, _) = apply(&s, Event::ChooseMode(Mode::Edit));
        let (s, fx) = apply(&s, Event::SelectCenter(Some("Acme".into())));
        let (s, _) = apply(
            &s,
            Event::EntriesLoaded {
                ticket: ticket_of(&fx),
                entries: vec![entry("t1", "Alice")],
            },
        );
        let (s, _) = apply(&s, Event::BeginEdit("t1".into()));

        let (s, fx) = apply(&s, Event::Submitted { result: Ok(entry("t9", "Bob")) });
        assert_eq!(s.mode, Mode::Edit);
        assert_eq!(s.selected_center.as_deref(), Some("Acme"));
        assert_eq!(s.entries.len(), 1);
        assert!(s.editing.is_some());
        assert!(s.can_save());
        assert!(s.banner.is_some());
        assert!(matches!(&fx[..], [Effect::ArmBanner { .. }]));
    }

    #[test]
    fn rejected_submit_keeps_everything_for_retry() {
        let (before, _) = apply(&filled(at_fields()), Event::Submit);
        let (s, fx) = apply(
            &before,
            Event::Submitted {
                result: Err(SubmitError::Rejected("status 500".into())),
            },
        );
        assert!(s.in_flight.is_none());
        assert_eq!(s.fields, before.fields);
        assert_eq!(s.selected_center, before.selected_center);
        assert_eq!(s.selected_student, before.selected_student);
        assert!(s.banner.is_none());
        assert!(matches!(&fx[..], [Effect::Notify(n)] if n.code == "submission_rejected"));
        assert!(s.can_submit());
    }

    #[test]
    fn mode_switch_clears_selections_and_entries() {
        let s = at_edit_list();
        let (s, _) = apply(&s, Event::BeginEdit("t1".into()));
        let (s, _) = apply(&s, Event::Back);
        assert_eq!(s.mode, Mode::Menu);
        assert!(s.selected_center.is_none());
        assert!(s.entries.is_empty());
        assert!(s.editing.is_none());

        let (s, _) = apply(&s, Event::ChooseMode(Mode::View));
        assert_eq!(step(&s, Event::ChooseMode(Mode::Edit)).unwrap_err().code(), "wrong_mode");
    }

    #[test]
    fn center_change_in_view_clears_entries_before_fetch() {
        let s = at_edit_list();
        let (s, fx) = apply(&s, Event::SelectCenter(Some("Globex".into())));
        assert!(s.entries.is_empty());
        assert!(s.pending.entries.is_some());
        assert!(fx.iter().any(|e| matches!(e, Effect::LoadEntries { center, .. } if center == "Globex")));
    }

    #[test]
    fn begin_edit_prefills_and_replaces_previous_draft() {
        let s = at_edit_list();
        assert_eq!(
            step(&s, Event::BeginEdit("missing".into())).unwrap_err().code(),
            "unknown_record"
        );
        let (s, _) = apply(&s, Event::BeginEdit("t1".into()));
        let (s, _) = apply(&s, Event::SetEditField(idx(2), "changed".into()));
        let (s, _) = apply(&s, Event::BeginEdit("t2".into()));
        let draft = s.editing.clone().expect("draft");
        assert_eq!(draft.record_id, "t2");
        assert_eq!(draft.student_name, "Bob");
        assert_eq!(draft.fields.get(idx(2)), "b");

        let (s, fx) = apply(&s, Event::CancelEdit);
        assert!(s.editing.is_none());
        assert!(fx.is_empty());
        assert_eq!(s.entries.len(), 2);
    }

    #[test]
    fn save_emits_replacement_with_same_timestamp() {
        let (s, _) = apply(&at_edit_list(), Event::BeginEdit("t2".into()));
        let (s, _) = apply(&s, Event::SetEditField(idx(5), "new".into()));
        let (s, fx) = apply(&s, Event::SaveEdit);
        assert_eq!(s.in_flight, Some(InFlight::EditSave));
        let [Effect::SaveEdit { record }] = &fx[..] else {
            panic!("expected save effect: {fx:?}");
        };
        assert_eq!(record.timestamp, "t2");
        assert_eq!(record.student_name, "Bob");
        assert_eq!(record.field5, "new");
        assert_eq!(step(&s, Event::SaveEdit).unwrap_err().code(), "busy");
        assert_eq!(step(&s, Event::BeginEdit("t1".into())).unwrap_err().code(), "busy");
    }

    #[test]
    fn failed_delete_keeps_editing() {
        let (s, _) = apply(&at_edit_list(), Event::BeginEdit("t2".into()));
        let (s, fx) = apply(&s, Event::SaveEdit);
        let [Effect::SaveEdit { record }] = &fx[..] else {
            panic!("expected save effect");
        };
        let (s, fx) = apply(
            &s,
            Event::Saved {
                record: record.clone(),
                result: Err(EditError {
                    stage: EditStage::Delete,
                    record_id: "t2".into(),
                    cause: StoreError::Rejected { status: 500 },
                }),
            },
        );
        assert!(s.editing.is_some());
        assert!(s.lost.is_none());
        assert!(s.can_save());
        assert!(matches!(&fx[..], [Effect::Notify(n)] if n.code == "edit_delete_failed" && n.recoverable));
    }

    #[test]
    fn failed_insert_blocks_saves_until_acknowledged() {
        let (s, _) = apply(&at_edit_list(), Event::BeginEdit("t2".into()));
        let (s, fx) = apply(&s, Event::SaveEdit);
        let [Effect::SaveEdit { record }] = &fx[..] else {
            panic!("expected save effect");
        };
        let (s, fx) = apply(
            &s,
            Event::Saved {
                record: record.clone(),
                result: Err(EditError {
                    stage: EditStage::Insert,
                    record_id: "t2".into(),
                    cause: StoreError::Unreachable("reset".into()),
                }),
            },
        );
        assert!(matches!(&fx[..], [Effect::Notify(n)] if n.code == "edit_insert_failed" && !n.recoverable));
        assert_eq!(s.lost.as_ref().map(|l| l.record.timestamp.as_str()), Some("t2"));
        assert_eq!(step(&s, Event::SaveEdit).unwrap_err().code(), "loss_unacknowledged");

        let (s, _) = apply(&s, Event::AcknowledgeLoss);
        assert!(s.can_save());
    }

    #[test]
    fn successful_save_leaves_editing_and_shows_refreshed_list() {
        let (s, _) = apply(&at_edit_list(), Event::BeginEdit("t2".into()));
        let (s, fx) = apply(&s, Event::SaveEdit);
        let [Effect::SaveEdit { record }] = &fx[..] else {
            panic!("expected save effect");
        };
        let refreshed = vec![entry("t1", "Alice"), record.clone()];
        let (s, fx) = apply(
            &s,
            Event::Saved {
                record: record.clone(),
                result: Ok(refreshed.clone()),
            },
        );
        assert!(s.editing.is_none());
        assert!(s.in_flight.is_none());
        assert_eq!(s.entries, refreshed);
        assert!(matches!(&fx[..], [Effect::Notify(n)] if n.code == "entry_updated"));
    }

    #[test]
    fn visible_steps_follow_selections() {
        use crate::session::state::Step;
        let (s, _) = apply(&with_centers(), Event::ChooseMode(Mode::NewEntry));
        assert_eq!(s.visible_steps(), vec![Step::SelectCenter]);
        assert_eq!(
            at_fields().visible_steps(),
            vec![Step::SelectCenter, Step::SelectStudent, Step::EnterFields]
        );
        let (s, _) = apply(&at_edit_list(), Event::BeginEdit("t1".into()));
        assert_eq!(s.visible_steps(), vec![Step::SelectCenter, Step::EditRecord]);
    }
}
