use crate::model::{DirectoryRow, EntryRecord, Fields};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    #[default]
    Menu,
    NewEntry,
    View,
    Edit,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Menu => "menu",
            Mode::NewEntry => "new-entry",
            Mode::View => "view",
            Mode::Edit => "edit",
        }
    }

    /// Modes whose center selection drives the entries list.
    pub fn lists_entries(self) -> bool {
        matches!(self, Mode::View | Mode::Edit)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "menu" => Ok(Mode::Menu),
            "new-entry" | "enter" => Ok(Mode::NewEntry),
            "view" => Ok(Mode::View),
            "edit" => Ok(Mode::Edit),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

pub type Ticket = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKind {
    Centers,
    Students,
    Profile,
    Entries,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InFlight {
    Submission,
    EditSave,
}

fn is_set<S: Serializer>(ticket: &Option<Ticket>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_bool(ticket.is_some())
}

/// Outstanding fetch per kind. A completion is applied only if it carries
/// the ticket recorded here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pending {
    #[serde(serialize_with = "is_set")]
    pub centers: Option<Ticket>,
    #[serde(serialize_with = "is_set")]
    pub students: Option<Ticket>,
    #[serde(serialize_with = "is_set")]
    pub profile: Option<Ticket>,
    #[serde(serialize_with = "is_set")]
    pub entries: Option<Ticket>,
}

impl Pending {
    pub fn get(&self, kind: FetchKind) -> Option<Ticket> {
        match kind {
            FetchKind::Centers => self.centers,
            FetchKind::Students => self.students,
            FetchKind::Profile => self.profile,
            FetchKind::Entries => self.entries,
        }
    }

    pub(crate) fn slot(&mut self, kind: FetchKind) -> &mut Option<Ticket> {
        match kind {
            FetchKind::Centers => &mut self.centers,
            FetchKind::Students => &mut self.students,
            FetchKind::Profile => &mut self.profile,
            FetchKind::Entries => &mut self.entries,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditDraft {
    pub record_id: String,
    /// Student of the record when editing began; never re-derived.
    pub student_name: String,
    pub fields: Fields,
}

/// Replacement row that never made it back into the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LostRecord {
    pub record: EntryRecord,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    Menu,
    SelectCenter,
    SelectStudent,
    EnterFields,
    EntryList,
    EditRecord,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub mode: Mode,
    pub centers: Vec<String>,
    pub selected_center: Option<String>,
    pub students: Vec<String>,
    pub selected_student: Option<String>,
    pub profile: Option<DirectoryRow>,
    pub fields: Fields,
    pub entries: Vec<EntryRecord>,
    pub editing: Option<EditDraft>,
    pub in_flight: Option<InFlight>,
    #[serde(rename = "submittedBanner", serialize_with = "is_set")]
    pub banner: Option<Ticket>,
    pub lost: Option<LostRecord>,
    #[serde(rename = "loading")]
    pub pending: Pending,
    #[serde(skip)]
    last_ticket: Ticket,
}

impl SessionState {
    pub(crate) fn next_ticket(&mut self) -> Ticket {
        self.last_ticket += 1;
        self.last_ticket
    }

    /// Records a new outstanding fetch of `kind`, superseding any older one.
    pub(crate) fn issue(&mut self, kind: FetchKind) -> Ticket {
        let ticket = self.next_ticket();
        *self.pending.slot(kind) = Some(ticket);
        ticket
    }

    /// Takes the pending slot if `ticket` is the current one for `kind`.
    pub(crate) fn settle(&mut self, kind: FetchKind, ticket: Ticket) -> bool {
        let slot = self.pending.slot(kind);
        if *slot == Some(ticket) {
            *slot = None;
            true
        } else {
            false
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn visible_steps(&self) -> Vec<Step> {
        let mut steps = Vec::new();
        match self.mode {
            Mode::Menu => steps.push(Step::Menu),
            Mode::NewEntry => {
                steps.push(Step::SelectCenter);
                if self.selected_center.is_some() {
                    steps.push(Step::SelectStudent);
                }
                if self.selected_student.is_some() {
                    steps.push(Step::EnterFields);
                }
            }
            Mode::View => {
                steps.push(Step::SelectCenter);
                if self.selected_center.is_some() {
                    steps.push(Step::EntryList);
                }
            }
            Mode::Edit => {
                steps.push(Step::SelectCenter);
                if self.editing.is_some() {
                    steps.push(Step::EditRecord);
                } else if self.selected_center.is_some() {
                    steps.push(Step::EntryList);
                }
            }
        }
        steps
    }

    pub fn can_submit(&self) -> bool {
        self.mode == Mode::NewEntry
            && !self.is_busy()
            && self.selected_center.is_some()
            && self.selected_student.is_some()
            && self.fields.first_blank().is_none()
    }

    pub fn can_save(&self) -> bool {
        self.mode == Mode::Edit && !self.is_busy() && self.lost.is_none() && self.editing.is_some()
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            state: self,
            steps: self.visible_steps(),
            can_submit: self.can_submit(),
            can_save: self.can_save(),
        }
    }
}

/// What the UI renders: the state plus the derived gates.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot<'a> {
    #[serde(flatten)]
    pub state: &'a SessionState,
    pub steps: Vec<Step>,
    pub can_submit: bool,
    pub can_save: bool,
}
