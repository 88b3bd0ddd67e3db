use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const FIELD_COUNT: usize = 5;

pub const COL_TIMESTAMP: &str = "Timestamp";
pub const COL_CENTER: &str = "Center Name";

/// One row of the directory sheet. Columns other than the four known ones are
/// carried through untouched so the UI can show them on the profile card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryRow {
    #[serde(rename = "Center Name", default)]
    pub center_name: String,
    #[serde(rename = "Student Name", default)]
    pub student_name: String,
    #[serde(rename = "Agreement Date", default)]
    pub agreement_date: String,
    #[serde(rename = "Birth Date", default)]
    pub birth_date: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl DirectoryRow {
    pub fn new(center: &str, student: &str) -> Self {
        Self {
            center_name: center.to_string(),
            student_name: student.to_string(),
            agreement_date: String::new(),
            birth_date: String::new(),
            extra: BTreeMap::new(),
        }
    }
}

/// 1-based position of a free-text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FieldIndex(u8);

impl FieldIndex {
    pub fn new(n: u64) -> Option<Self> {
        if (1..=FIELD_COUNT as u64).contains(&n) {
            Some(Self(n as u8))
        } else {
            None
        }
    }

    pub fn get(self) -> usize {
        self.0 as usize
    }

    fn slot(self) -> usize {
        self.get() - 1
    }

    pub fn all() -> impl Iterator<Item = FieldIndex> {
        (1..=FIELD_COUNT as u8).map(FieldIndex)
    }
}

impl fmt::Display for FieldIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Field{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fields([String; FIELD_COUNT]);

impl Fields {
    pub fn new(values: [String; FIELD_COUNT]) -> Self {
        Self(values)
    }

    pub fn get(&self, index: FieldIndex) -> &str {
        &self.0[index.slot()]
    }

    pub fn set(&mut self, index: FieldIndex, value: impl Into<String>) {
        self.0[index.slot()] = value.into();
    }

    /// First field that is empty after trimming, if any.
    pub fn first_blank(&self) -> Option<FieldIndex> {
        FieldIndex::all().find(|i| self.get(*i).trim().is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|v| v.is_empty())
    }
}

impl<S: Into<String>> From<[S; FIELD_COUNT]> for Fields {
    fn from(values: [S; FIELD_COUNT]) -> Self {
        Self(values.map(Into::into))
    }
}

/// A submitted row in the entries sheet. `timestamp` is the only identifier
/// the store has for a row; two submissions in the same millisecond collide and
/// are then edited or deleted together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "Center Name", default)]
    pub center_name: String,
    #[serde(rename = "Student Name", default)]
    pub student_name: String,
    #[serde(rename = "Field1", default)]
    pub field1: String,
    #[serde(rename = "Field2", default)]
    pub field2: String,
    #[serde(rename = "Field3", default)]
    pub field3: String,
    #[serde(rename = "Field4", default)]
    pub field4: String,
    #[serde(rename = "Field5", default)]
    pub field5: String,
}

impl EntryRecord {
    pub fn new(timestamp: String, center: &str, student: &str, fields: &Fields) -> Self {
        let [field1, field2, field3, field4, field5] = fields.0.clone();
        Self {
            timestamp,
            center_name: center.to_string(),
            student_name: student.to_string(),
            field1,
            field2,
            field3,
            field4,
            field5,
        }
    }

    pub fn fields(&self) -> Fields {
        Fields([
            self.field1.clone(),
            self.field2.clone(),
            self.field3.clone(),
            self.field4.clone(),
            self.field5.clone(),
        ])
    }

    pub fn column(&self, name: &str) -> Option<&str> {
        match name {
            COL_TIMESTAMP => Some(&self.timestamp),
            COL_CENTER => Some(&self.center_name),
            "Student Name" => Some(&self.student_name),
            "Field1" => Some(&self.field1),
            "Field2" => Some(&self.field2),
            "Field3" => Some(&self.field3),
            "Field4" => Some(&self.field4),
            "Field5" => Some(&self.field5),
            _ => None,
        }
    }
}

/// Current instant as `YYYY-MM-DDTHH:MM:SS.sssZ`.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn directory_row_keeps_unknown_columns() {
        let row: DirectoryRow = serde_json::from_value(json!({
            "Center Name": "Acme",
            "Student Name": "Alice",
            "Agreement Date": "2024-01-02",
            "Birth Date": "2015-05-06",
            "Guardian": "Pat"
        }))
        .expect("decode row");
        assert_eq!(row.center_name, "Acme");
        assert_eq!(row.birth_date, "2015-05-06");
        assert_eq!(row.extra.get("Guardian"), Some(&json!("Pat")));
    }

    #[test]
    fn entry_record_missing_fields_read_as_empty() {
        let rec: EntryRecord = serde_json::from_value(json!({
            "Timestamp": "2025-01-01T00:00:00.000Z",
            "Center Name": "Acme",
            "Student Name": "Bob",
            "Field1": "x"
        }))
        .expect("decode entry");
        assert_eq!(rec.field1, "x");
        assert_eq!(rec.field5, "");
        assert_eq!(rec.fields().first_blank(), FieldIndex::new(2));
    }

    #[test]
    fn entry_record_uses_sheet_column_names() {
        let rec = EntryRecord::new(
            "t".into(),
            "Acme",
            "Bob",
            &Fields::from(["a", "b", "c", "d", "e"]),
        );
        let value = serde_json::to_value(&rec).expect("encode");
        assert_eq!(value["Center Name"], "Acme");
        assert_eq!(value["Field5"], "e");
        assert_eq!(rec.column(COL_TIMESTAMP), Some("t"));
    }

    #[test]
    fn field_index_is_one_based_and_bounded() {
        assert!(FieldIndex::new(0).is_none());
        assert!(FieldIndex::new(6).is_none());
        let i = FieldIndex::new(5).expect("index 5");
        let mut fields = Fields::default();
        fields.set(i, "last");
        assert_eq!(fields.get(i), "last");
        assert_eq!(i.to_string(), "Field5");
    }

    #[test]
    fn timestamp_has_millisecond_utc_form() {
        let ts = timestamp_now();
        assert!(ts.ends_with('Z'), "{ts}");
        assert_eq!(ts.len(), "2025-01-01T00:00:00.000Z".len());
    }
}
