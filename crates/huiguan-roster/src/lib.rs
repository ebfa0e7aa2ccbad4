//! Huiguan Roster — committee-roster spreadsheet export.
//!
//! Produces the `.xlsx` committee list the federation circulates before
//! its AGM: either one association's roster or a consolidated listing
//! of every chapter.

use huiguan_core::error::PortalError;
use huiguan_core::models::association::Association;
use rust_xlsxwriter::{Workbook, XlsxError};
use thiserror::Error;

/// Fixed filename for the consolidated all-chapters listing.
pub const CONSOLIDATED_FILENAME: &str = "AGM_Committee_List.xlsx";

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] XlsxError),
}

impl From<RosterError> for PortalError {
    fn from(err: RosterError) -> Self {
        PortalError::Export(err.to_string())
    }
}

/// Build the roster workbook for one association.
///
/// Sheet "Committee Members" with a header row and one row per member.
/// The association display name doubles as the location column, the way
/// the circulated lists have always been laid out. No members means a
/// header-only sheet.
pub fn association_workbook(assoc: &Association) -> Result<Vec<u8>, RosterError> {
    let display_name = if assoc.name.is_empty() {
        &assoc.id
    } else {
        &assoc.name
    };

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Committee Members")?;

    let headers = ["Association Name", "Location", "Name", "Title", "Category"];
    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header)?;
    }

    for (i, member) in assoc.committee_members.iter().enumerate() {
        let row = (i + 1) as u32;
        worksheet.write_string(row, 0, display_name.as_str())?;
        worksheet.write_string(row, 1, display_name.as_str())?;
        worksheet.write_string(row, 2, member.name.as_str())?;
        worksheet.write_string(row, 3, member.title.as_str())?;
        worksheet.write_string(row, 4, member.category.as_deref().unwrap_or(""))?;
    }

    Ok(workbook.save_to_buffer()?)
}

/// Build the consolidated workbook listing every chapter.
///
/// Saved under [`CONSOLIDATED_FILENAME`].
pub fn consolidated_workbook(associations: &[Association]) -> Result<Vec<u8>, RosterError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Associations")?;

    let headers = ["Association ID", "Association Name", "Location"];
    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header)?;
    }

    for (i, assoc) in associations.iter().enumerate() {
        let row = (i + 1) as u32;
        worksheet.write_string(row, 0, assoc.id.as_str())?;
        worksheet.write_string(row, 1, assoc.name.as_str())?;
        worksheet.write_string(row, 2, assoc.location.as_str())?;
    }

    Ok(workbook.save_to_buffer()?)
}

/// Derive the download filename for one association's roster.
///
/// Characters outside letters, digits, spaces, and hyphens are
/// stripped; whitespace runs become single underscores; an empty result
/// falls back to `Association`.
pub fn export_filename(display_name: &str) -> String {
    let cleaned: String = display_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();

    let name = cleaned.split_whitespace().collect::<Vec<_>>().join("_");
    let name = if name.is_empty() {
        "Association".to_string()
    } else {
        name
    };

    format!("{name}_Committee_List.xlsx")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use huiguan_core::models::association::CommitteeMember;

    fn test_association(members: Vec<CommitteeMember>) -> Association {
        Association {
            id: "HNHG-PG".into(),
            name: "Penang Hainan Association".into(),
            location: "Penang".into(),
            committee_members: members,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn filename_strips_and_underscores() {
        assert_eq!(
            export_filename("Penang Hainan Assoc. (North)"),
            "Penang_Hainan_Assoc_North_Committee_List.xlsx"
        );
        assert_eq!(
            export_filename("  Kuala   Lumpur  "),
            "Kuala_Lumpur_Committee_List.xlsx"
        );
        assert_eq!(export_filename("雪隆海南会馆"), "Association_Committee_List.xlsx");
        assert_eq!(export_filename(""), "Association_Committee_List.xlsx");
    }

    #[test]
    fn filename_keeps_hyphens() {
        assert_eq!(
            export_filename("Batu-Pahat"),
            "Batu-Pahat_Committee_List.xlsx"
        );
    }

    #[test]
    fn association_workbook_builds_with_members() {
        let assoc = test_association(vec![
            CommitteeMember {
                name: "Tan Wei Ming".into(),
                title: "President".into(),
                category: Some("Executive".into()),
            },
            CommitteeMember {
                name: "Lim Siew Lan".into(),
                title: "Treasurer".into(),
                category: None,
            },
        ]);

        let bytes = association_workbook(&assoc).unwrap();
        assert!(!bytes.is_empty());
    }

    #[test]
    fn association_workbook_builds_header_only() {
        let assoc = test_association(vec![]);
        let bytes = association_workbook(&assoc).unwrap();
        assert!(!bytes.is_empty());
    }

    #[test]
    fn consolidated_workbook_builds() {
        let bytes = consolidated_workbook(&[test_association(vec![])]).unwrap();
        assert!(!bytes.is_empty());
    }
}
