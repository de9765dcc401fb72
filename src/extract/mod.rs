// src/extract/mod.rs

pub mod normalize;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::trace;

pub use normalize::{clean_authority_status, clean_legal_name};

/// Labels of the carrier snapshot table, as the source page renders them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLabel {
    UsdotNumber,
    McNumber,
    LegalName,
    DbaName,
    OperatingAuthorityStatus,
    OperatingStatus,
    Phone,
    PhysicalAddress,
    MailingAddress,
    PowerUnits,
    Drivers,
}

impl FieldLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldLabel::UsdotNumber => "USDOT Number",
            FieldLabel::McNumber => "MC/MX/FF Number(s)",
            FieldLabel::LegalName => "Legal Name",
            FieldLabel::DbaName => "DBA Name",
            FieldLabel::OperatingAuthorityStatus => "Operating Authority Status",
            FieldLabel::OperatingStatus => "Operating Status",
            FieldLabel::Phone => "Phone",
            FieldLabel::PhysicalAddress => "Physical Address",
            FieldLabel::MailingAddress => "Mailing Address",
            FieldLabel::PowerUnits => "Power Units",
            FieldLabel::Drivers => "Drivers",
        }
    }
}

static CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("th, td").expect("cell selector should parse"));

/// Collapse every whitespace run (non-breaking spaces included) to one ASCII
/// space and trim both ends.
pub fn clean_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

// Text nodes are joined with a space so `<br>`-separated lines stay apart.
fn cell_text(cell: &ElementRef<'_>) -> String {
    clean_text(&cell.text().collect::<Vec<_>>().join(" "))
}

fn label_text(cell: &ElementRef<'_>) -> String {
    clean_text(cell_text(cell).trim_end_matches(':'))
}

fn is_cell(el: &ElementRef<'_>) -> bool {
    matches!(el.value().name(), "td" | "th")
}

/// Value of the cell following the first cell labelled `label`, or `""`.
pub fn extract(doc: &Html, label: FieldLabel) -> String {
    extract_label(doc, label.as_str())
}

/// Same as [`extract`] for an arbitrary label string.
pub fn extract_label(doc: &Html, label: &str) -> String {
    let Some(cell) = doc.select(&CELL_SELECTOR).find(|c| label_text(c) == label) else {
        trace!(label, "label not present");
        return String::new();
    };

    cell.next_siblings()
        .filter_map(ElementRef::wrap)
        .find(is_cell)
        .map(|value| cell_text(&value))
        .unwrap_or_default()
}

/// First non-empty value among `labels`, in order.
pub fn extract_first(doc: &Html, labels: &[FieldLabel]) -> String {
    labels
        .iter()
        .map(|l| extract(doc, *l))
        .find(|v| !v.is_empty())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r##"
<html><body>
<table>
  <tr><th><a href="/help">Entity Type:</a></th><td>CARRIER</td></tr>
  <tr><th>Operating Authority Status:</th>
      <td>AUTHORIZED FOR Property
          For Licensing and Insurance details click here.</td></tr>
  <tr><th>Legal Name:</th><td>ACME&nbsp;&nbsp;TRUCKING   LLC</td></tr>
  <tr><th>DBA Name:</th><td>&nbsp;</td></tr>
  <tr><th>Physical Address:</th>
      <td>2251 S FORT APACHE RD APT 1120<br>
          LAS VEGAS, NV &nbsp; 89117</td></tr>
  <tr><th>Phone:</th><td>(702) 555-0100</td></tr>
  <tr><th>USDOT Number:</th><td>1234567</td>
      <th>MC/MX/FF Number(s):</th><td><a href="#">MC-765432</a></td></tr>
  <tr><th>Power Units:</th><td>12</td><th>Drivers:</th><td>14</td></tr>
  <tr><th>Legal Name:</th><td>SHADOWED NAME</td></tr>
  <tr><th>Trailing Label:</th></tr>
</table>
</body></html>"##;

    fn doc() -> Html {
        Html::parse_document(SNAPSHOT)
    }

    #[test]
    fn extracts_adjacent_value_cell() {
        let d = doc();
        assert_eq!(extract(&d, FieldLabel::UsdotNumber), "1234567");
        assert_eq!(extract(&d, FieldLabel::McNumber), "MC-765432");
        assert_eq!(extract(&d, FieldLabel::PowerUnits), "12");
        assert_eq!(extract(&d, FieldLabel::Drivers), "14");
        assert_eq!(extract(&d, FieldLabel::Phone), "(702) 555-0100");
    }

    #[test]
    fn collapses_whitespace_and_nbsp() {
        let d = doc();
        assert_eq!(extract(&d, FieldLabel::LegalName), "ACME TRUCKING LLC");
        assert_eq!(
            extract(&d, FieldLabel::PhysicalAddress),
            "2251 S FORT APACHE RD APT 1120 LAS VEGAS, NV 89117"
        );
        assert_eq!(extract(&d, FieldLabel::DbaName), "");
    }

    #[test]
    fn label_nested_in_link_matches() {
        assert_eq!(extract_label(&doc(), "Entity Type"), "CARRIER");
    }

    #[test]
    fn missing_label_or_value_cell_is_empty() {
        let d = doc();
        assert_eq!(extract(&d, FieldLabel::MailingAddress), "");
        assert_eq!(extract_label(&d, "Trailing Label"), "");
        assert_eq!(extract_label(&d, "legal name"), "");

        let junk = Html::parse_document("<p>not <b>a table</p></i>");
        assert_eq!(extract(&junk, FieldLabel::LegalName), "");
    }

    #[test]
    fn extraction_is_idempotent() {
        let d = doc();
        let first = extract(&d, FieldLabel::OperatingAuthorityStatus);
        let second = extract(&d, FieldLabel::OperatingAuthorityStatus);
        assert_eq!(first, second);
        assert!(first.starts_with("AUTHORIZED FOR Property For Licensing"));
    }

    #[test]
    fn falls_back_through_label_list() {
        let d = Html::parse_document(
            "<table><tr><td>Operating Status:</td><td>ACTIVE</td></tr></table>",
        );
        let status = extract_first(
            &d,
            &[FieldLabel::OperatingAuthorityStatus, FieldLabel::OperatingStatus],
        );
        assert_eq!(status, "ACTIVE");
    }
}
