// src/record.rs

use scraper::Html;
use serde::Serialize;

use crate::address::AddressComponents;
use crate::extract::{self, clean_authority_status, clean_legal_name, FieldLabel};

/// Named fields pulled from a snapshot page, after name/status cleanup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub usdot: String,
    pub mc_number: String,
    pub legal_name: String,
    pub dba_name: String,
    pub authority_status: String,
    pub office_phone: String,
    pub physical_address: String,
    pub mailing_address: String,
    pub power_units: String,
    pub drivers: String,
}

impl ExtractedFields {
    pub fn from_document(doc: &Html) -> Self {
        Self {
            usdot: extract::extract(doc, FieldLabel::UsdotNumber),
            mc_number: extract::extract(doc, FieldLabel::McNumber),
            legal_name: clean_legal_name(&extract::extract(doc, FieldLabel::LegalName)),
            dba_name: extract::extract(doc, FieldLabel::DbaName),
            authority_status: clean_authority_status(&extract::extract_first(
                doc,
                &[
                    FieldLabel::OperatingAuthorityStatus,
                    FieldLabel::OperatingStatus,
                ],
            )),
            office_phone: extract::extract(doc, FieldLabel::Phone),
            physical_address: extract::extract(doc, FieldLabel::PhysicalAddress),
            mailing_address: extract::extract(doc, FieldLabel::MailingAddress),
            power_units: extract::extract(doc, FieldLabel::PowerUnits),
            drivers: extract::extract(doc, FieldLabel::Drivers),
        }
    }

    /// Whether the page carried a carrier snapshot at all.
    pub fn has_carrier(&self) -> bool {
        !self.usdot.is_empty() || !self.legal_name.is_empty()
    }
}

/// How the physical address ended up on the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum AddressStatus {
    Parsed,
    /// Local decomposition kept the raw line in `street`.
    Unparsed,
    /// The geocoding service gave nothing usable.
    Unresolved(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CarrierRecord {
    pub usdot: String,
    pub mc_number: String,
    pub legal_name: String,
    pub dba_name: String,
    pub authority_status: String,
    pub office_phone: String,
    pub power_units: String,
    pub drivers: String,
    /// Address line as the source rendered it.
    pub physical_address: String,
    pub mailing_address: String,
    pub address: AddressComponents,
    pub address_status: AddressStatus,
}

/// Merge extracted fields with resolved address components.
///
/// The caller's identifier stands in for an MC number the page did not show.
pub fn assemble(
    identifier: &str,
    fields: ExtractedFields,
    address: AddressComponents,
    address_status: AddressStatus,
) -> CarrierRecord {
    let mc_number = if fields.mc_number.is_empty() {
        identifier.trim().to_string()
    } else {
        fields.mc_number
    };

    CarrierRecord {
        usdot: fields.usdot,
        mc_number,
        legal_name: fields.legal_name,
        dba_name: fields.dba_name,
        authority_status: fields.authority_status,
        office_phone: fields.office_phone,
        power_units: fields.power_units,
        drivers: fields.drivers,
        physical_address: fields.physical_address,
        mailing_address: fields.mailing_address,
        address,
        address_status,
    }
}
