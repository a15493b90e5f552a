//! CBP Form 7501 field mapping.
//!
//! The external form populator fills a fixed-layout paper form; this module
//! owns only the key/value mapping from a computed [`DutyLineItem`] onto the
//! form's field names. Monetary fields are presented as 2-decimal strings.
//! PDF rendering itself is the populator's job, not ours.

use std::collections::BTreeMap;

use chrono::Local;

use htsline_core::DutyRates;

use crate::calculator::{money, DutyLineItem};

/// Static per-item entry metadata the calculator does not compute.
#[derive(Debug, Clone)]
pub struct EntryMeta {
    /// Caller-assigned item identifier (used for output naming).
    pub id: String,
    /// Gross weight in kilograms, as entered on the manifest.
    pub gross_weight: String,
    /// Manifest quantity.
    pub manifest_qty: String,
    /// Net quantity in the HTS unit of measure.
    pub net_quantity: String,
}

impl Default for EntryMeta {
    fn default() -> Self {
        Self {
            id: "1".to_string(),
            gross_weight: "10.00".to_string(),
            manifest_qty: "100".to_string(),
            net_quantity: "100".to_string(),
        }
    }
}

/// Map a computed breakdown onto the CBP Form 7501 field layout.
///
/// Date fields carry the `TODAY` placeholder; [`resolve_dates`] substitutes
/// the current date at render time so a precomputed map stays reusable.
pub fn form_fields(
    item: &DutyLineItem,
    rates: &DutyRates,
    meta: &EntryMeta,
    hts_number: &str,
    description: &str,
) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();
    let mut set = |k: &str, v: String| {
        fields.insert(k.to_string(), v);
    };

    // Entry information.
    // TODO: replace the sample filer/importer profile below with configured
    // filer data once a profile store exists.
    set("filercode[0]", "ABC".to_string());
    set("entrytype[0]", "01".to_string());
    set("summaryDate[0]", "TODAY".to_string());
    set("portcode[0]", "2704".to_string());
    set("entryDate[0]", "TODAY".to_string());
    set("importDate[0]", "TODAY".to_string());

    // Bond information.
    set("bondtype[0]", "1".to_string());
    set("suretyno[0]", "123".to_string());

    // Transportation information.
    set("mode[0]", "11".to_string());
    set("impcarrier[0]", "ABCD".to_string());
    set("bl[0]", "SHIP12345678".to_string());
    set("manid[0]", "CNLIP123456789".to_string());
    set("foreignport[0]", "CNSHA".to_string());
    set("usport[0]", "2704".to_string());

    // Importer/consignee information.
    set("importerno[0]", "12-3456789".to_string());
    set("consignno[0]", "12-3456789".to_string());
    set(
        "refno[0]",
        format!("PO-{}", Local::now().format("%Y-%m%d")),
    );
    set("ultimateaddress1[0]", "XYZ COSMETICS IMPORT CO.".to_string());
    set("ultimateaddress1[1]", "123 BEAUTY BLVD".to_string());
    set("ultimateaddress1[2]", String::new());
    set("city1[0]", "NEW YORK".to_string());
    set("State[0]", "NY".to_string());
    set("zip1[0]", "10001".to_string());
    set("importeraddress2[0]", "XYZ COSMETICS IMPORT CO.".to_string());
    set("importeraddress2[1]", "123 BEAUTY BLVD".to_string());
    set("importeraddress2[2]", String::new());
    set("city2[0]", "NEW YORK".to_string());
    set("State[1]", "NY".to_string());
    set("zip2[0]", "10001".to_string());

    // Column 28: merchandise description block. Columns 29-34 have no
    // dedicated fields on the form; their values ride in the description
    // lines.
    set("lineno1[0]", "001".to_string());
    set("descriptiona1[0]", description.to_string());
    set(
        "descriptiona1[1]",
        format!(
            "{}                   {}kg    {}             {}",
            hts_number, meta.gross_weight, meta.manifest_qty, meta.net_quantity
        ),
    );
    set(
        "descriptionb1[1]",
        format!("{}  N", money(item.entered_value)),
    );
    set(
        "descriptionc1[1]",
        format!(
            "A: {:.1}% B: {:.1}% C: {:.1}% ",
            rates.basic, rates.section_301, rates.other
        ),
    );

    // Duty and fee totals.
    set("duty37[0]", money(item.total_duty()));
    set("tax38[0]", "0.0".to_string());
    set("other39[0]", money(item.total_other_fees()));
    set("total40[0]", money(item.total_payable()));

    // Other fees itemization.
    set("amount1[1]", money(item.total_duty()));
    set("descriptiona1[2]", "Merchandise Processing Fee".to_string());
    set("amount1[2]", money(item.mpf));
    set("descriptiona1[3]", "Harbor Maintenance Fee".to_string());
    set("amount1[3]", money(item.hmf));
    set("totalotherfees[0]", money(item.total_other_fees()));
    set("total35[0]", money(item.entered_value));

    // Declaration block.
    set("decname[0]", "John Smith".to_string());
    set("title[0]", "Import Manager".to_string());
    set("lstdate[0]", "TODAY".to_string());
    set("brokerinfo[0]", "XYZ CUSTOMS BROKERS".to_string());
    set("brokernumber[0]", "ABC-123".to_string());

    fields
}

/// Replace `TODAY` placeholders with the current local date (MM/DD/YYYY).
pub fn resolve_dates(fields: &mut BTreeMap<String, String>) {
    let today = Local::now().format("%m/%d/%Y").to_string();
    for value in fields.values_mut() {
        if value == "TODAY" {
            *value = today.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::compute_duty;
    use crate::schedule::FeeSchedule;

    fn sample() -> (DutyLineItem, DutyRates) {
        let rates = DutyRates::new(2.5, 7.5, 0.0);
        let item = compute_duty(5100.0, &rates, &FeeSchedule::default()).unwrap();
        (item, rates)
    }

    #[test]
    fn fee_fields_are_two_decimal_strings() {
        let (item, rates) = sample();
        let fields = form_fields(
            &item,
            &rates,
            &EntryMeta::default(),
            "9401.61.0000",
            "Three-seater sofa",
        );

        assert_eq!(fields["duty37[0]"], "510.00");
        assert_eq!(fields["amount1[2]"], "29.66");
        assert_eq!(fields["amount1[3]"], "6.38");
        assert_eq!(fields["total35[0]"], "5100.00");
        assert_eq!(
            fields["total40[0]"],
            money(item.total_payable())
        );
    }

    #[test]
    fn description_lines_carry_code_and_rates() {
        let (item, rates) = sample();
        let fields = form_fields(
            &item,
            &rates,
            &EntryMeta::default(),
            "9401.61.0000",
            "Three-seater sofa",
        );

        assert!(fields["descriptiona1[1]"].contains("9401.61.0000"));
        assert_eq!(fields["descriptiona1[0]"], "Three-seater sofa");
        assert_eq!(fields["descriptionc1[1]"], "A: 2.5% B: 7.5% C: 0.0% ");
    }

    #[test]
    fn resolve_dates_replaces_today_placeholders() {
        let (item, rates) = sample();
        let mut fields = form_fields(
            &item,
            &rates,
            &EntryMeta::default(),
            "9401.61.0000",
            "Three-seater sofa",
        );
        assert_eq!(fields["entryDate[0]"], "TODAY");

        resolve_dates(&mut fields);
        assert_ne!(fields["entryDate[0]"], "TODAY");
        assert_eq!(fields["entryDate[0]"], fields["summaryDate[0]"]);
        // Non-date fields untouched.
        assert_eq!(fields["filercode[0]"], "ABC");
    }
}
