//! Holding records and the XML information table.

use crate::error::{EdgarError, Result};
use serde::{Deserialize, Serialize};

pub const INFORMATION_TABLE_NAMESPACE: &str =
    "http://www.sec.gov/edgar/document/thirteenf/informationtable";

/// Reported values are in thousands of dollars.
pub const VALUE_MULTIPLIER: i64 = 1000;

/// One row of a 13F information table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub name_of_issuer: String,
    pub title_of_class: String,
    pub cusip: String,
    /// Market value in whole dollars.
    pub value: i64,
    /// Share count or principal amount.
    pub number: i64,
    /// `SH`, `PRN`, or empty when the source table has no such column.
    #[serde(rename = "type")]
    pub share_type: String,
}

impl Holding {
    /// Average value per share, if any shares are reported.
    pub fn price(&self) -> Option<f64> {
        (self.number != 0).then(|| self.value as f64 / self.number as f64)
    }
}

/// Returns `true` for exactly nine ASCII alphanumeric characters.
pub fn is_valid_cusip(cusip: &str) -> bool {
    cusip.len() == 9 && cusip.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Parses the `<XML>` body of an `INFORMATION TABLE` document.
///
/// Each element child of the root is one holding. A holding that cannot be read is logged
/// and left out; only a document that is not XML at all fails the whole table.
pub fn parse_information_table(xml: &str) -> Result<Vec<Holding>> {
    let document = roxmltree::Document::parse(xml)?;

    let mut holdings = Vec::new();
    for node in document.root_element().children().filter(|n| n.is_element()) {
        match parse_info_table_entry(node) {
            Ok(holding) => holdings.push(holding),
            Err(err) => tracing::warn!("Skipping holding: {}", err),
        }
    }
    Ok(holdings)
}

/// Reads a single `infoTable` element.
///
/// # Errors
///
/// * `EdgarError::UnsupportedShareAmount` unless `shrsOrPrnAmt` holds exactly the
///   `sshPrnamt` and `sshPrnamtType` elements.
/// * `EdgarError::InvalidNumber` for a value or share count that is not numeric, or a value
///   too large to scale to dollars.
pub fn parse_info_table_entry(node: roxmltree::Node) -> Result<Holding> {
    let name_of_issuer = child_text(node, "nameOfIssuer").unwrap_or_default();
    let title_of_class = child_text(node, "titleOfClass").unwrap_or_default();
    let cusip = child_text(node, "cusip").unwrap_or_default().to_uppercase();
    let value_text = child_text(node, "value").unwrap_or_else(|| "0".to_string());
    let value = parse_decimal("value", &value_text)?
        .checked_mul(VALUE_MULTIPLIER)
        .ok_or_else(|| EdgarError::InvalidNumber {
            field: "value",
            value: value_text,
        })?;

    let shares = child(node, "shrsOrPrnAmt");
    let found = shares.map_or(0, |s| s.children().filter(|n| n.is_element()).count());
    let Some(shares) = shares.filter(|_| found == 2) else {
        return Err(EdgarError::UnsupportedShareAmount {
            issuer: name_of_issuer,
            found,
        });
    };

    let number = parse_decimal(
        "sshPrnamt",
        child_text(shares, "sshPrnamt").as_deref().unwrap_or("0"),
    )?;
    let share_type = child_text(shares, "sshPrnamtType").unwrap_or_default();

    Ok(Holding {
        name_of_issuer,
        title_of_class,
        cusip,
        value,
        number,
        share_type,
    })
}

fn child<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    name: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    node.children().find(|n| {
        n.is_element() && n.has_tag_name((INFORMATION_TABLE_NAMESPACE, name))
    })
}

fn child_text(node: roxmltree::Node, name: &str) -> Option<String> {
    child(node, name).map(|n| n.text().unwrap_or("").trim().to_string())
}

/// Truncates toward zero. `None` for NaN, infinities and values outside `i64`.
pub(crate) fn float_to_i64(value: f64) -> Option<i64> {
    (value.is_finite() && value.abs() < i64::MAX as f64).then(|| value.trunc() as i64)
}

/// Integer parse that tolerates decimal notation (`"5731.00"`), truncating toward zero.
fn parse_decimal(field: &'static str, text: &str) -> Result<i64> {
    let text = text.trim();
    text.parse::<i64>()
        .ok()
        .or_else(|| text.parse::<f64>().ok().and_then(float_to_i64))
        .ok_or_else(|| EdgarError::InvalidNumber {
            field,
            value: text.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &str) -> String {
        format!(
            r#"<ns1:informationTable xmlns:ns1="{}">{}</ns1:informationTable>"#,
            INFORMATION_TABLE_NAMESPACE, entries
        )
    }

    fn entry(name: &str, cusip: &str, value: &str, shares: &str) -> String {
        format!(
            "<ns1:infoTable>\
               <ns1:nameOfIssuer>{name}</ns1:nameOfIssuer>\
               <ns1:titleOfClass>COM</ns1:titleOfClass>\
               <ns1:cusip>{cusip}</ns1:cusip>\
               <ns1:value>{value}</ns1:value>\
               <ns1:shrsOrPrnAmt>{shares}</ns1:shrsOrPrnAmt>\
               <ns1:investmentDiscretion>SOLE</ns1:investmentDiscretion>\
             </ns1:infoTable>"
        )
    }

    const SHARES: &str =
        "<ns1:sshPrnamt>60389</ns1:sshPrnamt><ns1:sshPrnamtType>SH</ns1:sshPrnamtType>";

    #[test]
    fn test_cusip_validation() {
        assert!(is_valid_cusip("23355L106"));
        assert!(is_valid_cusip("071813109"));
        assert!(!is_valid_cusip("23355L10"));
        assert!(!is_valid_cusip("23355L10!"));
        assert!(!is_valid_cusip("23355L1066"));
        assert!(!is_valid_cusip(""));
        assert!(!is_valid_cusip("2335 L106"));
    }

    #[test]
    fn test_parse_information_table() {
        let xml = table(&entry("DXC TECHNOLOGY CO", "23355l106", "5731", SHARES));
        let holdings = parse_information_table(&xml).unwrap();

        assert_eq!(holdings.len(), 1);
        let holding = &holdings[0];
        assert_eq!(holding.name_of_issuer, "DXC TECHNOLOGY CO");
        assert_eq!(holding.title_of_class, "COM");
        assert_eq!(holding.cusip, "23355L106");
        assert_eq!(holding.value, 5_731_000);
        assert_eq!(holding.number, 60389);
        assert_eq!(holding.share_type, "SH");
    }

    #[test]
    fn test_default_namespace_table() {
        let xml = format!(
            r#"<informationTable xmlns="{}"><infoTable><nameOfIssuer>ACME</nameOfIssuer><cusip>000000000</cusip><value>1</value><shrsOrPrnAmt><sshPrnamt>2</sshPrnamt><sshPrnamtType>PRN</sshPrnamtType></shrsOrPrnAmt></infoTable></informationTable>"#,
            INFORMATION_TABLE_NAMESPACE
        );
        let holdings = parse_information_table(&xml).unwrap();
        assert_eq!(holdings[0].share_type, "PRN");
        assert_eq!(holdings[0].value, 1000);
    }

    #[test]
    fn test_decimal_value_is_truncated() {
        let xml = table(&entry("ACME", "000000000", "5731.00", SHARES));
        let holdings = parse_information_table(&xml).unwrap();
        assert_eq!(holdings[0].value, 5_731_000);
    }

    #[test]
    fn test_share_amount_shape_is_enforced() {
        let one = "<ns1:sshPrnamt>10</ns1:sshPrnamt>";
        let three = format!("{}<ns1:extra>1</ns1:extra>", SHARES);

        let xml = table(&format!(
            "{}{}{}",
            entry("ONE CHILD INC", "111111111", "1", one),
            entry("GOOD INC", "222222222", "2", SHARES),
            entry("THREE CHILDREN INC", "333333333", "3", &three),
        ));
        let holdings = parse_information_table(&xml).unwrap();
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].name_of_issuer, "GOOD INC");

        let document = roxmltree::Document::parse(&xml).unwrap();
        let first = document
            .root_element()
            .children()
            .find(|n| n.is_element())
            .unwrap();
        match parse_info_table_entry(first) {
            Err(EdgarError::UnsupportedShareAmount { issuer, found }) => {
                assert_eq!(issuer, "ONE CHILD INC");
                assert_eq!(found, 1);
            }
            other => panic!("expected UnsupportedShareAmount, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_share_amount_is_rejected() {
        let xml = table(
            "<ns1:infoTable><ns1:nameOfIssuer>NO SHARES</ns1:nameOfIssuer><ns1:value>1</ns1:value></ns1:infoTable>",
        );
        assert!(parse_information_table(&xml).unwrap().is_empty());
    }

    #[test]
    fn test_non_numeric_value_drops_row() {
        let xml = table(&entry("BAD VALUE", "000000000", "n/a", SHARES));
        assert!(parse_information_table(&xml).unwrap().is_empty());
    }

    #[test]
    fn test_out_of_range_value_drops_row() {
        let xml = table(&format!(
            "{}{}{}{}",
            entry("HUGE FLOAT", "000000001", "1e30", SHARES),
            entry("NOT A NUMBER", "000000002", "NaN", SHARES),
            entry("SCALES PAST I64", "000000003", "9223372036854776", SHARES),
            entry("GOOD INC", "000000004", "7", SHARES),
        ));
        let holdings = parse_information_table(&xml).unwrap();
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].name_of_issuer, "GOOD INC");
        assert_eq!(holdings[0].value, 7000);

        let document = roxmltree::Document::parse(&xml).unwrap();
        let first = document
            .root_element()
            .children()
            .find(|n| n.is_element())
            .unwrap();
        assert!(matches!(
            parse_info_table_entry(first),
            Err(EdgarError::InvalidNumber { field: "value", .. })
        ));
    }

    #[test]
    fn test_float_to_i64() {
        assert_eq!(float_to_i64(12.9), Some(12));
        assert_eq!(float_to_i64(-3.5), Some(-3));
        assert_eq!(float_to_i64(f64::NAN), None);
        assert_eq!(float_to_i64(f64::INFINITY), None);
        assert_eq!(float_to_i64(1e20), None);
    }

    #[test]
    fn test_malformed_xml_fails_table() {
        assert!(matches!(
            parse_information_table("<ns1:informationTable>"),
            Err(EdgarError::XmlError(_))
        ));
    }

    #[test]
    fn test_price() {
        let holding = Holding {
            name_of_issuer: "ACME".to_string(),
            title_of_class: "COM".to_string(),
            cusip: "000000000".to_string(),
            value: 10_000,
            number: 100,
            share_type: "SH".to_string(),
        };
        assert_eq!(holding.price(), Some(100.0));
        assert_eq!(Holding { number: 0, ..holding }.price(), None);
    }
}
